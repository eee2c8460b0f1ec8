//! Frames of the elements that are currently open.

use crate::utils::ensure_room;
use std::fmt::Write;

/// What the parser remembers about an open element.
#[derive(Debug, Clone)]
pub(crate) struct ElementFrame {
    /// Name exactly as written in the start tag
    raw: String,
    /// Index of the prefix separator in `raw`, only when namespaces are processed
    colon: Option<usize>,
    /// Namespace URI of the element, `""` for none
    uri: String,
    /// Line on which the start tag name ended
    line: usize,
    /// Length of the namespace table after this element's declarations
    namespace_count: usize,
}

impl ElementFrame {
    #[inline]
    pub fn raw_name(&self) -> &str {
        &self.raw
    }

    /// Local name, or the raw name when namespaces are not processed.
    #[inline]
    pub fn name(&self) -> &str {
        match self.colon {
            Some(i) => &self.raw[i + 1..],
            None => &self.raw,
        }
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.colon.map(|i| &self.raw[..i])
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Open elements indexed by depth: the frame of depth `d` is at `d - 1`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementStack {
    frames: Vec<ElementFrame>,
}

impl ElementStack {
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of frames, which is less than the depth while the name of
    /// an opening tag is being read.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Forgets frames deeper than `depth`.
    #[inline]
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    /// Opens a frame for the element at `depth`.
    pub fn open(&mut self, depth: usize, raw: String, colon: Option<usize>, line: usize) {
        self.frames.truncate(depth - 1);
        ensure_room(&mut self.frames, "element");
        self.frames.push(ElementFrame {
            raw,
            colon,
            uri: String::new(),
            line,
            namespace_count: 0,
        });
    }

    /// Records what was resolved once the start tag is complete.
    pub fn finish(&mut self, uri: String, namespace_count: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.uri = uri;
            frame.namespace_count = namespace_count;
        }
    }

    /// Frame of the element at `depth` (1-based).
    #[inline]
    pub fn get(&self, depth: usize) -> Option<&ElementFrame> {
        depth.checked_sub(1).and_then(|i| self.frames.get(i))
    }

    /// Length of the namespace table inside the element at `depth`; `0` for
    /// the document level.
    #[inline]
    pub fn namespace_count(&self, depth: usize) -> usize {
        self.get(depth).map_or(0, |f| f.namespace_count)
    }

    /// Describes the end tags needed to close every open element, innermost
    /// first, like ` - expected end tags </b></a> to close start tag <b> from
    /// line 2 and start tag <a> from line 1`.
    pub fn describe_unclosed(&self) -> String {
        let mut out = String::from(" - expected end tag");
        if self.frames.len() > 1 {
            out.push('s');
        }
        out.push(' ');
        for frame in self.frames.iter().rev() {
            let _ = write!(out, "</{}>", frame.raw);
        }
        out.push_str(" to close");
        for (i, frame) in self.frames.iter().rev().enumerate() {
            if i > 0 {
                out.push_str(" and");
            }
            let _ = write!(out, " start tag <{}> from line {}", frame.raw, frame.line);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frames_by_depth() {
        let mut stack = ElementStack::default();
        stack.open(1, "a".into(), None, 1);
        stack.finish(String::new(), 0);
        stack.open(2, "x:b".into(), Some(1), 2);
        stack.finish("urn:x".into(), 1);

        let b = stack.get(2).unwrap();
        assert_eq!(b.name(), "b");
        assert_eq!(b.prefix(), Some("x"));
        assert_eq!(b.raw_name(), "x:b");
        assert_eq!(b.uri(), "urn:x");
        assert_eq!(stack.namespace_count(0), 0);
        assert_eq!(stack.namespace_count(2), 1);
        assert!(stack.get(0).is_none());

        // reopening a depth replaces the stale frame
        stack.open(2, "c".into(), None, 3);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.get(2).unwrap().name(), "c");
    }

    #[test]
    fn unclosed_description() {
        let mut stack = ElementStack::default();
        stack.open(1, "hello".into(), None, 1);
        assert_eq!(
            stack.describe_unclosed(),
            " - expected end tag </hello> to close start tag <hello> from line 1"
        );
        stack.open(2, "how".into(), None, 3);
        assert_eq!(
            stack.describe_unclosed(),
            " - expected end tags </how></hello> to close start tag <how> from line 3 \
             and start tag <hello> from line 1"
        );
    }
}
