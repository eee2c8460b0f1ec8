//! Secondary buffer for token text that differs from the input.

/// Initial capacity of the pending buffer, in bytes.
const INITIAL_CAPACITY: usize = 64;

/// Below this size the pending buffer grows straight to twice this size.
const GROWTH_THRESHOLD: usize = 8 * 1024;

/// Text of the current token when it cannot be a slice of the input:
/// line endings were normalized, references were expanded, or several runs
/// (text, CDATA sections) were merged into one event.
///
/// Once engaged for a token it holds the whole text of that token; the
/// token span in the input buffer is then no longer authoritative.
#[derive(Debug)]
pub(crate) struct PendingBuffer {
    text: String,
    /// `usePC`: the text of the current token lives here
    active: bool,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(INITIAL_CAPACITY),
            active: false,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Forgets the text of the previous token.
    #[inline]
    pub fn reset(&mut self) {
        self.text.clear();
        self.active = false;
    }

    /// Starts collecting the text of the current token from scratch.
    #[inline]
    pub fn engage(&mut self) {
        self.text.clear();
        self.active = true;
    }

    /// Starts collecting the text of the current token with what was
    /// scanned so far, or appends `raw` if already collecting.
    pub fn join(&mut self, raw: &str) {
        if !self.active {
            self.text.clear();
            self.active = true;
        }
        self.push_str(raw);
    }

    #[inline]
    pub fn push(&mut self, ch: char) {
        self.reserve(ch.len_utf8());
        self.text.push(ch);
    }

    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.reserve(s.len());
        self.text.push_str(s);
    }

    /// Removes the last `n` characters, which must be ASCII: delimiters
    /// like `--` or `]]` that were collected before the closing `>` was seen.
    pub fn truncate_tail(&mut self, n: usize) {
        let len = self.text.len().saturating_sub(n);
        self.text.truncate(len);
    }

    fn reserve(&mut self, additional: usize) {
        let end = self.text.len();
        if end + additional <= self.text.capacity() {
            return;
        }
        let new_size = if end > GROWTH_THRESHOLD {
            2 * end
        } else {
            2 * GROWTH_THRESHOLD
        };
        let new_size = std::cmp::max(new_size, end + additional);
        log::trace!(
            target: "xml_pull::buffer",
            "growing pending buffer from {} to {} bytes",
            self.text.capacity(),
            new_size
        );
        self.text.reserve_exact(new_size - end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn join_then_push() {
        let mut pc = PendingBuffer::new();
        assert!(!pc.is_active());
        pc.join("abc");
        pc.push('\n');
        pc.push_str("def--");
        pc.truncate_tail(2);
        assert!(pc.is_active());
        assert_eq!(pc.as_str(), "abc\ndef");

        pc.reset();
        assert!(!pc.is_active());
        assert_eq!(pc.as_str(), "");
    }

    #[test]
    fn growth() {
        let mut pc = PendingBuffer::new();
        pc.engage();
        pc.push_str(&"x".repeat(100));
        assert!(pc.text.capacity() >= 2 * GROWTH_THRESHOLD);
        let big = "y".repeat(3 * GROWTH_THRESHOLD);
        pc.push_str(&big);
        assert_eq!(pc.as_str().len(), 100 + 3 * GROWTH_THRESHOLD);
    }
}
