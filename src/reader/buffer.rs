//! Growable window over the input characters.

use crate::source::CharSource;
use memchr::{memchr, memchr3, memchr_iter, memrchr};
use std::io;

/// Capacity of a fresh buffer, in bytes.
const INITIAL_CAPACITY: usize = 256;

/// Number of characters requested from the source at most at once.
pub(crate) const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Share of the capacity that may be filled before the buffer is compacted
/// or grown, in percent.
const LOAD_FACTOR: usize = 95;

/// Input characters read from a [`CharSource`] that were not yet released.
///
/// `buf[start..]` is the valid window; everything before `start` belongs to
/// events that were already reported and may be dropped on the next refill.
/// All offsets are byte offsets into `buf` that lie on character boundaries.
pub(crate) struct InputBuffer<'i> {
    source: Option<Box<dyn CharSource + 'i>>,
    buf: String,
    /// Capacity the growth policy works with
    capacity: usize,
    soft_limit: usize,
    /// First byte still needed (`bufStart`)
    pub start: usize,
    /// Next unread byte
    pub pos: usize,
    /// Offset of the character returned by the last `next_char`
    pub prev: usize,
    /// Start of the current token span
    pub pos_start: usize,
    /// End of the current token span
    pub pos_end: usize,
    /// Offset of `buf[0]` in the whole input
    pub absolute_start: usize,
    /// Forbids dropping data on refill, growing the buffer instead
    pub prevent_compaction: bool,
    pub line: usize,
    pub column: usize,
}

impl<'i> InputBuffer<'i> {
    pub fn new() -> Self {
        Self {
            source: None,
            buf: String::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            soft_limit: soft_limit(INITIAL_CAPACITY),
            start: 0,
            pos: 0,
            prev: 0,
            pos_start: 0,
            pos_end: 0,
            absolute_start: 0,
            prevent_compaction: false,
            line: 1,
            column: 1,
        }
    }

    /// Binds a new source and forgets everything read from the previous one.
    pub fn reset(&mut self, source: Option<Box<dyn CharSource + 'i>>) {
        self.source = source;
        self.buf.clear();
        self.start = 0;
        self.pos = 0;
        self.prev = 0;
        self.pos_start = 0;
        self.pos_end = 0;
        self.absolute_start = 0;
        self.prevent_compaction = false;
        self.line = 1;
        self.column = 1;
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Returns the whole buffered text; offsets held by the parser index into it.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.buf.get(start..end).unwrap_or("")
    }

    /// Offset of `pos` in the whole input.
    #[inline]
    pub fn absolute(&self, offset: usize) -> usize {
        self.absolute_start + offset
    }

    /// Converts an offset in the whole input back to a buffer offset.
    #[inline]
    pub fn relative(&self, absolute: usize) -> usize {
        absolute.saturating_sub(self.absolute_start)
    }

    /// Character returned by the last `next_char`.
    #[inline]
    pub fn last_char(&self) -> char {
        self.buf[self.prev..].chars().next().unwrap_or('\0')
    }

    /// Returns `true` if every buffered character was consumed.
    #[cfg(test)]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Consumes the next buffered character, updating line and column.
    /// Returns `None` if the buffer must be refilled first.
    #[inline]
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.buf[self.pos..].chars().next()?;
        self.prev = self.pos;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consumes buffered character data that needs no attention from the
    /// tokenizer: everything up to the next `<`, `&`, `\r` or `]`.
    ///
    /// Returns the consumed byte range, which may be empty.
    pub fn skip_plain_text(&mut self) -> (usize, usize) {
        let from = self.pos;
        let rest = &self.buf.as_bytes()[from..];
        let mut len = memchr3(b'<', b'&', b'\r', rest).unwrap_or(rest.len());
        if let Some(bracket) = memchr(b']', &rest[..len]) {
            len = bracket;
        }
        if len == 0 {
            return (from, from);
        }
        let run = &rest[..len];
        match memrchr(b'\n', run) {
            Some(last) => {
                self.line += memchr_iter(b'\n', run).count();
                self.column = 1 + count_chars(&run[last + 1..]);
            }
            None => self.column += count_chars(run),
        }
        let to = from + len;
        // `to` is on a boundary: the run stops before an ASCII byte or at the end
        self.prev = match self.buf[..to].char_indices().next_back() {
            Some((i, _)) => i,
            None => self.prev,
        };
        self.pos = to;
        (from, to)
    }

    /// Reads the next chunk from the source, first making room by compacting
    /// or growing the buffer. Returns the number of characters read, `0` at
    /// the end of input.
    pub fn fill(&mut self) -> io::Result<usize> {
        if self.buf.len() > self.soft_limit {
            let compact = !self.prevent_compaction
                && (self.start > self.soft_limit || self.start >= self.capacity / 2);
            if compact {
                log::trace!(
                    target: "xml_pull::buffer",
                    "compacting buffer: dropping {} of {} bytes",
                    self.start,
                    self.buf.len()
                );
            } else {
                let capacity = 2 * self.capacity;
                log::trace!(
                    target: "xml_pull::buffer",
                    "growing buffer from {} to {} bytes ({} in use)",
                    self.capacity,
                    capacity,
                    self.buf.len()
                );
                self.capacity = capacity;
                self.soft_limit = soft_limit(capacity);
                self.buf.reserve(capacity.saturating_sub(self.buf.len()));
            }
            let shift = self.start;
            self.buf.drain(..shift);
            self.rebase(shift);
        }
        let room = self.capacity.saturating_sub(self.buf.len()).max(1);
        let len = std::cmp::min(room, READ_CHUNK_SIZE);
        match self.source.as_mut() {
            Some(source) => source.read(&mut self.buf, len),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "input must be set before parsing is started",
            )),
        }
    }

    /// Moves every cursor `shift` bytes back after the first `shift` bytes
    /// were dropped from the buffer.
    fn rebase(&mut self, shift: usize) {
        self.absolute_start += shift;
        self.start -= shift;
        self.pos -= shift;
        self.prev = self.prev.saturating_sub(shift);
        self.pos_start = self.pos_start.saturating_sub(shift);
        self.pos_end = self.pos_end.saturating_sub(shift);
    }
}

#[inline]
fn soft_limit(capacity: usize) -> usize {
    capacity * LOAD_FACTOR / 100
}

/// Counts the characters of a UTF-8 byte run: every byte except continuation bytes.
#[inline]
fn count_chars(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| (b as i8) >= -0x40).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;
    use pretty_assertions::assert_eq;

    fn buffer(text: &str) -> InputBuffer<'_> {
        let mut buffer = InputBuffer::new();
        buffer.reset(Some(Box::new(StrSource::new(text))));
        buffer
    }

    fn next(buffer: &mut InputBuffer) -> Option<char> {
        if buffer.is_exhausted() && buffer.fill().unwrap() == 0 {
            return None;
        }
        buffer.next_char()
    }

    #[test]
    fn line_and_column() {
        let mut buffer = buffer("ab\ncd");
        let mut seen = Vec::new();
        while let Some(ch) = next(&mut buffer) {
            seen.push((ch, buffer.line, buffer.column));
        }
        assert_eq!(
            seen,
            vec![('a', 1, 2), ('b', 1, 3), ('\n', 2, 1), ('c', 2, 2), ('d', 2, 3)]
        );
    }

    #[test]
    fn plain_text_run() {
        let mut buffer = buffer("héllo\nwörld]]>rest");
        buffer.fill().unwrap();
        let (from, to) = buffer.skip_plain_text();
        assert_eq!(buffer.slice(from, to), "héllo\nwörld");
        assert_eq!((buffer.line, buffer.column), (2, 6));
        assert_eq!(buffer.last_char(), 'd');
        assert_eq!(buffer.next_char(), Some(']'));

        let (from, to) = buffer.skip_plain_text();
        assert_eq!(from, to);
    }

    #[test]
    fn compaction_keeps_window() {
        let text = "x".repeat(3000);
        let mut buffer = buffer(&text);
        let mut read = 0;
        while next(&mut buffer).is_some() {
            read += 1;
            // release everything consumed, like the parser does between events
            buffer.start = buffer.pos;
            assert_eq!(buffer.absolute(buffer.pos), read);
        }
        assert_eq!(read, 3000);
        // the window never had to grow past the initial capacity by much
        assert!(buffer.capacity <= 2 * INITIAL_CAPACITY);
        assert!(buffer.absolute_start > 0);
    }

    #[test]
    fn growth_keeps_unreleased_data() {
        let text = "y".repeat(2000);
        let mut buffer = buffer(&text);
        while next(&mut buffer).is_some() {}
        assert_eq!(buffer.absolute_start, 0);
        assert_eq!(buffer.as_str().len(), 2000);
        assert!(buffer.capacity >= 2048);
    }
}
