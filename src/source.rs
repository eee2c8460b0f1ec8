//! Character sources the parser pulls its input from.
//!
//! The parser never decodes bytes itself. It asks a [`CharSource`] for up to
//! `N` characters at a time and treats `0` as the end of the input.

use std::io::{self, Read};

/// Size of the byte chunks requested from a [`Read`] by [`ReadSource`].
const READ_CHUNK: usize = 8 * 1024;

/// A producer of characters.
///
/// # Contract
///
/// [`read`](Self::read) appends *at most* `max` characters to `buf` and
/// returns how many characters were appended. `Ok(0)` is returned only
/// when the input is exhausted; once that happened every later call must
/// return `Ok(0)` again.
pub trait CharSource {
    /// Appends up to `max` characters to `buf`, returns the number appended.
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    #[inline]
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
        (**self).read(buf, max)
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    #[inline]
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
        (**self).read(buf, max)
    }
}

/// Returns the byte length of the first `max` characters of `text` and how
/// many characters that is.
fn split_chars(text: &str, max: usize) -> (usize, usize) {
    match text.char_indices().nth(max) {
        Some((end, _)) => (end, max),
        None => (text.len(), text.chars().count()),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A source over an in-memory string.
#[derive(Clone, Debug)]
pub struct StrSource<'a> {
    rest: &'a str,
}

impl<'a> StrSource<'a> {
    /// Creates a source that yields the characters of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl<'a> CharSource for StrSource<'a> {
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
        let (end, count) = split_chars(self.rest, max);
        buf.push_str(&self.rest[..end]);
        self.rest = &self.rest[end..];
        Ok(count)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A source decoding UTF-8 from any [`Read`].
///
/// Multi-byte sequences split between two reads are carried over to the next
/// call. Invalid UTF-8 is reported as an [`io::ErrorKind::InvalidData`] error.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    /// Bytes read from `reader` but not yet handed out as characters
    pending: Vec<u8>,
    eof: bool,
}

impl<R: Read> ReadSource<R> {
    /// Creates a source decoding the bytes produced by `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Consumes the source, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Length of the longest valid UTF-8 prefix of `pending`.
    fn valid_prefix(&self) -> io::Result<usize> {
        match std::str::from_utf8(&self.pending) {
            Ok(s) => Ok(s.len()),
            Err(e) if e.valid_up_to() == 0 && e.error_len().is_some() => {
                Err(io::Error::new(io::ErrorKind::InvalidData, e))
            }
            Err(e) => Ok(e.valid_up_to()),
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.pending.len();
        self.pending.resize(start + READ_CHUNK, 0);
        let read = loop {
            match self.reader.read(&mut self.pending[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.pending.truncate(start);
                    return Err(e);
                }
            }
        };
        self.pending.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> CharSource for ReadSource<R> {
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
        loop {
            let valid = self.valid_prefix()?;
            if valid > 0 {
                let (end, count) = {
                    let text = std::str::from_utf8(&self.pending[..valid])
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    let (end, count) = split_chars(text, max);
                    buf.push_str(&text[..end]);
                    (end, count)
                };
                self.pending.drain(..end);
                return Ok(count);
            }
            if self.eof {
                if self.pending.is_empty() {
                    return Ok(0);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "incomplete UTF-8 sequence at the end of input",
                ));
            }
            self.fill()?;
        }
    }
}
