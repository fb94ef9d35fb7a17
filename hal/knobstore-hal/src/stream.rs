//! Buffered forward-only byte scanning
//!
//! [`ByteStream`] reads a [`File`] in small chunks and offers the handful of
//! scanning primitives a streaming parser needs: peek, next, skip whitespace,
//! and the `find` / `find_until` pair for jumping to a delimiter. It never
//! seeks backwards and holds at most `N` bytes of the file at once.

use crate::file::{File, FileError};

/// Forward-only reader over a file with an `N` byte read-ahead buffer
pub struct ByteStream<F: File, const N: usize> {
    file: F,
    buf: [u8; N],
    pos: usize,
    len: usize,
    eof: bool,
}

impl<F: File, const N: usize> ByteStream<F, N> {
    /// Wrap an open file
    pub fn new(file: F) -> Self {
        Self {
            file,
            buf: [0u8; N],
            pos: 0,
            len: 0,
            eof: false,
        }
    }

    /// Refill the read-ahead buffer if it is drained
    ///
    /// Returns false once the end of the file is reached.
    fn fill(&mut self) -> Result<bool, FileError> {
        if self.pos < self.len {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }
        let n = self.file.read(&mut self.buf)?;
        self.pos = 0;
        self.len = n;
        if n == 0 {
            self.eof = true;
            return Ok(false);
        }
        Ok(true)
    }

    /// Look at the next byte without consuming it
    pub fn peek(&mut self) -> Result<Option<u8>, FileError> {
        if self.fill()? {
            Ok(Some(self.buf[self.pos]))
        } else {
            Ok(None)
        }
    }

    /// Consume and return the next byte
    pub fn next_byte(&mut self) -> Result<Option<u8>, FileError> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    /// Skip ASCII whitespace and peek at the first byte after it
    pub fn skip_whitespace(&mut self) -> Result<Option<u8>, FileError> {
        while let Some(byte) = self.peek()? {
            if !byte.is_ascii_whitespace() {
                return Ok(Some(byte));
            }
            self.pos += 1;
        }
        Ok(None)
    }

    /// Consume bytes up to and including `target`
    ///
    /// Returns false if the end of the file was reached first.
    pub fn find(&mut self, target: u8) -> Result<bool, FileError> {
        while let Some(byte) = self.next_byte()? {
            if byte == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Consume bytes up to and including `target` or `terminator`
    ///
    /// Returns true if `target` was found, false if `terminator` or the end
    /// of the file came first.
    pub fn find_until(&mut self, target: u8, terminator: u8) -> Result<bool, FileError> {
        while let Some(byte) = self.next_byte()? {
            if byte == target {
                return Ok(true);
            }
            if byte == terminator {
                return Ok(false);
            }
        }
        Ok(false)
    }

    /// Give the file back, discarding any buffered bytes
    pub fn into_inner(self) -> F {
        self.file
    }
}
