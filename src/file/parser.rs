//! Cursor-based byte stream parser for metadata structures.
//!
//! [`Parser`] keeps a position into a byte slice and offers bounds-checked sequential reads.
//! Fixed-layout headers (the CLI header, the `#~` stream header) are read field by field
//! through it.

use crate::{
    file::io::{read_le_at, read_le_at_dyn, CilIO},
    Error::OutOfBounds,
    Result,
};

/// A sequential little-endian reader over a byte slice.
///
/// # Examples
///
/// ```rust,no_run
/// use dotgraph::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// parser.seek(6)?;
/// assert_eq!(parser.read_le::<u16>()?, 0x0807);
/// # Ok::<(), dotgraph::Error>(())
/// ```
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the position is before the end of the data.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Moves to an absolute position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Moves forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the new position is past the end of the data.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let Some(pos) = self.position.checked_add(step) else {
            return Err(OutOfBounds);
        };

        self.seek(pos)
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Moves forward to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the aligned position is past the end.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        if alignment == 0 {
            return Ok(());
        }

        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Reads a `T` and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Reads a 2 or 4 byte index and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left.
    pub fn read_index(&mut self, is_large: bool) -> Result<u32> {
        read_le_at_dyn(self.data, &mut self.position, is_large)
    }

    /// Reads `length` raw bytes and advances past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough data is left.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(OutOfBounds);
        };

        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Reads a nul-terminated ASCII/UTF-8 string of at most `max_len` bytes.
    ///
    /// The terminator is consumed but not returned.
    ///
    /// # Errors
    /// Returns an error if no terminator is found within `max_len` bytes or the string is
    /// not valid UTF-8.
    pub fn read_string_utf8(&mut self, max_len: usize) -> Result<&'a str> {
        let window_end = self.data.len().min(self.position.saturating_add(max_len));
        let window = &self.data[self.position.min(window_end)..window_end];

        let Some(len) = window.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!(
                "Unterminated string at offset {}",
                self.position
            ));
        };

        let value = std::str::from_utf8(&window[..len])
            .map_err(|_| malformed_error!("Invalid UTF-8 string at offset {}", self.position))?;
        self.position += len + 1;
        Ok(value)
    }
}
