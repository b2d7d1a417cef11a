use crate::{file::parser::Parser, Result};

/// Stream names a module image may carry.
const VALID_NAMES: [&str; 6] = ["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"];

/// A stream header of the metadata root, locating one metadata heap or the tables stream.
pub struct StreamHeader {
    /// Offset of the stream relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream
    pub name: String,
}

impl StreamHeader {
    /// Reads a stream header from the start of `data`.
    ///
    /// # Errors
    /// Returns an error if the data is truncated or the name is not a known stream.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        let mut parser = Parser::new(data);
        Self::read(&mut parser)
    }

    /// Reads a stream header at the parser position and skips the name padding.
    ///
    /// # Errors
    /// Returns an error if the data is truncated or the name is not a known stream.
    pub fn read(parser: &mut Parser) -> Result<StreamHeader> {
        let offset = parser.read_le::<u32>()?;
        let size = parser.read_le::<u32>()?;
        let name = parser.read_string_utf8(32)?;

        if !VALID_NAMES.contains(&name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        let name = name.to_string();
        parser.align(4)?;

        Ok(StreamHeader { offset, size, name })
    }

    /// Returns `true` for the compressed (`#~`) or uncompressed (`#-`) tables stream.
    #[must_use]
    pub fn is_tables(&self) -> bool {
        self.name == "#~" || self.name == "#-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
        assert!(parsed_header.is_tables());
    }

    #[test]
    fn uncompressed_tables() {
        let header_bytes = [0x6C, 0, 0, 0, 0x10, 0, 0, 0, b'#', b'-', 0, 0];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();
        assert!(parsed_header.is_tables());
    }

    #[test]
    fn crafted_invalid() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00, 0x00,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
    }
}
