//! The metadata root (ECMA-335 II.24.2.1).
//!
//! The root starts with the `BSJB` signature, carries the runtime version string and lists
//! the stream headers that locate the heaps and the tables stream.

use crate::{
    file::parser::Parser,
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// Signature of the metadata root, `BSJB`
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The metadata root header.
pub struct Root {
    /// Magic signature, always [`CIL_HEADER_MAGIC`]
    pub signature: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Length of the version string including padding
    pub length: u32,
    /// Runtime version the module was built against, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved flags
    pub flags: u16,
    /// The stream headers, in declaration order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Reads the metadata root from the start of the metadata directory.
    ///
    /// # Errors
    /// Returns an error if the signature is wrong, the data is truncated, or a stream lies
    /// outside of the metadata.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 36 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let _reserved = parser.read_le::<u32>()?;

        let length = parser.read_le::<u32>()?;
        let version_bytes = parser.read_bytes(length as usize)?;
        let version = String::from_utf8_lossy(version_bytes)
            .trim_end_matches('\0')
            .to_string();

        let flags = parser.read_le::<u16>()?;
        let stream_count = parser.read_le::<u16>()?;
        if stream_count == 0 || usize::from(stream_count) * 12 > parser.remaining() {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut stream_headers = Vec::with_capacity(usize::from(stream_count));
        for _ in 0..stream_count {
            let stream = StreamHeader::read(&mut parser)?;

            match u32::checked_add(stream.offset, stream.size) {
                Some(end) if end as usize <= data.len() => {}
                Some(_) => return Err(OutOfBounds),
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        stream.offset,
                        stream.size
                    ))
                }
            }

            if stream_headers
                .iter()
                .any(|existing: &StreamHeader| existing.name == stream.name)
            {
                return Err(malformed_error!("Duplicate stream - {}", stream.name));
            }

            stream_headers.push(stream);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            length,
            version,
            flags,
            stream_headers,
        })
    }

    /// Returns the data of the stream called `name`, if present.
    #[must_use]
    pub fn stream<'a>(&self, data: &'a [u8], name: &str) -> Option<&'a [u8]> {
        let header = self.stream_headers.iter().find(|h| h.name == name)?;
        let start = header.offset as usize;
        data.get(start..start + header.size as usize)
    }

    /// Returns the data of the tables stream, compressed or not.
    #[must_use]
    pub fn tables_stream<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        let header = self.stream_headers.iter().find(|h| h.is_tables())?;
        let start = header.offset as usize;
        data.get(start..start + header.size as usize)
    }
}
