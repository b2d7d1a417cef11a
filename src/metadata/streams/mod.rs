//! Metadata streams located by the metadata root.

mod streamheader;
mod strings;
mod tablesheader;

pub use streamheader::StreamHeader;
pub use strings::Strings;
pub use tablesheader::TablesHeader;
