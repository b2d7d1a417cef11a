//! Metadata parsing for managed modules.
//!
//! Only the slice of ECMA-335 the project graph depends on is decoded: the CLI header, the
//! metadata root and its stream headers, the `#Strings` heap and the tables that name a
//! module, its assembly references and its declared types.
//!
//! # Key Components
//!
//! - [`cor20header`] - The CLI header and its runtime flags
//! - [`root`] - The metadata root and stream directory
//! - [`streams`] - The `#Strings` heap and the tables stream header
//! - [`tables`] - Table ids, coded indexes, row sizes and raw rows
//! - [`typesystem`] - Type keys, definitions and their resolution
//! - [`moduleview`] - Everything above combined into one view of a module

/// Implementation of the Header of CIL
pub mod cor20header;
/// Identity, references and types of one module
pub mod moduleview;
/// Implementation of the metadata root
pub mod root;
/// Implementation of the metadata streams
pub mod streams;
/// Implementation of the metadata tables
pub mod tables;
/// Type keys and definitions
pub mod typesystem;
