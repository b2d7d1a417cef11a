// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dotgraph
//!
//! Module dependency graphs for .NET obfuscation projects.
//!
//! `dotgraph` reads the modules of a project, finds the modules that reference the ones being
//! processed, and determines the order in which the selected modules have to be processed so
//! that every module comes after the modules it references. It ships its own reader for
//! managed PE images, so no .NET runtime is needed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotgraph::prelude::*;
//!
//! let mut variables = Variables::new();
//! variables.add("InPath", "bin");
//! variables.add("OutPath", "out");
//!
//! let result = ProjectLoader::new(Settings::from_variables(&variables)?)
//!     .module("Core.dll")
//!     .module("App.exe")
//!     .build()?;
//!
//! for module in result.project.modules() {
//!     println!("{}", module.name());
//! }
//! # Ok::<(), dotgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`module`] - [`module::ModuleDescriptor`] and the [`module::ModuleReader`] contract
//! - [`metadata`] - The subset of ECMA-335 metadata needed to describe a module
//! - [`utils::graph`] - Name index and adjacency graph with breadth-first traversal
//! - [`project`] - Settings, the referencing-module search, ordering and type resolution
//! - [`prelude`] - Re-exports of the commonly used types
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result). Files that cannot be read as
//! modules are not errors while scanning a directory; they are reported and skipped.
//!
//! ```rust,no_run
//! use dotgraph::{Error, project::{ProjectLoader, Settings}};
//!
//! match ProjectLoader::new(Settings::default()).module("App.exe").build() {
//!     Ok(result) => println!("{} modules", result.module_count()),
//!     Err(Error::Configuration(message)) => println!("Bad configuration: {}", message),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! cargo +nightly fuzz run module_view --release
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

#[cfg(test)]
pub(crate) mod test;

/// Commonly used types, for glob import.
pub mod prelude;

/// ECMA-335 metadata structures needed to describe a module.
pub mod metadata;

/// Modules as seen by the project graph, and the reader producing them.
pub mod module;

/// Projects: settings, the referencing-module search, ordering, and type resolution.
pub mod project;

/// Graph data structures.
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotgraph` Error type
pub use error::Error;

/// Low-level file access and bounds-checked reading.
///
/// # Example
///
/// ```rust
/// use dotgraph::Parser;
///
/// let mut parser = Parser::new(&[0x34, 0x12]);
/// assert_eq!(parser.read_le::<u16>()?, 0x1234);
/// # Ok::<(), dotgraph::Error>(())
/// ```
pub use file::{parser::Parser, File};
