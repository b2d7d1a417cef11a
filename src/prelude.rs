//! # dotgraph Prelude
//!
//! This module re-exports the types most programs built on dotgraph need: loading a project,
//! inspecting its modules and order, and resolving types.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotgraph operations
pub use crate::Error;

/// The result type used throughout dotgraph
pub use crate::Result;

// ================================================================================================
// Modules
// ================================================================================================

/// Module descriptors and the reader contract
pub use crate::module::{CilModuleReader, ModuleDescriptor, ModuleReader, ReadOutcome};

/// Metadata view of a single managed image
pub use crate::metadata::moduleview::{AssemblyName, AssemblyVersion, ModuleView};

// ================================================================================================
// Projects
// ================================================================================================

/// Configuration
pub use crate::project::{Settings, Variables};

/// Project container and its loader
pub use crate::project::{ModuleInfo, Project, ProjectLoader, ProjectResult};

/// Reports produced while loading
pub use crate::project::{CycleBreak, OrderReport, ScanReport, SkipReason, SkippedFile};

/// Input directory scan
pub use crate::project::Inventory;

// ================================================================================================
// Graphs and Types
// ================================================================================================

/// Name-indexed graphs
pub use crate::utils::graph::{AdjacencyGraph, NameIndex, NodeId};

/// Type identities
pub use crate::metadata::typesystem::{TypeDefinition, TypeKey, TypeReference};
