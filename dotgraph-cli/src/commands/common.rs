use std::path::Path;

use anyhow::{bail, Context};
use dotgraph::{
    module::{CilModuleReader, ModuleDescriptor},
    project::{Inventory, SkipReason, Variables},
};
use serde::Serialize;

/// Read every module directly inside `dir`.
pub fn scan_directory(dir: &Path) -> anyhow::Result<Inventory> {
    Inventory::scan(&CilModuleReader, dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))
}

/// Split `NAME=VALUE` into its parts and add it to `variables`.
pub fn add_variable(variables: &mut Variables, definition: &str) -> anyhow::Result<()> {
    let Some((name, value)) = definition.split_once('=') else {
        bail!("invalid variable '{definition}', expected NAME=VALUE");
    };
    if name.trim().is_empty() {
        bail!("invalid variable '{definition}', the name is empty");
    }
    if value.is_empty() {
        variables.remove(name.trim());
    } else {
        variables.add(name.trim(), value);
    }
    Ok(())
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().to_string())
}

pub fn skip_reason_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Invalid => "invalid",
        SkipReason::Unrecognized => "unrecognized",
        SkipReason::Duplicate => "duplicate",
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleEntry {
    pub name: String,
    pub file: String,
    pub mixed_mode: bool,
    pub references: Vec<String>,
}

impl From<&ModuleDescriptor> for ModuleEntry {
    fn from(descriptor: &ModuleDescriptor) -> Self {
        ModuleEntry {
            name: descriptor.name().to_string(),
            file: file_display_name(descriptor.path()),
            mixed_mode: descriptor.is_mixed_mode(),
            references: descriptor.references().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SkippedEntry {
    pub file: String,
    pub reason: &'static str,
    pub message: String,
}

impl From<&dotgraph::project::SkippedFile> for SkippedEntry {
    fn from(skipped: &dotgraph::project::SkippedFile) -> Self {
        SkippedEntry {
            file: file_display_name(&skipped.path),
            reason: skip_reason_name(skipped.reason),
            message: skipped.message.clone(),
        }
    }
}

pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
