//! Discovery of modules that reference the selected ones.
//!
//! Every binary of the input directory is read into an [`Inventory`]. Over the inventory a
//! [`NameIndex`] and a reference graph are built and reversed; a breadth-first walk of the
//! reversed graph then reports each edge `(referenced, referencing)`. A referencing module
//! whose referenced module is selected, while it is not, needs its references patched.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{
    module::{is_binary_file, ModuleDescriptor, ModuleReader, ReadOutcome},
    utils::graph::{AdjacencyGraph, NameIndex},
    Result,
};

/// Why a candidate file was left out of an [`Inventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A managed image with unusable metadata
    Invalid,
    /// Not a managed image, or unreadable
    Unrecognized,
    /// A second module with an already known name
    Duplicate,
}

/// A candidate file that did not make it into an [`Inventory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// The file
    pub path: PathBuf,
    /// Category of the rejection
    pub reason: SkipReason,
    /// Description of the rejection
    pub message: String,
}

/// Every module found in a directory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    modules: Vec<ModuleDescriptor>,
    by_name: HashMap<String, usize>,
    skipped: Vec<SkippedFile>,
}

impl Inventory {
    /// Reads every `.dll` and `.exe` directly inside `dir`, in file name order.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if `dir` cannot be listed. Files that cannot be
    /// read as modules are recorded as skipped instead.
    pub fn scan<R: ModuleReader>(reader: &R, dir: &Path) -> Result<Inventory> {
        Ok(Self::scan_files(reader, collect_binaries(dir)?))
    }

    /// Reads the given files in order.
    pub fn scan_files<R, I>(reader: &R, files: I) -> Inventory
    where
        R: ModuleReader,
        I: IntoIterator<Item = PathBuf>,
    {
        let mut inventory = Inventory::default();
        for path in files {
            match reader.read(&path) {
                ReadOutcome::Module(descriptor) => inventory.insert(descriptor),
                ReadOutcome::Invalid { path, reason } => {
                    debug!("Skipping '{}': {}", path.display(), reason);
                    inventory.skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::Invalid,
                        message: reason,
                    });
                }
                ReadOutcome::Unrecognized { path, reason } => {
                    debug!("Skipping '{}': {}", path.display(), reason);
                    inventory.skipped.push(SkippedFile {
                        path,
                        reason: SkipReason::Unrecognized,
                        message: reason,
                    });
                }
            }
        }

        inventory
    }

    fn insert(&mut self, descriptor: ModuleDescriptor) {
        if let Some(existing) = self.get(descriptor.name()) {
            warn!(
                "Ignoring '{}': module '{}' was already read from '{}'",
                descriptor.path().display(),
                descriptor.name(),
                existing.path().display()
            );

            let message = format!("duplicate of '{}'", existing.path().display());
            self.skipped.push(SkippedFile {
                path: descriptor.path().to_path_buf(),
                reason: SkipReason::Duplicate,
                message,
            });
            return;
        }

        self.by_name
            .insert(descriptor.name().to_string(), self.modules.len());
        self.modules.push(descriptor);
    }

    /// The modules in scan order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// The module called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.by_name
            .get(name)
            .and_then(|position| self.modules.get(*position))
    }

    /// Files that were not read as modules.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if no module was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules outside the selection that directly reference a selected module.
    ///
    /// Results are in traversal order and free of duplicates.
    ///
    /// # Errors
    /// Returns an internal consistency error if the graph and its index disagree.
    pub fn find_referencing<F>(&self, is_selected: F) -> Result<Vec<&ModuleDescriptor>>
    where
        F: Fn(&str) -> bool,
    {
        let index = NameIndex::for_modules(&self.modules);
        let reversed = AdjacencyGraph::build(&self.modules, &index)?.reverse();

        let mut seen = HashSet::new();
        let mut referencing = Vec::new();
        reversed.breadth_first_visit(|from, to| {
            if is_selected(from) && !is_selected(to) && seen.insert(to.to_string()) {
                referencing.push(to.to_string());
            }
        })?;

        Ok(referencing
            .iter()
            .filter_map(|name| self.get(name))
            .collect())
    }

    /// File paths of [`Inventory::find_referencing`].
    ///
    /// # Errors
    /// See [`Inventory::find_referencing`].
    pub fn find_referencing_paths<F>(&self, is_selected: F) -> Result<Vec<PathBuf>>
    where
        F: Fn(&str) -> bool,
    {
        Ok(self
            .find_referencing(is_selected)?
            .into_iter()
            .map(|module| module.path().to_path_buf())
            .collect())
    }
}

/// Lists the `.dll` and `.exe` files directly inside `dir`, sorted by path.
///
/// # Errors
/// Returns [`crate::Error::FileError`] if `dir` cannot be listed.
pub fn collect_binaries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut binaries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_binary_file(&path) {
            binaries.push(path);
        }
    }

    binaries.sort();
    Ok(binaries)
}
