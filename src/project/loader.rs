//! Builder that reads modules from disk and loads them into a [`Project`].

use std::path::{Path, PathBuf};

use crate::{
    module::{CilModuleReader, ModuleDescriptor, ModuleReader, ReadOutcome},
    project::{Inventory, Project, ProjectResult, Settings},
    Error::Configuration,
    Result,
};

/// Builder for a loaded [`Project`].
///
/// Selected modules are processed, copied modules only take part in name checks. Relative
/// module paths are taken relative to the input directory of the settings.
///
/// # Usage Examples
///
/// ```rust,no_run
/// use dotgraph::project::{ProjectLoader, Settings, Variables};
///
/// # fn main() -> dotgraph::Result<()> {
/// let mut variables = Variables::new();
/// variables.add("InPath", "bin");
/// variables.add("OutPath", "obfuscated");
/// variables.add("UpdateOtherModuleReferences", "true");
///
/// let result = ProjectLoader::new(Settings::from_variables(&variables)?)
///     .module("Core.dll")
///     .module("App.exe")
///     .copied("ThirdParty.dll")
///     .build()?;
///
/// println!("{:?}", result.order.order);
/// # Ok(())
/// # }
/// ```
pub struct ProjectLoader<R = CilModuleReader> {
    /// Settings handed to the project
    settings: Settings,
    /// Files of the selected modules
    modules: Vec<PathBuf>,
    /// Files of the copied modules
    copied: Vec<PathBuf>,
    /// Reader turning files into descriptors
    reader: R,
}

impl ProjectLoader {
    /// Creates a loader reading real module files.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        ProjectLoader {
            settings,
            modules: Vec::new(),
            copied: Vec::new(),
            reader: CilModuleReader,
        }
    }
}

impl<R: ModuleReader> ProjectLoader<R> {
    /// Adds a module to process.
    #[must_use]
    pub fn module(mut self, path: impl Into<PathBuf>) -> Self {
        self.modules.push(path.into());
        self
    }

    /// Adds a module to pass through unchanged.
    #[must_use]
    pub fn copied(mut self, path: impl Into<PathBuf>) -> Self {
        self.copied.push(path.into());
        self
    }

    /// Replaces the reader used for every file, including the input directory scan.
    #[must_use]
    pub fn with_reader<T: ModuleReader>(self, reader: T) -> ProjectLoader<T> {
        ProjectLoader {
            settings: self.settings,
            modules: self.modules,
            copied: self.copied,
            reader,
        }
    }

    /// Reads the modules and loads the project.
    ///
    /// 1. Validate the input and output directories
    /// 2. Read the selected and copied modules
    /// 3. Select the modules of the input directory that reference selected modules, if
    ///    `update_other_module_references` is set
    /// 4. Link and order the selected modules
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] for unusable settings or a listed module that
    /// cannot be read, and [`crate::Error::DuplicateModule`] for a name listed twice.
    pub fn build(self) -> Result<ProjectResult> {
        self.settings.check()?;

        let mut project = Project::new(self.settings.clone());
        for path in &self.modules {
            project.add_module(self.read(path)?)?;
        }
        for path in &self.copied {
            project.add_copied(self.read(path)?)?;
        }

        let scan = if self.settings.update_other_module_references {
            let inventory = Inventory::scan(&self.reader, &self.settings.in_path)?;
            Some(project.add_referencing_modules(&inventory)?)
        } else {
            None
        };

        let order = project.load()?.clone();
        Ok(ProjectResult {
            project,
            order,
            scan,
        })
    }

    fn read(&self, path: &Path) -> Result<ModuleDescriptor> {
        let path = if path.is_relative() {
            self.settings.in_path.join(path)
        } else {
            path.to_path_buf()
        };

        match self.reader.read(&path) {
            ReadOutcome::Module(descriptor) => Ok(descriptor),
            ReadOutcome::Invalid { reason, .. } | ReadOutcome::Unrecognized { reason, .. } => {
                Err(Configuration(format!(
                    "Unable to read module '{}': {}",
                    path.display(),
                    reason
                )))
            }
        }
    }
}
