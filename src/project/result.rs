//! Reports produced while building a project.

use crate::{
    module::ModuleDescriptor,
    project::{OrderReport, Project, SkippedFile},
};

/// Outcome of the search for modules referencing the selected ones.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Modules added to the selected set
    pub referencing: Vec<ModuleDescriptor>,
    /// Mixed-mode modules that reference a selected module but cannot be updated
    pub unsupported: Vec<ModuleDescriptor>,
    /// Files of the input directory that were not read as modules
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    /// Returns `true` if every referencing module could be selected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unsupported.is_empty()
    }
}

/// Result of [`crate::project::ProjectLoader::build`].
///
/// ```rust,no_run
/// use dotgraph::project::{ProjectLoader, Settings};
///
/// # fn main() -> dotgraph::Result<()> {
/// let result = ProjectLoader::new(Settings::default()).module("App.exe").build()?;
///
/// for module in result.project.modules() {
///     println!("{}", module.name());
/// }
/// for broken in &result.order.cycle_breaks {
///     println!("cycle broken at {}", broken.module);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProjectResult {
    /// The loaded project
    pub project: Project,
    /// Processing order of the selected modules
    pub order: OrderReport,
    /// Referencing modules, present when the scan was enabled
    pub scan: Option<ScanReport>,
}

impl ProjectResult {
    /// Number of selected modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.project.module_count()
    }

    /// Returns `true` if the order needed no cycle breaks and no referencing module was left out.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.order.is_acyclic() && self.scan.as_ref().map_or(true, ScanReport::is_complete)
    }
}
