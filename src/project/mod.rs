//! The set of modules processed together.
//!
//! A [`Project`] owns two disjoint sets of modules: the *selected* modules, which are
//! processed, and the *copied* modules, which are passed through unchanged. Loading links the
//! selected modules to each other, builds their type lookup and the [`InheritMap`], and sorts
//! them so that every module comes after the selected modules it references.
//!
//! # Key Components
//!
//! - [`Project`] - Module sets, loading, and type resolution
//! - [`ProjectLoader`] - Builder that reads the modules and drives a full load
//! - [`Settings`] / [`Variables`] - Configuration
//! - [`Inventory`] - Every module of the input directory, for the referencing-module search
//! - [`DependencyResolver`] - Processing order with cycle breaking
//!
//! # Usage Examples
//!
//! ```rust
//! use dotgraph::module::ModuleDescriptor;
//! use dotgraph::project::{Project, Settings};
//!
//! let mut project = Project::new(Settings::default());
//! project.add_module(ModuleDescriptor::new("C.dll", "C", ["A", "B"], false))?;
//! project.add_module(ModuleDescriptor::new("B.dll", "B", ["A"], false))?;
//! project.add_module(ModuleDescriptor::new("A.dll", "A", ["mscorlib"], false))?;
//!
//! let report = project.load()?;
//! assert_eq!(report.order, ["A", "B", "C"]);
//! assert!(project.contains("B"));
//! # Ok::<(), dotgraph::Error>(())
//! ```

mod info;
mod inherit;
mod loader;
mod order;
mod result;
mod scanner;
mod settings;

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::{
    metadata::typesystem::{TypeDefinition, TypeKey, TypeReference},
    module::ModuleDescriptor,
    Error::DuplicateModule,
    Result,
};

pub use info::{LoadState, ModuleInfo};
pub use inherit::InheritMap;
pub use loader::ProjectLoader;
pub use order::{CycleBreak, DependencyResolver, OrderReport};
pub use result::{ProjectResult, ScanReport};
pub use scanner::{collect_binaries, Inventory, SkipReason, SkippedFile};
pub use settings::{
    Settings, Variables, VAR_EXTRA_FRAMEWORK_FOLDERS, VAR_IN_PATH, VAR_KEY_CONTAINER,
    VAR_KEY_FILE, VAR_OUT_PATH, VAR_PROJECT_FILE_DIRECTORY, VAR_UPDATE_OTHER_MODULE_REFERENCES,
};

/// Selected and copied modules with their settings.
///
/// The selected modules keep the order they were added in until [`Project::load`] sorts
/// them. A module name is registered at most once across both sets.
#[derive(Debug)]
pub struct Project {
    settings: Settings,
    selected: Vec<ModuleInfo>,
    positions: HashMap<String, usize>,
    copied: Vec<ModuleDescriptor>,
    copied_positions: HashMap<String, usize>,
    inherit_map: InheritMap,
    order: Option<OrderReport>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Project {
            settings,
            selected: Vec::new(),
            positions: HashMap::new(),
            copied: Vec::new(),
            copied_positions: HashMap::new(),
            inherit_map: InheritMap::default(),
            order: None,
        }
    }

    /// The project settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validates the input and output directories.
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if the input directory does not exist or the
    /// output directory cannot be created.
    pub fn check_settings(&self) -> Result<()> {
        self.settings.check()
    }

    /// Adds a module to the selected set.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateModule`] if the name is already registered.
    pub fn add_module(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        self.ensure_unregistered(descriptor.name())?;

        info!("Processing module: {}", descriptor.name());
        self.positions
            .insert(descriptor.name().to_string(), self.selected.len());
        self.selected.push(ModuleInfo::new(descriptor));
        self.order = None;
        Ok(())
    }

    /// Adds a module to the copied set.
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateModule`] if the name is already registered.
    pub fn add_copied(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        self.ensure_unregistered(descriptor.name())?;

        debug!("Copying module: {}", descriptor.name());
        self.copied_positions
            .insert(descriptor.name().to_string(), self.copied.len());
        self.copied.push(descriptor);
        Ok(())
    }

    fn ensure_unregistered(&self, name: &str) -> Result<()> {
        if self.contains(name) || self.is_copied(name) {
            return Err(DuplicateModule(name.to_string()));
        }
        Ok(())
    }

    /// Selects the modules of `inventory` that directly reference a selected module.
    ///
    /// Mixed-mode modules cannot have their references updated; they are reported as
    /// unsupported and stay out of the selection. Modules already in the copied set stay
    /// copied.
    ///
    /// # Errors
    /// Returns an internal consistency error from the graph layer.
    pub fn add_referencing_modules(&mut self, inventory: &Inventory) -> Result<ScanReport> {
        let found: Vec<ModuleDescriptor> = inventory
            .find_referencing(|name| self.contains(name))?
            .into_iter()
            .cloned()
            .collect();

        let mut report = ScanReport {
            skipped: inventory.skipped().to_vec(),
            ..ScanReport::default()
        };

        for descriptor in found {
            if descriptor.is_mixed_mode() {
                warn!(
                    "Will not update references in '{}' (mixed mode modules are not supported)",
                    descriptor.name()
                );
                report.unsupported.push(descriptor);
            } else if self.is_copied(descriptor.name()) {
                debug!(
                    "Not updating references in copied module '{}'",
                    descriptor.name()
                );
            } else {
                self.add_module(descriptor.clone())?;
                report.referencing.push(descriptor);
            }
        }

        Ok(report)
    }

    /// Links, initializes and sorts the selected modules.
    ///
    /// Every module is recorded as referenced by itself. References between selected modules
    /// are linked in both directions, references to anything else are ignored. After the
    /// type lookup and the [`InheritMap`] are built, the selected modules are reordered so
    /// that referenced modules come first.
    ///
    /// # Errors
    /// Returns an internal consistency error if the ordering pass sees an unknown name.
    pub fn load(&mut self) -> Result<&OrderReport> {
        for position in 0..self.selected.len() {
            let name = self.selected[position].name().to_string();
            self.selected[position].add_referenced_by(&name);

            let references = self.selected[position].descriptor().references().to_vec();
            for reference in references {
                let Some(&target) = self.positions.get(&reference) else {
                    continue;
                };
                if target == position {
                    continue;
                }

                self.selected[position].add_reference(&reference);
                self.selected[target].add_referenced_by(&name);
            }
        }

        for module in &mut self.selected {
            module.init();
        }
        self.inherit_map = InheritMap::build(self);

        let mut resolver = DependencyResolver::new();
        for module in &self.selected {
            resolver.add_module(module.name());
        }
        for module in &self.selected {
            for reference in module.references() {
                resolver.add_reference(module.name(), reference)?;
            }
        }
        let report = resolver.resolve();

        let mut slots: Vec<Option<ModuleInfo>> = std::mem::take(&mut self.selected)
            .into_iter()
            .map(Some)
            .collect();
        for name in &report.order {
            if let Some(module) = self.positions.get(name).and_then(|pos| slots[*pos].take()) {
                self.selected.push(module);
            }
        }
        self.positions = self
            .selected
            .iter()
            .enumerate()
            .map(|(position, module)| (module.name().to_string(), position))
            .collect();

        Ok(&*self.order.insert(report))
    }

    /// Returns `true` if a module called `scope` is selected.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.positions.contains_key(scope)
    }

    /// Returns `true` if the type's declaring module is selected.
    #[must_use]
    pub fn contains_type(&self, key: &TypeKey) -> bool {
        self.contains(&key.scope)
    }

    /// Returns `true` if a module called `name` is in the copied set.
    #[must_use]
    pub fn is_copied(&self, name: &str) -> bool {
        self.copied_positions.contains_key(name)
    }

    /// The selected module called `name`.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.positions
            .get(name)
            .and_then(|position| self.selected.get(*position))
    }

    /// The selected modules, in processing order once loaded.
    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.selected
    }

    /// Number of selected modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.selected.len()
    }

    /// The copied modules, in the order they were added.
    #[must_use]
    pub fn copied_modules(&self) -> &[ModuleDescriptor] {
        &self.copied
    }

    /// The definition `reference` denotes.
    ///
    /// A reference that already is a definition resolves to itself. Otherwise the owning
    /// module is looked up by scope and the type by its full name; either may be missing.
    /// Type lookup is available after [`Project::load`].
    #[must_use]
    pub fn resolve_type_definition<'a>(
        &'a self,
        reference: &'a TypeReference,
    ) -> Option<&'a TypeDefinition> {
        match reference {
            TypeReference::Definition(definition) => Some(definition),
            TypeReference::External(key) => self.module(&key.scope)?.get_type(&key.full_name()),
        }
    }

    /// Inheritance relations, built by [`Project::load`].
    #[must_use]
    pub fn inherit_map(&self) -> &InheritMap {
        &self.inherit_map
    }

    /// The last ordering pass, if the project is loaded.
    #[must_use]
    pub fn order(&self) -> Option<&OrderReport> {
        self.order.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{metadata::typesystem::TypeAttributes, test::FakeReader, Error};

    fn definition(
        scope: &str,
        namespace: &str,
        name: &str,
        base: Option<TypeKey>,
    ) -> TypeDefinition {
        TypeDefinition {
            key: TypeKey::new(scope, namespace, name),
            flags: TypeAttributes::PUBLIC,
            base,
        }
    }

    fn module(name: &str, references: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor::new(format!("{name}.dll"), name, references.iter().copied(), false)
    }

    #[test]
    fn load_links_and_orders() {
        let mut project = Project::new(Settings::default());
        project.add_module(module("C", &["A", "B", "mscorlib"])).unwrap();
        project.add_module(module("A", &["mscorlib", "A"])).unwrap();
        project.add_module(module("B", &["A"])).unwrap();
        assert!(project.order().is_none());

        let report = project.load().unwrap().clone();
        assert_eq!(report.order, ["A", "B", "C"]);

        let names: Vec<_> = project.modules().iter().map(ModuleInfo::name).collect();
        assert_eq!(names, ["A", "B", "C"]);

        let a = project.module("A").unwrap();
        assert!(a.references().is_empty());
        assert_eq!(a.referenced_by(), ["C", "A", "B"]);
        assert_eq!(a.state(), LoadState::Initialized);
        assert_eq!(project.module("C").unwrap().references(), ["A", "B"]);
        assert_eq!(project.order(), Some(&report));
    }

    #[test]
    fn duplicate_names() {
        let mut project = Project::new(Settings::default());
        project.add_module(module("A", &[])).unwrap();
        project.add_copied(module("Lib", &[])).unwrap();

        assert!(matches!(
            project.add_module(module("A", &[])),
            Err(Error::DuplicateModule(name)) if name == "A"
        ));
        assert!(matches!(
            project.add_module(module("Lib", &[])),
            Err(Error::DuplicateModule(_))
        ));
        assert!(project.is_copied("Lib"));
        assert!(!project.contains("Lib"));
        assert_eq!(project.copied_modules().len(), 1);
    }

    #[test]
    fn resolves_types_across_modules() {
        let object = TypeKey::new("mscorlib", "System", "Object");
        let base = definition("A", "Core", "Base", Some(object.clone()));
        let derived = definition("B", "App", "Derived", Some(TypeKey::new("A", "Core", "Base")));

        let mut project = Project::new(Settings::default());
        project
            .add_module(module("B", &["A"]).with_types(vec![derived.clone()]))
            .unwrap();
        project
            .add_module(module("A", &[]).with_types(vec![base.clone()]))
            .unwrap();

        let external = TypeReference::External(base.key.clone());
        assert!(project.resolve_type_definition(&external).is_none());

        project.load().unwrap();

        assert_eq!(project.resolve_type_definition(&external), Some(&base));
        let concrete = TypeReference::Definition(derived.clone());
        assert_eq!(project.resolve_type_definition(&concrete), Some(&derived));
        let missing = TypeReference::External(TypeKey::new("A", "Core", "Missing"));
        assert!(project.resolve_type_definition(&missing).is_none());
        let outside = TypeReference::External(object.clone());
        assert!(project.resolve_type_definition(&outside).is_none());

        assert!(project.contains_type(&base.key));
        assert!(!project.contains_type(&object));

        let inherit = project.inherit_map();
        assert_eq!(inherit.base_of(&derived.key), Some(&base.key));
        assert_eq!(inherit.derived_of(&base.key), [derived.key.clone()]);
        assert_eq!(inherit.ancestors(&derived.key), [&base.key, &object]);
    }

    #[test]
    fn derived_types_follow_registration() {
        let base = TypeKey::new("Base", "Core", "Base");
        let two = definition("Two", "Core", "Two", Some(base.clone()));
        let one = definition("One", "Core", "One", Some(base.clone()));

        let mut project = Project::new(Settings::default());
        project
            .add_module(module("Two", &["One"]).with_types(vec![two.clone()]))
            .unwrap();
        project
            .add_module(module("One", &["Base"]).with_types(vec![one.clone()]))
            .unwrap();
        let root = definition("Base", "Core", "Base", None);
        project
            .add_module(module("Base", &[]).with_types(vec![root]))
            .unwrap();

        let report = project.load().unwrap();
        assert_eq!(report.order, ["Base", "One", "Two"]);
        assert_eq!(
            project.inherit_map().derived_of(&base),
            [two.key.clone(), one.key.clone()]
        );
    }

    #[test]
    fn referencing_modules_are_selected() {
        let mut reader = FakeReader::new();
        let files = vec![
            reader.add("A", &[], false),
            reader.add("B", &["A"], false),
            reader.add("Native", &["A"], true),
            reader.add("Copy", &["A"], false),
            reader.add("Other", &[], false),
            PathBuf::from("junk.dll"),
        ];
        let inventory = Inventory::scan_files(&reader, files);

        let mut project = Project::new(Settings::default());
        project.add_module(module("A", &[])).unwrap();
        project.add_copied(module("Copy", &["A"])).unwrap();

        let report = project.add_referencing_modules(&inventory).unwrap();
        let names = |modules: &[ModuleDescriptor]| {
            modules
                .iter()
                .map(|m| m.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&report.referencing), ["B"]);
        assert_eq!(names(&report.unsupported), ["Native"]);
        assert!(!report.is_complete());
        assert_eq!(report.skipped.len(), 1);
        assert!(project.contains("B"));
        assert!(!project.contains("Native"));
        assert!(project.is_copied("Copy"));
    }
}
