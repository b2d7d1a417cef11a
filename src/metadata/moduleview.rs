//! Identity, references and declared types of one managed module.
//!
//! [`ModuleView`] walks the CLI header, the metadata root, the `#Strings` heap and the tables
//! stream of a loaded [`File`] once and keeps only what the project graph needs. Nothing of
//! the image is retained after construction.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotgraph::metadata::moduleview::ModuleView;
//! use std::path::Path;
//!
//! let view = ModuleView::from_file(Path::new("bin/Library.dll"))?;
//! if let Some(assembly) = view.assembly() {
//!     println!("{} {}", assembly.name, assembly.version);
//! }
//! for reference in view.references() {
//!     println!("  -> {reference}");
//! }
//! # Ok::<(), dotgraph::Error>(())
//! ```

use std::{fmt, path::Path};

use crate::{
    file::File,
    metadata::{
        cor20header::{Cor20Header, CorFlags},
        root::Root,
        streams::{Strings, TablesHeader},
        tables::{AssemblyRaw, AssemblyRefRaw, ModuleRaw},
        typesystem::{TypeDefinition, TypeResolver},
    },
    Result,
};

/// Four part assembly version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Name and version from the assembly manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyName {
    /// Simple assembly name
    pub name: String,
    /// Assembly version
    pub version: AssemblyVersion,
}

/// The parts of a module's metadata the project graph works with.
#[derive(Debug, Clone)]
pub struct ModuleView {
    runtime_version: String,
    flags: CorFlags,
    module_name: String,
    assembly: Option<AssemblyName>,
    references: Vec<String>,
    types: Vec<TypeDefinition>,
}

impl ModuleView {
    /// Loads the module at `path`.
    ///
    /// # Errors
    /// Returns an error if the file is not a managed PE image or its metadata is damaged.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::from_file(path)?;
        Self::from_pe(&file)
    }

    /// Loads a module from a memory buffer.
    ///
    /// # Errors
    /// Returns an error if the buffer is not a managed PE image or its metadata is damaged.
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        let file = File::from_mem(data)?;
        Self::from_pe(&file)
    }

    /// Reads the metadata of an already loaded image.
    ///
    /// # Errors
    /// Returns an error if the CLI header, the metadata root, the `#Strings` heap or the tables
    /// stream are missing or damaged.
    pub fn from_pe(file: &File) -> Result<Self> {
        let (clr_rva, clr_size) = file.clr();
        let clr_offset = file.rva_to_offset(clr_rva)?;
        let cor20header = Cor20Header::read(file.data_slice(clr_offset, clr_size)?)?;

        let metadata_offset = file.rva_to_offset(cor20header.meta_data_rva as usize)?;
        let metadata = file.data_slice(metadata_offset, cor20header.meta_data_size as usize)?;
        let root = Root::read(metadata)?;

        let Some(strings_data) = root.stream(metadata, "#Strings") else {
            return Err(malformed_error!("Metadata has no #Strings heap"));
        };
        let strings = Strings::from(strings_data)?;

        let Some(tables_data) = root.tables_stream(metadata) else {
            return Err(malformed_error!("Metadata has no tables stream"));
        };
        let tables = TablesHeader::from(tables_data)?;

        let module_name = match tables.table::<ModuleRaw>() {
            Some(modules) => strings.get(modules.get(1)?.name as usize)?.to_string(),
            None => return Err(malformed_error!("Metadata has no Module table")),
        };

        let assembly = match tables.table::<AssemblyRaw>() {
            Some(manifest) if manifest.row_count() > 0 => {
                let row = manifest.get(1)?;
                Some(AssemblyName {
                    name: strings.get(row.name as usize)?.to_string(),
                    version: AssemblyVersion {
                        major: row.major_version,
                        minor: row.minor_version,
                        build: row.build_number,
                        revision: row.revision_number,
                    },
                })
            }
            _ => None,
        };

        let mut references: Vec<String> = Vec::new();
        if let Some(assembly_refs) = tables.table::<AssemblyRefRaw>() {
            for row in assembly_refs.iter() {
                let name = strings.get(row?.name as usize)?;
                if !references.iter().any(|known| known == name) {
                    references.push(name.to_string());
                }
            }
        }

        let scope = assembly
            .as_ref()
            .map_or(module_name.as_str(), |assembly| assembly.name.as_str());
        let types = TypeResolver::new(&strings, &tables, scope).definitions()?;

        Ok(ModuleView {
            runtime_version: root.version,
            flags: cor20header.flags,
            module_name,
            assembly,
            references,
            types,
        })
    }

    /// Runtime version string of the metadata root, e.g. `v4.0.30319`.
    #[must_use]
    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    /// Flags of the CLI header.
    #[must_use]
    pub fn flags(&self) -> CorFlags {
        self.flags
    }

    /// Returns `true` if the image holds managed code only.
    #[must_use]
    pub fn is_il_only(&self) -> bool {
        self.flags.contains(CorFlags::ILONLY)
    }

    /// File name recorded in the `Module` table.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The assembly manifest, `None` for a plain `.netmodule`.
    #[must_use]
    pub fn assembly(&self) -> Option<&AssemblyName> {
        self.assembly.as_ref()
    }

    /// Names of the referenced assemblies, without duplicates, in table order.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Declared types in `TypeDef` order.
    #[must_use]
    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// Consumes the view, returning the declared types.
    #[must_use]
    pub fn into_types(self) -> Vec<TypeDefinition> {
        self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::TypeKey, test::ModuleImageBuilder};

    #[test]
    fn identity_and_references() {
        let image = ModuleImageBuilder::new("Library")
            .version(1, 2, 3, 4)
            .reference("mscorlib")
            .reference("Core")
            .reference("mscorlib")
            .build();

        let view = ModuleView::from_mem(image).unwrap();

        assert_eq!(view.runtime_version(), "v4.0.30319");
        assert_eq!(view.module_name(), "Library.dll");
        assert!(view.is_il_only());

        let assembly = view.assembly().unwrap();
        assert_eq!(assembly.name, "Library");
        assert_eq!(assembly.version.to_string(), "1.2.3.4");
        assert_eq!(view.references(), ["mscorlib", "Core"]);
    }

    #[test]
    fn declared_types() {
        let image = ModuleImageBuilder::new("Library")
            .type_ref("mscorlib", "System", "Object")
            .type_def("Library", "Widget", Some("System.Object"))
            .type_def("Library", "Gadget", Some("Library.Widget"))
            .type_def("", "IShape", None)
            .nested_type_def("Library.Widget", "Part", Some("System.Object"))
            .build();

        let view = ModuleView::from_mem(image).unwrap();
        let types = view.types();

        assert_eq!(types.len(), 5);
        assert_eq!(types[0].key, TypeKey::new("Library", "", "<Module>"));

        assert_eq!(types[1].key, TypeKey::new("Library", "Library", "Widget"));
        assert_eq!(
            types[1].base,
            Some(TypeKey::new("mscorlib", "System", "Object"))
        );

        assert_eq!(
            types[2].base,
            Some(TypeKey::new("Library", "Library", "Widget"))
        );

        assert_eq!(types[3].key.full_name(), "IShape");
        assert!(types[3].base.is_none());

        assert_eq!(types[4].key, TypeKey::new("Library", "Library", "Widget/Part"));
        assert_eq!(types[4].key.full_name(), "Library.Widget/Part");
    }

    #[test]
    fn netmodule_scope() {
        let image = ModuleImageBuilder::new("Library")
            .without_assembly()
            .type_def("Library", "Widget", None)
            .build();

        let view = ModuleView::from_mem(image).unwrap();

        assert!(view.assembly().is_none());
        assert_eq!(view.types()[1].key.scope, "Library.dll");
    }

    #[test]
    fn mixed_mode() {
        let image = ModuleImageBuilder::new("Native").mixed_mode().build();
        let view = ModuleView::from_mem(image).unwrap();

        assert!(!view.is_il_only());
        assert!(!view.flags().contains(CorFlags::ILONLY));
    }

    #[test]
    fn not_a_module() {
        assert!(ModuleView::from_mem(b"MZ but nothing else".to_vec()).is_err());
        assert!(ModuleView::from_mem(
            ModuleImageBuilder::new("Native").without_clr_header().build()
        )
        .is_err());
    }
}
