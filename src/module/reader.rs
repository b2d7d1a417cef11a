use std::path::{Path, PathBuf};

use crate::{
    file::File,
    metadata::moduleview::ModuleView,
    module::ModuleDescriptor,
};

/// What reading one candidate file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A managed module
    Module(ModuleDescriptor),
    /// A managed image whose metadata could not be used
    Invalid {
        /// The file that was read
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
    /// Not a managed image at all, or not readable
    Unrecognized {
        /// The file that was read
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
}

impl ReadOutcome {
    /// The descriptor, if a module was read.
    #[must_use]
    pub fn into_module(self) -> Option<ModuleDescriptor> {
        match self {
            ReadOutcome::Module(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Why the file was rejected, `None` for a module.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            ReadOutcome::Module(_) => None,
            ReadOutcome::Invalid { reason, .. } | ReadOutcome::Unrecognized { reason, .. } => {
                Some(reason)
            }
        }
    }
}

/// Turns a file into a [`ModuleDescriptor`].
///
/// A reader never fails: files it cannot use are reported through [`ReadOutcome`] so callers
/// can skip them.
pub trait ModuleReader {
    /// Reads the module at `path`.
    fn read(&self, path: &Path) -> ReadOutcome;
}

impl<R: ModuleReader + ?Sized> ModuleReader for &R {
    fn read(&self, path: &Path) -> ReadOutcome {
        (**self).read(path)
    }
}

/// Reads managed PE images from disk.
///
/// The module is named after its assembly manifest; images without one are invalid since no
/// other module can reference them by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct CilModuleReader;

impl ModuleReader for CilModuleReader {
    fn read(&self, path: &Path) -> ReadOutcome {
        let file = match File::from_file(path) {
            Ok(file) => file,
            Err(error) => {
                return ReadOutcome::Unrecognized {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                }
            }
        };

        let view = match ModuleView::from_pe(&file) {
            Ok(view) => view,
            Err(error) => {
                return ReadOutcome::Invalid {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                }
            }
        };

        let Some(assembly) = view.assembly() else {
            return ReadOutcome::Invalid {
                path: path.to_path_buf(),
                reason: format!("'{}' has no assembly manifest", view.module_name()),
            };
        };

        let descriptor = ModuleDescriptor::new(
            path,
            assembly.name.clone(),
            view.references().iter().cloned(),
            !view.is_il_only(),
        );

        ReadOutcome::Module(descriptor.with_types(view.into_types()))
    }
}

/// Returns `true` if `path` has a `.dll` or `.exe` extension, in any case.
#[must_use]
pub fn is_binary_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("dll") || extension.eq_ignore_ascii_case("exe")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::ModuleImageBuilder;
    use std::fs;

    #[test]
    fn binary_extensions() {
        assert!(is_binary_file(Path::new("a/Library.dll")));
        assert!(is_binary_file(Path::new("Tool.EXE")));
        assert!(is_binary_file(Path::new("Mixed.Dll")));
        assert!(!is_binary_file(Path::new("Library.pdb")));
        assert!(!is_binary_file(Path::new("Library.dll.config")));
        assert!(!is_binary_file(Path::new("dll")));
    }

    #[test]
    fn reads_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = ModuleImageBuilder::new("B")
            .reference("A")
            .reference("mscorlib")
            .type_def("B", "Widget", None)
            .write_to(dir.path(), "B.dll");

        let descriptor = CilModuleReader.read(&path).into_module().unwrap();

        assert_eq!(descriptor.name(), "B");
        assert_eq!(descriptor.path(), path);
        assert_eq!(descriptor.references(), ["A", "mscorlib"]);
        assert!(!descriptor.is_mixed_mode());
        assert_eq!(descriptor.types().len(), 2);
    }

    #[test]
    fn mixed_mode_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = ModuleImageBuilder::new("Native")
            .mixed_mode()
            .write_to(dir.path(), "Native.dll");

        let descriptor = CilModuleReader.read(&path).into_module().unwrap();
        assert!(descriptor.is_mixed_mode());
    }

    #[test]
    fn rejected_files() {
        let dir = tempfile::tempdir().unwrap();

        let junk = dir.path().join("junk.dll");
        fs::write(&junk, b"definitely not a module").unwrap();
        assert!(matches!(
            CilModuleReader.read(&junk),
            ReadOutcome::Unrecognized { .. }
        ));

        let native = ModuleImageBuilder::new("Native")
            .without_clr_header()
            .write_to(dir.path(), "native.dll");
        assert!(matches!(
            CilModuleReader.read(&native),
            ReadOutcome::Unrecognized { .. }
        ));

        let netmodule = ModuleImageBuilder::new("Part")
            .without_assembly()
            .write_to(dir.path(), "Part.dll");
        let outcome = CilModuleReader.read(&netmodule);
        assert!(matches!(outcome, ReadOutcome::Invalid { .. }));
        assert!(outcome.reason().unwrap().contains("Part.dll"));

        let missing = CilModuleReader.read(&dir.path().join("missing.dll"));
        assert!(missing.reason().is_some());
    }
}
