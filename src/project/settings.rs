//! Project configuration.
//!
//! Configuration arrives as untyped name/value pairs in [`Variables`]. [`Settings`] reads the
//! values the project needs once, into typed fields, and is passed by reference from then on.

use std::{collections::HashMap, fs, path::PathBuf};

use crate::{Error::Configuration, Result};

/// Variable holding the input directory
pub const VAR_IN_PATH: &str = "InPath";
/// Variable holding the output directory
pub const VAR_OUT_PATH: &str = "OutPath";
/// Variable holding additional framework directories, separated like `PATH`
pub const VAR_EXTRA_FRAMEWORK_FOLDERS: &str = "ExtraFrameworkFolders";
/// Variable holding the strong name key file
pub const VAR_KEY_FILE: &str = "KeyFile";
/// Variable holding the strong name key container
pub const VAR_KEY_CONTAINER: &str = "KeyContainer";
/// Variable enabling the scan for modules that reference selected ones
pub const VAR_UPDATE_OTHER_MODULE_REFERENCES: &str = "UpdateOtherModuleReferences";
/// Variable holding the directory of the project file
pub const VAR_PROJECT_FILE_DIRECTORY: &str = "ProjectFileDirectory";

#[cfg(windows)]
const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_SEPARATOR: char = ':';

/// String-keyed configuration values.
///
/// Values may refer to other variables as `$(Name)`; references are substituted when a value
/// is read. A reference to a variable that is not defined stays in the value as written.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing an earlier value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Removes `name`, returning its raw value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Returns `true` if `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The substituted value of `name`, or of `default` when `name` is not defined.
    #[must_use]
    pub fn get_value(&self, name: &str, default: Option<&str>) -> Option<String> {
        self.values
            .get(name)
            .map(String::as_str)
            .or(default)
            .map(|value| self.replace(value))
    }

    /// Substitutes every `$(Name)` in `value` with the raw value of `Name`.
    #[must_use]
    pub fn replace(&self, value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find("$(") {
            let Some(length) = rest[start + 2..].find(')') else {
                break;
            };

            let name = &rest[start + 2..start + 2 + length];
            result.push_str(&rest[..start]);
            match self.values.get(name) {
                Some(replacement) => result.push_str(replacement),
                None => result.push_str(&rest[start..start + 3 + length]),
            }
            rest = &rest[start + 3 + length..];
        }

        result.push_str(rest);
        result
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut variables = Variables::new();
        for (name, value) in iter {
            variables.add(name, value);
        }
        variables
    }
}

/// Typed project settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding the input modules
    pub in_path: PathBuf,
    /// Directory the processed modules are written to
    pub out_path: PathBuf,
    /// Additional directories searched for framework modules
    pub extra_framework_folders: Vec<PathBuf>,
    /// Strong name key file
    pub key_file: Option<PathBuf>,
    /// Strong name key container
    pub key_container: Option<String>,
    /// Whether modules referencing selected ones are pulled into the project
    pub update_other_module_references: bool,
    /// Directory of the project file, for relative paths
    pub project_file_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            in_path: PathBuf::from("."),
            out_path: PathBuf::from("."),
            extra_framework_folders: Vec::new(),
            key_file: None,
            key_container: None,
            update_other_module_references: false,
            project_file_directory: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Reads the settings from `variables`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if both a key file and a key container are set,
    /// or if a flag is not `true` or `false`.
    pub fn from_variables(variables: &Variables) -> Result<Settings> {
        let text = |name: &str| {
            variables
                .get_value(name, None)
                .filter(|value| !value.is_empty())
        };

        let key_file = text(VAR_KEY_FILE).map(PathBuf::from);
        let key_container = text(VAR_KEY_CONTAINER);
        if key_file.is_some() && key_container.is_some() {
            return Err(Configuration(
                "'KeyFile' and 'KeyContainer' are mutually exclusive".to_string(),
            ));
        }

        let update_other_module_references = match text(VAR_UPDATE_OTHER_MODULE_REFERENCES) {
            None => false,
            Some(value) if value.eq_ignore_ascii_case("true") => true,
            Some(value) if value.eq_ignore_ascii_case("false") => false,
            Some(value) => {
                return Err(Configuration(format!(
                    "'{VAR_UPDATE_OTHER_MODULE_REFERENCES}' must be true or false, got '{value}'"
                )))
            }
        };

        let extra_framework_folders = text(VAR_EXTRA_FRAMEWORK_FOLDERS)
            .map(|value| {
                value
                    .split(PATH_SEPARATOR)
                    .filter(|folder| !folder.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Settings {
            in_path: PathBuf::from(text(VAR_IN_PATH).unwrap_or_else(|| ".".to_string())),
            out_path: PathBuf::from(text(VAR_OUT_PATH).unwrap_or_else(|| ".".to_string())),
            extra_framework_folders,
            key_file,
            key_container,
            update_other_module_references,
            project_file_directory: PathBuf::from(
                text(VAR_PROJECT_FILE_DIRECTORY).unwrap_or_else(|| ".".to_string()),
            ),
        })
    }

    /// Validates the directories: the input must exist, the output is created if missing.
    ///
    /// # Errors
    /// Returns [`crate::Error::Configuration`] if the input directory does not exist or the
    /// output directory cannot be created.
    pub fn check(&self) -> Result<()> {
        if !self.in_path.is_dir() {
            return Err(Configuration(format!(
                "Path specified by InPath variable must exist: {}",
                self.in_path.display()
            )));
        }

        if !self.out_path.is_dir() {
            fs::create_dir_all(&self.out_path).map_err(|error| {
                Configuration(format!(
                    "Could not create path specified by OutPath: {} ({error})",
                    self.out_path.display()
                ))
            })?;
        }

        Ok(())
    }
}
