use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## File Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond file boundaries
/// - [`Error::NotSupported`] - Unsupported file format or feature
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::GoblinErr`] - PE parsing errors from goblin crate
///
/// ## Project Errors
/// - [`Error::Configuration`] - Invalid settings, fatal for the whole run
/// - [`Error::DuplicateModule`] - A module name registered twice
///
/// ## Graph Errors
/// - [`Error::UnknownName`] - Name lookup in an index that never saw it
/// - [`Error::IndexOutOfRange`] - Id lookup outside of an index
///
/// # Examples
///
/// ```rust,no_run
/// use dotgraph::{Error, module::{CilModuleReader, ModuleReader, ReadOutcome}};
/// use dotgraph::project::{Settings, Variables};
///
/// match Settings::from_variables(&Variables::new()) {
///     Ok(settings) => println!("input: {}", settings.in_path.display()),
///     Err(Error::Configuration(message)) => eprintln!("bad configuration: {message}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// The project settings are unusable.
    ///
    /// Raised for a missing input directory, an output directory that cannot be created,
    /// conflicting key sources, unresolvable variables, or explicitly listed modules that
    /// cannot be read. Processing does not proceed after this error.
    #[error("Configuration error - {0}")]
    Configuration(String),

    /// A module with this name is already registered with the project.
    #[error("Module '{0}' is registered more than once")]
    DuplicateModule(String),

    /// A name was looked up in an index that was not built with it.
    ///
    /// This signals that an index and the graph built on it have drifted apart.
    #[error("Unknown name '{0}'")]
    UnknownName(String),

    /// An id was looked up outside of `[0, count)`.
    #[error("Index {index} is out of range for {count} entries")]
    IndexOutOfRange {
        /// The id that was requested
        index: usize,
        /// Number of entries of the index
        count: usize,
    },
}
