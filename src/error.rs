use std::path::PathBuf;

/// Result type alias for the loading stage
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while loading the source tree.
///
/// Anything past loading (classification, comment parsing) degrades or is
/// skipped instead of producing one of these.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    EntryNotFound(PathBuf),
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::EntryNotFound(path) => {
                write!(f, "Entry point does not exist: {}", path.display())
            }
            Error::ParseError { file, message } => {
                write!(f, "Failed to parse {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<tree_sitter::LanguageError> for Error {
    fn from(err: tree_sitter::LanguageError) -> Self {
        Error::ParseError {
            file: PathBuf::from("<grammar>"),
            message: err.to_string(),
        }
    }
}
