use std::fmt;
use std::path::PathBuf;

/// Fatal errors while loading a track.
#[derive(Debug)]
pub enum ConvertError {
    /// Input could not be opened or read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io { source, .. } => Some(source),
        }
    }
}

/// Why a single input line did not produce a fix. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceError {
    /// Line is not a `$GPRMC` sentence
    NotRmc,
    /// Fewer comma-separated fields than required
    TooFewFields(usize),
    /// Fix status other than `A`
    NoFix(String),
    /// A position field was not numeric
    MalformedField { field: &'static str, value: String },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceError::NotRmc => write!(f, "not a GPRMC sentence"),
            SentenceError::TooFewFields(n) => write!(f, "only {} fields, need 9", n),
            SentenceError::NoFix(status) => write!(f, "fix status {:?} is not valid", status),
            SentenceError::MalformedField { field, value } => {
                write!(f, "malformed {}: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for SentenceError {}
