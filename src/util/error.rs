// logwarden - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal chain
// for diagnostic logging.
//
// The taxonomy keeps three outcomes strictly apart:
//   - Verification: a banned pattern was found (the check itself failed).
//   - Discovery:    the log root is missing/unreadable (filesystem failure).
//   - Matcher:      the search over a file could not be executed at all.
// Conflating the last with either of the first two masks infrastructure
// failures as test results, so each gets its own type.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logwarden operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogWardenError {
    /// A banned pattern was found in a log file.
    Verification(VerificationError),

    /// Log directory traversal failed.
    Discovery(DiscoveryError),

    /// A per-file search could not be executed.
    Matcher(MatcherError),

    /// Pattern loading or validation failed.
    Pattern(PatternError),

    /// Report export failed.
    Report(ReportError),
}

impl fmt::Display for LogWardenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verification(e) => write!(f, "Verification failed: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Matcher(e) => write!(f, "Matcher error: {e}"),
            Self::Pattern(e) => write!(f, "Pattern error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
        }
    }
}

impl std::error::Error for LogWardenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Verification(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Matcher(e) => Some(e),
            Self::Pattern(e) => Some(e),
            Self::Report(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Verification errors
// ---------------------------------------------------------------------------

/// A banned pattern was found where it must never appear.
#[derive(Debug)]
pub enum VerificationError {
    /// `path` contains at least one line matching the banned pattern.
    PatternFound {
        path: PathBuf,
        pattern_id: String,
        pattern: String,
    },
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PatternFound {
                path,
                pattern_id,
                pattern,
            } => write!(
                f,
                "'{}' contains banned pattern '{pattern}' ({pattern_id})",
                path.display()
            ),
        }
    }
}

impl std::error::Error for VerificationError {}

impl From<VerificationError> for LogWardenError {
    fn from(e: VerificationError) -> Self {
        Self::Verification(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to log directory traversal.
///
/// All of these are fatal: a missing or unreadable root must never be
/// reported as "zero matches found".
#[derive(Debug)]
pub enum DiscoveryError {
    /// The log root does not exist.
    RootNotFound { path: PathBuf },

    /// The log root is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the log root.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Walkdir traversal error (an individual file/dir beneath the root
    /// could not be accessed).
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogWardenError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Matcher errors
// ---------------------------------------------------------------------------

/// Errors executing the per-file search itself.
///
/// Distinct from both "pattern found" (exit 0 / a matching line) and a clean
/// "no match" (exit 1 / no matching line). A crashed or missing search tool
/// is an infrastructure failure, not a test result.
#[derive(Debug)]
pub enum MatcherError {
    /// I/O error reading a log file with the native matcher.
    Io { file: PathBuf, source: io::Error },

    /// The external search program could not be launched at all
    /// (missing binary, permission denied executing it).
    ToolLaunch {
        program: String,
        source: io::Error,
    },

    /// The external search program ran but exited with a status that is
    /// neither "match" nor "no match" (crash, usage error, signal).
    ToolFailed {
        program: String,
        file: PathBuf,
        status: String,
        stderr: String,
    },
}

impl fmt::Display for MatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { file, source } => {
                write!(f, "Cannot read '{}': {source}", file.display())
            }
            Self::ToolLaunch { program, source } => {
                write!(f, "Cannot launch search tool '{program}': {source}")
            }
            Self::ToolFailed {
                program,
                file,
                status,
                stderr,
            } => {
                write!(
                    f,
                    "Search tool '{program}' failed on '{}' ({status})",
                    file.display()
                )?;
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for MatcherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ToolLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MatcherError> for LogWardenError {
    fn from(e: MatcherError) -> Self {
        Self::Matcher(e)
    }
}

// ---------------------------------------------------------------------------
// Pattern errors
// ---------------------------------------------------------------------------

/// Errors related to banned-pattern loading and validation.
#[derive(Debug)]
pub enum PatternError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Patterns file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty in a pattern definition.
    MissingField {
        pattern_id: String,
        field: &'static str,
    },

    /// A pattern's regular expression is invalid.
    InvalidRegex {
        pattern_id: String,
        pattern: String,
        source: regex::Error,
    },

    /// A pattern exceeds the maximum allowed length.
    RegexTooLong {
        pattern_id: String,
        length: usize,
        max_length: usize,
    },

    /// Two loaded patterns share the same ID.
    DuplicateId { id: String },

    /// A check referenced a pattern ID that is not loaded.
    UnknownId { id: String },

    /// Maximum number of patterns exceeded.
    TooManyPatterns { count: usize, max: usize },

    /// I/O error reading a patterns file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Patterns file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { pattern_id, field } => {
                write!(f, "Pattern '{pattern_id}': missing required field '{field}'")
            }
            Self::InvalidRegex {
                pattern_id,
                pattern,
                source,
            } => write!(
                f,
                "Pattern '{pattern_id}': invalid regex '{pattern}': {source}"
            ),
            Self::RegexTooLong {
                pattern_id,
                length,
                max_length,
            } => write!(
                f,
                "Pattern '{pattern_id}': regex is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::DuplicateId { id } => {
                write!(f, "Duplicate pattern ID '{id}'")
            }
            Self::UnknownId { id } => {
                write!(f, "No loaded pattern with ID '{id}'")
            }
            Self::TooManyPatterns { count, max } => {
                write!(f, "Too many patterns loaded ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading patterns file '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PatternError> for LogWardenError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to report export.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing the report file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Report I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV report error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ReportError> for LogWardenError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Convenience type alias for logwarden results.
pub type Result<T> = std::result::Result<T, LogWardenError>;
