// logwarden - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logwarden";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable consulted by the CLI when no log directory argument
/// is given. The library API never reads it; the root is always an explicit
/// parameter so the verifier stays independently testable.
pub const LOGS_DIR_ENV: &str = "LOGWARDEN_LOGS_DIR";

// =============================================================================
// Pattern limits
// =============================================================================

/// Maximum number of banned patterns that can be loaded (built-in + user).
pub const MAX_PATTERNS: usize = 100;

/// Maximum size of a patterns TOML file in bytes.
pub const MAX_PATTERNS_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Scanning limits
// =============================================================================

/// File size in bytes above which the native matcher memory-maps the file
/// instead of reading it into a heap buffer.
pub const MMAP_THRESHOLD: u64 = 4 * 1024 * 1024; // 4 MB

/// Maximum number of non-fatal warnings accumulated across a single scan.
/// Prevents the warnings Vec from growing without bound when a large
/// directory contains many unreadable files in skip-unreadable mode.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// External search tool
// =============================================================================

/// Default external line-search program for the subprocess matcher.
pub const DEFAULT_SEARCH_PROGRAM: &str = "grep";

/// Search tool exit status meaning "at least one line matched".
pub const SEARCH_EXIT_MATCH: i32 = 0;

/// Search tool exit status meaning "no line matched".
/// Any other status is an execution error, never a match or a clean miss.
pub const SEARCH_EXIT_NO_MATCH: i32 = 1;

// =============================================================================
// Process exit codes
// =============================================================================

/// All checks passed.
pub const EXIT_CLEAN: i32 = 0;

/// At least one banned pattern was found in a log file.
pub const EXIT_PATTERN_FOUND: i32 = 1;

/// Filesystem, configuration, or search-tool execution failure.
pub const EXIT_ERROR: i32 = 2;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
