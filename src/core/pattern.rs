// logwarden - core/pattern.rs
//
// Banned-pattern loading, validation, and compilation.
// Core layer: accepts TOML strings, never touches the filesystem directly
// (file I/O lives in `load_patterns_file`, which feeds content here).
//
// Patterns are line-oriented extended regular expressions. The same pattern
// string is handed verbatim to `grep -E` by the subprocess matcher, so the
// syntax must stay within the intersection of the `regex` crate and POSIX
// ERE: literals, character classes, alternation, anchors, escaped
// metacharacters. The built-in set uses nothing beyond that.

use crate::util::constants;
use crate::util::error::PatternError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML patterns file as deserialized from a .toml file.
/// Validated and compiled into `BannedPattern`s for runtime use.
#[derive(Debug, Deserialize)]
pub struct PatternsFile {
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<PatternDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct PatternDefinition {
    pub id: String,
    pub regex: String,
    #[serde(default)]
    pub rationale: String,
}

// =============================================================================
// Compiled pattern
// =============================================================================

/// A compiled banned pattern.
///
/// Matching is line-oriented and byte-based: `^`/`$` anchor at line
/// boundaries and non-UTF-8 log content is searched without an encoding
/// error, mirroring the behaviour of an external line-search tool.
#[derive(Debug, Clone)]
pub struct BannedPattern {
    /// Stable identifier, used in reports and error messages.
    pub id: String,

    /// The raw pattern string as written (also what the subprocess matcher
    /// passes to the search tool).
    pub raw: String,

    /// Why this message is banned. Informational only.
    pub rationale: String,

    regex: regex::bytes::Regex,
}

impl BannedPattern {
    /// Validate and compile a pattern.
    pub fn new(id: &str, raw: &str, rationale: &str) -> Result<Self, PatternError> {
        if id.is_empty() {
            return Err(PatternError::MissingField {
                pattern_id: "(empty)".to_string(),
                field: "id",
            });
        }
        if raw.is_empty() {
            return Err(PatternError::MissingField {
                pattern_id: id.to_string(),
                field: "regex",
            });
        }
        if raw.len() > constants::MAX_REGEX_PATTERN_LENGTH {
            return Err(PatternError::RegexTooLong {
                pattern_id: id.to_string(),
                length: raw.len(),
                max_length: constants::MAX_REGEX_PATTERN_LENGTH,
            });
        }

        let regex = regex::bytes::Regex::new(raw).map_err(|e| PatternError::InvalidRegex {
            pattern_id: id.to_string(),
            pattern: raw.to_string(),
            source: e,
        })?;

        Ok(Self {
            id: id.to_string(),
            raw: raw.to_string(),
            rationale: rationale.trim().to_string(),
            regex,
        })
    }

    /// Test a single log line (without its trailing newline) for the pattern.
    pub fn matches_line(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse a TOML string into raw pattern definitions.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_patterns_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<PatternsFile, PatternError> {
    toml::from_str(toml_content).map_err(|e| PatternError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate and compile a list of raw definitions, rejecting duplicates.
pub fn compile_definitions(
    defs: Vec<PatternDefinition>,
) -> Result<Vec<BannedPattern>, PatternError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut compiled = Vec::with_capacity(defs.len());

    for def in defs {
        if !seen.insert(def.id.clone()) {
            return Err(PatternError::DuplicateId { id: def.id });
        }
        compiled.push(BannedPattern::new(&def.id, &def.regex, &def.rationale)?);
    }

    if compiled.len() > constants::MAX_PATTERNS {
        return Err(PatternError::TooManyPatterns {
            count: compiled.len(),
            max: constants::MAX_PATTERNS,
        });
    }

    Ok(compiled)
}

/// Load and compile patterns from a TOML file on disk.
pub fn load_patterns_file(path: &Path) -> Result<Vec<BannedPattern>, PatternError> {
    let meta = std::fs::metadata(path).map_err(|e| PatternError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if meta.len() > constants::MAX_PATTERNS_FILE_SIZE {
        return Err(PatternError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max_size: constants::MAX_PATTERNS_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| PatternError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file = parse_patterns_toml(&content, path)?;
    let patterns = compile_definitions(file.patterns)?;

    tracing::debug!(
        path = %path.display(),
        patterns = patterns.len(),
        "Loaded user pattern file"
    );

    Ok(patterns)
}

// =============================================================================
// Built-in patterns
// =============================================================================

/// Embedded TOML content for the built-in banned patterns.
pub fn builtin_pattern_source() -> &'static str {
    include_str!("../../patterns/builtin.toml")
}

/// Load and compile the built-in banned patterns.
///
/// The embedded definitions are fixed at compile time; an invalid entry is
/// logged and skipped rather than aborting the whole check (the unit tests
/// assert all three compile, so this path is never taken in practice).
pub fn builtin_patterns() -> Vec<BannedPattern> {
    let path = PathBuf::from("<builtin>/builtin.toml");
    let defs = match parse_patterns_toml(builtin_pattern_source(), &path) {
        Ok(file) => file.patterns,
        Err(e) => {
            tracing::error!(error = %e, "Built-in patterns failed to parse");
            return Vec::new();
        }
    };

    let mut patterns = Vec::with_capacity(defs.len());
    for def in defs {
        match BannedPattern::new(&def.id, &def.regex, &def.rationale) {
            Ok(p) => patterns.push(p),
            Err(e) => {
                tracing::error!(error = %e, "Built-in pattern failed to compile, skipping");
            }
        }
    }
    patterns
}

// =============================================================================
// Tests
// =============================================================================
