// logwarden - core/matcher.rs
//
// Per-file pattern matching behind a small trait so the search backend can
// be swapped (native regex, external tool, or a mock in tests) without
// touching the verifier logic.
//
// Both backends are line-oriented: a pattern matches a file when at least
// one line of the file matches. The subprocess backend distinguishes three
// outcomes of the external tool explicitly — exit 0 is "match", exit 1 is
// "no match", and anything else is an execution error. Treating every
// non-zero status as "no match" (or every non-one as "match") would let a
// crashed tool masquerade as a test result.

use crate::core::pattern::BannedPattern;
use crate::util::constants;
use crate::util::error::MatcherError;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Retry limits for transient I/O errors in the native matcher.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

/// A per-file pattern search backend.
pub trait PatternMatcher: Send + Sync {
    /// Returns true if any line of `file` matches `pattern`.
    ///
    /// A file that cannot be searched is an error, never a silent "no
    /// match" — skipping unreadable logs is a policy decision that belongs
    /// to the caller, not the matcher.
    fn pattern_exists_in(&self, file: &Path, pattern: &BannedPattern)
        -> Result<bool, MatcherError>;

    /// Backend name for logging and reports.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Native matcher
// =============================================================================

/// In-process matcher using the compiled pattern regex.
///
/// Matches at the byte level, so binary garbage in a log file is searched
/// rather than rejected as invalid UTF-8. Files at or above
/// `MMAP_THRESHOLD` are memory-mapped to avoid copying the whole file into
/// heap memory.
#[derive(Debug, Default)]
pub struct RegexMatcher;

impl PatternMatcher for RegexMatcher {
    fn pattern_exists_in(
        &self,
        file: &Path,
        pattern: &BannedPattern,
    ) -> Result<bool, MatcherError> {
        let meta = std::fs::metadata(file).map_err(|e| MatcherError::Io {
            file: file.to_path_buf(),
            source: e,
        })?;

        if meta.len() >= constants::MMAP_THRESHOLD {
            let handle = std::fs::File::open(file).map_err(|e| MatcherError::Io {
                file: file.to_path_buf(),
                source: e,
            })?;
            // SAFETY: the file is opened read-only and the map is never
            // mutated. External modification of a log file while it is
            // mapped could produce undefined behaviour; acceptable for a
            // post-run verifier reading already-written logs.
            let mmap = unsafe { memmap2::Mmap::map(&handle) }.map_err(|e| MatcherError::Io {
                file: file.to_path_buf(),
                source: e,
            })?;
            Ok(content_matches(&mmap, pattern))
        } else {
            let content = read_with_retry(file).map_err(|e| MatcherError::Io {
                file: file.to_path_buf(),
                source: e,
            })?;
            Ok(content_matches(&content, pattern))
        }
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// Line-oriented match over raw file content.
fn content_matches(content: &[u8], pattern: &BannedPattern) -> bool {
    content.split(|&b| b == b'\n').any(|line| {
        // Strip a trailing \r so CRLF logs behave like LF logs.
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        pattern.matches_line(line)
    })
}

/// Read a file with transient-error retries.
fn read_with_retry(path: &Path) -> io::Result<Vec<u8>> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..MAX_RETRIES {
        match std::fs::read(path) {
            Ok(content) => return Ok(content),
            Err(e) if is_transient_error(&e) => {
                tracing::debug!(
                    file = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "Transient I/O error, retrying"
                );
                std::thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                last_err = Some(e);
            }
            Err(e) => return Err(e), // Permanent error; do not retry.
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::other("Unknown read error")))
}

/// Returns true for transient I/O errors that are worth retrying.
fn is_transient_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// =============================================================================
// Subprocess matcher
// =============================================================================

/// Matcher that shells out to an external line-search tool (`grep -E` by
/// default).
///
/// The child's stdout is discarded and stderr is captured; neither is ever
/// surfaced into test output except inside an execution-error message.
#[derive(Debug, Clone)]
pub struct GrepMatcher {
    program: String,
}

impl GrepMatcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GrepMatcher {
    fn default() -> Self {
        Self::new(constants::DEFAULT_SEARCH_PROGRAM)
    }
}

impl PatternMatcher for GrepMatcher {
    fn pattern_exists_in(
        &self,
        file: &Path,
        pattern: &BannedPattern,
    ) -> Result<bool, MatcherError> {
        // -q suppresses match output; -e guards against patterns that start
        // with a dash; -- ends option parsing before the file path.
        let output = Command::new(&self.program)
            .arg("-E")
            .arg("-q")
            .arg("-e")
            .arg(&pattern.raw)
            .arg("--")
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MatcherError::ToolLaunch {
                program: self.program.clone(),
                source: e,
            })?;

        match output.status.code() {
            Some(constants::SEARCH_EXIT_MATCH) => Ok(true),
            Some(constants::SEARCH_EXIT_NO_MATCH) => Ok(false),
            _ => Err(MatcherError::ToolFailed {
                program: self.program.clone(),
                file: file.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "grep"
    }
}

// =============================================================================
// Tests
// =============================================================================
