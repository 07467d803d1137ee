// logwarden - core/scanner.rs
//
// The verifier: walks the log root, runs the matcher over every file for
// each banned pattern, and aggregates the outcome.
//
// Per-file searches are independent, so they are fanned out across the
// rayon pool. Aggregation restores determinism: the discovered file list is
// sorted by path before the parallel pass and results are folded back in
// that order, so the reported first offender (or first scan error) is the
// same on every run regardless of completion order.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::matcher::PatternMatcher;
use crate::core::pattern::{builtin_patterns, BannedPattern};
use crate::util::constants;
use crate::util::error::{
    LogWardenError, MatcherError, PatternError, Result, VerificationError,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Outcome of scanning one pattern across the whole log directory.
#[derive(Debug)]
pub struct PatternScan {
    pub pattern_id: String,
    pub pattern: String,

    /// Files containing at least one match, sorted by path. Empty = clean.
    pub matched_paths: Vec<PathBuf>,

    /// Number of files actually searched.
    pub files_scanned: usize,

    /// Non-fatal warnings (skip-unreadable mode only).
    pub warnings: Vec<String>,
}

impl PatternScan {
    pub fn is_clean(&self) -> bool {
        self.matched_paths.is_empty()
    }
}

/// Scans a log directory for banned patterns.
///
/// The root is an explicit constructor parameter rather than ambient process
/// state (an environment variable), so a verifier can be pointed at an
/// injected temporary directory in tests.
pub struct Verifier {
    root: PathBuf,
    matcher: Box<dyn PatternMatcher>,
    discovery: DiscoveryConfig,
}

impl Verifier {
    pub fn new(root: impl Into<PathBuf>, matcher: Box<dyn PatternMatcher>) -> Self {
        Self {
            root: root.into(),
            matcher,
            discovery: DiscoveryConfig::default(),
        }
    }

    pub fn with_discovery_config(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    /// Scan every file under the root for `pattern`, collecting all matches.
    ///
    /// A match is NOT an error at this level; callers that want assert
    /// semantics use [`assert_pattern_absent`](Self::assert_pattern_absent).
    /// A file that cannot be searched is fatal unless the discovery config
    /// enables `skip_unreadable`, in which case it becomes a warning.
    pub fn scan(&self, pattern: &BannedPattern) -> Result<PatternScan> {
        let (files, mut warnings) = discovery::collect_files(&self.root, &self.discovery)?;

        if files.is_empty() {
            // Vacuous pass: nothing was positively verified clean. Callers
            // must be able to tell this apart from a real pass.
            tracing::warn!(
                root = %self.root.display(),
                pattern = %pattern.id,
                "Log directory contains no files; check passes vacuously"
            );
        }

        // Parallel per-file search. `files` is sorted, so folding results in
        // index order keeps match and error reporting deterministic.
        let outcomes: Vec<std::result::Result<bool, MatcherError>> = files
            .par_iter()
            .map(|file| self.matcher.pattern_exists_in(file, pattern))
            .collect();

        let files_scanned = files.len();
        let mut matched_paths = Vec::new();

        for (file, outcome) in files.into_iter().zip(outcomes) {
            match outcome {
                Ok(true) => {
                    tracing::debug!(
                        file = %file.display(),
                        pattern = %pattern.id,
                        "Banned pattern present"
                    );
                    matched_paths.push(file);
                }
                Ok(false) => {}
                Err(e) if self.discovery.skip_unreadable => {
                    if warnings.len() < constants::MAX_WARNINGS {
                        warnings.push(format!("Skipped '{}': {e}", file.display()));
                    }
                    tracing::warn!(file = %file.display(), error = %e, "File skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            pattern = %pattern.id,
            files = files_scanned,
            matches = matched_paths.len(),
            warnings = warnings.len(),
            "Pattern scan complete"
        );

        Ok(PatternScan {
            pattern_id: pattern.id.clone(),
            pattern: pattern.raw.clone(),
            matched_paths,
            files_scanned,
            warnings,
        })
    }

    /// Scan a list of patterns, collecting all results.
    ///
    /// Matches are recorded in the returned scans rather than failing fast,
    /// so a report can show every offender. Filesystem and execution errors
    /// remain fatal.
    pub fn scan_all(&self, patterns: &[BannedPattern]) -> Result<Vec<PatternScan>> {
        patterns.iter().map(|p| self.scan(p)).collect()
    }

    /// Assert that `pattern` appears in no file under the root.
    ///
    /// Fails with a verification error naming the first offending path (in
    /// path order) and the pattern.
    pub fn assert_pattern_absent(&self, pattern: &BannedPattern) -> Result<()> {
        let scan = self.scan(pattern)?;
        match scan.matched_paths.into_iter().next() {
            None => Ok(()),
            Some(path) => Err(VerificationError::PatternFound {
                path,
                pattern_id: scan.pattern_id,
                pattern: scan.pattern,
            }
            .into()),
        }
    }

    /// Run a single built-in check by pattern ID.
    pub fn check(&self, pattern_id: &str) -> Result<()> {
        let pattern = builtin_patterns()
            .into_iter()
            .find(|p| p.id == pattern_id)
            .ok_or_else(|| {
                LogWardenError::Pattern(PatternError::UnknownId {
                    id: pattern_id.to_string(),
                })
            })?;
        self.assert_pattern_absent(&pattern)
    }

    // -------------------------------------------------------------------------
    // Canonical checks
    // -------------------------------------------------------------------------

    /// Logs must not contain InaccessibleObjectException.
    pub fn check_no_inaccessible_objects(&self) -> Result<()> {
        self.check("inaccessible-object")
    }

    /// Logs must not contain jamm.CannotAccessFieldException.
    pub fn check_no_unsupported_field_access(&self) -> Result<()> {
        self.check("cannot-access-field")
    }

    /// Logs must not contain raw TUniqueId( tokens. Query IDs are printed in
    /// the hex-pair format 8a4673c8fbe83a74:309751e900000000 instead.
    pub fn check_no_raw_query_ids(&self) -> Result<()> {
        self.check("raw-query-id")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::RegexMatcher;
    use crate::util::error::DiscoveryError;
    use std::fs;
    use tempfile::TempDir;

    fn verifier(root: &Path) -> Verifier {
        Verifier::new(root, Box::new(RegexMatcher))
    }

    fn pattern(raw: &str) -> BannedPattern {
        BannedPattern::new("test", raw, "").expect("test pattern compiles")
    }

    fn write_tree(entries: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, content) in entries {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(path, content).expect("write");
        }
        dir
    }

    #[test]
    fn test_clean_directory_passes() {
        let dir = write_tree(&[
            ("impalad.INFO", "all quiet\n"),
            ("sub/catalogd.INFO", "still quiet\n"),
        ]);
        verifier(dir.path())
            .assert_pattern_absent(&pattern("InaccessibleObjectException"))
            .unwrap();
    }

    #[test]
    fn test_match_fails_and_names_offending_file() {
        let dir = write_tree(&[
            ("impalad.INFO", "ok\n"),
            (
                "sub/impalad.ERROR",
                "Caused by: java.lang.reflect.InaccessibleObjectException: boo\n",
            ),
        ]);
        let err = verifier(dir.path())
            .assert_pattern_absent(&pattern("InaccessibleObjectException"))
            .unwrap_err();
        match err {
            LogWardenError::Verification(VerificationError::PatternFound { path, .. }) => {
                assert!(
                    path.ends_with("sub/impalad.ERROR"),
                    "reported path should be the offender, got {}",
                    path.display()
                );
            }
            other => panic!("expected PatternFound, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_collects_all_matches_sorted() {
        let dir = write_tree(&[
            ("b.log", "TUniqueId(2)\n"),
            ("a.log", "TUniqueId(1)\n"),
            ("c.log", "clean\n"),
        ]);
        let scan = verifier(dir.path())
            .scan(&pattern(r"(^|[^A-Za-z])TUniqueId\("))
            .unwrap();
        assert_eq!(scan.files_scanned, 3);
        let names: Vec<_> = scan
            .matched_paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.log", "b.log"]);
        assert!(!scan.is_clean());
    }

    #[test]
    fn test_empty_directory_is_vacuous_pass() {
        let dir = tempfile::tempdir().unwrap();
        let scan = verifier(dir.path()).scan(&pattern("anything")).unwrap();
        assert_eq!(scan.files_scanned, 0);
        assert!(scan.is_clean());
    }

    #[test]
    fn test_missing_root_is_error_not_pass() {
        let result = verifier(Path::new("/nonexistent/logwarden-root"))
            .assert_pattern_absent(&pattern("anything"));
        assert!(matches!(
            result,
            Err(LogWardenError::Discovery(DiscoveryError::RootNotFound { .. }))
        ));
    }

    #[test]
    fn test_idempotent_over_unchanged_directory() {
        let dir = write_tree(&[("app.log", "instance TUniqueId(0x1) leaked\n")]);
        let v = verifier(dir.path());
        let p = pattern(r"(^|[^A-Za-z])TUniqueId\(");
        let first = v.scan(&p).unwrap();
        let second = v.scan(&p).unwrap();
        assert_eq!(first.matched_paths, second.matched_paths);
        assert_eq!(first.files_scanned, second.files_scanned);
    }

    #[test]
    fn test_canonical_checks_on_offending_logs() {
        let dir = write_tree(&[(
            "impalad.INFO",
            "Caused by: java.lang.reflect.InaccessibleObjectException: module denied\n",
        )]);
        let v = verifier(dir.path());

        let err = v.check_no_inaccessible_objects().unwrap_err();
        assert!(
            err.to_string().contains("impalad.INFO"),
            "failure message should name the file, got: {err}"
        );
        // The other two checks pass on the same tree.
        v.check_no_unsupported_field_access().unwrap();
        v.check_no_raw_query_ids().unwrap();
    }

    #[test]
    fn test_hex_pair_query_id_is_accepted() {
        let dir = write_tree(&[(
            "impalad.INFO",
            "Query id: 8a4673c8fbe83a74:309751e900000000\n",
        )]);
        verifier(dir.path()).check_no_raw_query_ids().unwrap();
    }

    #[test]
    fn test_anchored_token_ignores_prefixed_identifier() {
        let dir = write_tree(&[("impalad.INFO", "registered SomeTUniqueId(123)\n")]);
        verifier(dir.path()).check_no_raw_query_ids().unwrap();
    }

    #[test]
    fn test_unknown_builtin_check_id() {
        let dir = tempfile::tempdir().unwrap();
        let result = verifier(dir.path()).check("no-such-check");
        assert!(matches!(
            result,
            Err(LogWardenError::Pattern(PatternError::UnknownId { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_fatal_by_default() {
        use std::os::unix::fs::PermissionsExt;

        let dir = write_tree(&[("secret.log", "content\n")]);
        let path = dir.path().join("secret.log");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = verifier(dir.path()).scan(&pattern("anything"));
        // Root can still read everything; only assert when the platform
        // actually enforces the permission bits.
        if fs::read(&path).is_err() {
            assert!(
                matches!(result, Err(LogWardenError::Matcher(_))),
                "unreadable file must fail the scan, got {result:?}"
            );
        }

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_skip_unreadable_downgrades_to_warning() {
        use std::os::unix::fs::PermissionsExt;

        let dir = write_tree(&[("secret.log", "content\n"), ("open.log", "clean\n")]);
        let path = dir.path().join("secret.log");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let v = Verifier::new(
            dir.path(),
            Box::new(RegexMatcher),
        )
        .with_discovery_config(DiscoveryConfig {
            skip_unreadable: true,
            ..Default::default()
        });

        let scan = v.scan(&pattern("anything")).unwrap();
        if fs::read(&path).is_err() {
            assert_eq!(scan.warnings.len(), 1, "skip should record one warning");
        }
        assert!(scan.is_clean());

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
