// logwarden - core/discovery.rs
//
// Recursive traversal of the log directory.
//
// Every regular file beneath the root is a scan target; the file set is
// discovered fresh on every scan, never cached. Symlinks are not followed
// (the walker default) and no special-case handling is added on top.
//
// A missing or unreadable root is always fatal: reporting "zero matches"
// for a directory that was never actually read would be a false negative.

use crate::util::error::DiscoveryError;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for a discovery pass.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended
    /// into. Empty by default: a verifier scans everything under the root.
    pub exclude_patterns: Vec<String>,

    /// When true, entries that cannot be accessed during traversal are
    /// recorded as warnings instead of failing the scan. Off by default;
    /// a verifier that silently skips unreadable logs gives false assurance.
    pub skip_unreadable: bool,
}

/// Enumerate every regular file under `root`.
///
/// Returns the file list sorted by path (so downstream reporting is
/// deterministic regardless of traversal order) plus any non-fatal warnings
/// collected in `skip_unreadable` mode.
///
/// # Fatal errors
/// - `RootNotFound` / `NotADirectory` / `PermissionDenied` for the root.
/// - `Traversal` for any inaccessible entry, unless `skip_unreadable` is set.
pub fn collect_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    // Pre-flight validation. `fs::metadata` is used rather than
    // `Path::exists()` / `Path::is_dir()` because those helpers map ALL
    // errors, including PermissionDenied, to `false`, making an
    // access-denied root indistinguishable from a missing one.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            });
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
    }

    let exclude_pats = compile_patterns(&config.exclude_patterns);

    let mut files: Vec<PathBuf> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // `filter_entry` short-circuits directory descent for excluded directory
    // names, so an excluded subtree is never traversed at all.
    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                // Always allow the root itself.
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true // Files are filtered individually below.
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                if config.skip_unreadable {
                    let msg = format!("Cannot access '{}': {e}", path.display());
                    tracing::warn!(warning = %msg, "Traversal warning");
                    warnings.push(msg);
                    continue;
                }
                return Err(DiscoveryError::Traversal { path, source: e });
            }
        };

        // Only regular files are scan targets.
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_str().unwrap_or("");
        if is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = %entry.path().display(), "Excluded by pattern");
            continue;
        }

        files.push(entry.into_path());
    }

    // Walk order is filesystem-dependent; sort so callers can rely on a
    // stable order for reporting.
    files.sort_unstable();

    tracing::debug!(
        root = %root.display(),
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid exclude pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `dir_name` matches any exclude pattern that contains no
/// wildcard characters. These are treated as directory component exclusions
/// (e.g. "archive") rather than filename glob patterns.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

/// Returns true if `file_name` matches any exclude pattern (wildcard or literal).
fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("impalad.INFO"), "I0101 startup complete\n").expect("write INFO");
        fs::write(root.join("impalad.ERROR"), "E0101 something failed\n").expect("write ERROR");

        let sub = root.join("coordinator");
        fs::create_dir(&sub).expect("mkdir coordinator");
        fs::write(sub.join("catalogd.INFO"), "I0101 catalog ready\n").expect("write sub INFO");

        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_collects_all_regular_files_recursively() {
        let dir = make_temp_tree();
        let (files, warnings) = collect_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let names = names(&files);
        assert!(names.contains(&"impalad.INFO".to_string()), "got {names:?}");
        assert!(names.contains(&"impalad.ERROR".to_string()));
        assert!(names.contains(&"catalogd.INFO".to_string()));
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_file_list_is_sorted() {
        let dir = make_temp_tree();
        let (files, _) = collect_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        let mut sorted = files.clone();
        sorted.sort_unstable();
        assert_eq!(files, sorted, "file list should be sorted by path");
    }

    #[test]
    fn test_empty_directory_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let (files, warnings) = collect_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert!(files.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_root_not_found() {
        let result = collect_files(
            Path::new("/nonexistent/path/logwarden"),
            &DiscoveryConfig::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir.log");
        fs::write(&file, "content").unwrap();
        let result = collect_files(&file, &DiscoveryConfig::default());
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_exclude_directory_component() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            exclude_patterns: vec!["coordinator".to_string()],
            ..Default::default()
        };
        let (files, _) = collect_files(dir.path(), &config).unwrap();
        let names = names(&files);
        assert!(names.contains(&"impalad.INFO".to_string()));
        assert!(
            !names.contains(&"catalogd.INFO".to_string()),
            "excluded dir should not be descended into"
        );
    }

    #[test]
    fn test_exclude_filename_glob() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            exclude_patterns: vec!["*.ERROR".to_string()],
            ..Default::default()
        };
        let (files, _) = collect_files(dir.path(), &config).unwrap();
        let names = names(&files);
        assert!(!names.contains(&"impalad.ERROR".to_string()));
        assert!(names.contains(&"impalad.INFO".to_string()));
    }
}
