// logwarden - core/report.rs
//
// Verification report assembly and CSV/JSON export.
// Core layer: writes to any Write trait object.

use crate::core::scanner::PatternScan;
use crate::util::error::ReportError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One banned-pattern occurrence: which pattern, in which file.
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatchRecord {
    pub pattern_id: String,
    pub pattern: String,
    pub path: PathBuf,
}

/// Aggregate outcome of a verification run.
#[derive(Debug, Serialize)]
pub struct VerificationReport {
    /// The log root that was scanned.
    pub root: PathBuf,

    /// Matcher backend used ("native" or "grep").
    pub matcher: String,

    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,

    pub patterns_checked: usize,
    pub files_scanned: usize,

    /// True when the directory contained no files at all — the pass is
    /// vacuous, nothing was positively verified clean.
    pub vacuous_pass: bool,

    /// All occurrences across all patterns, in (pattern, path) order.
    pub matches: Vec<PatternMatchRecord>,

    /// Non-fatal warnings (skip-unreadable mode).
    pub warnings: Vec<String>,
}

impl VerificationReport {
    /// Assemble a report from per-pattern scan results.
    pub fn from_scans(
        root: &Path,
        matcher: &str,
        started_at: DateTime<Utc>,
        duration: Duration,
        scans: &[PatternScan],
    ) -> Self {
        let files_scanned = scans.iter().map(|s| s.files_scanned).max().unwrap_or(0);

        let matches: Vec<PatternMatchRecord> = scans
            .iter()
            .flat_map(|scan| {
                scan.matched_paths.iter().map(|path| PatternMatchRecord {
                    pattern_id: scan.pattern_id.clone(),
                    pattern: scan.pattern.clone(),
                    path: path.clone(),
                })
            })
            .collect();

        let warnings: Vec<String> = scans
            .iter()
            .flat_map(|scan| scan.warnings.iter().cloned())
            .collect();

        Self {
            root: root.to_path_buf(),
            matcher: matcher.to_string(),
            started_at,
            duration_ms: duration.as_millis() as u64,
            patterns_checked: scans.len(),
            files_scanned,
            vacuous_pass: files_scanned == 0,
            matches,
            warnings,
        }
    }

    /// True when no banned pattern was found anywhere.
    pub fn is_clean(&self) -> bool {
        self.matches.is_empty()
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// `report_path` is used for error messages only.
    pub fn write_json<W: Write>(&self, writer: W, report_path: &Path) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| ReportError::Json {
            path: report_path.to_path_buf(),
            source: e,
        })
    }

    /// Write the matches as CSV: pattern_id, pattern, path.
    pub fn write_csv<W: Write>(&self, writer: W, report_path: &Path) -> Result<(), ReportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(["pattern_id", "pattern", "path"])
            .map_err(|e| ReportError::Csv {
                path: report_path.to_path_buf(),
                source: e,
            })?;

        for record in &self.matches {
            csv_writer
                .write_record([
                    &record.pattern_id,
                    &record.pattern,
                    &record.path.display().to_string(),
                ])
                .map_err(|e| ReportError::Csv {
                    path: report_path.to_path_buf(),
                    source: e,
                })?;
        }

        csv_writer.flush().map_err(|e| ReportError::Io {
            path: report_path.to_path_buf(),
            source: e,
        })
    }

    /// Write the report to `path`, choosing the format from the extension
    /// (".csv" = CSV, anything else = JSON).
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        let file = std::fs::File::create(path).map_err(|e| ReportError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        if is_csv {
            self.write_csv(file, path)
        } else {
            self.write_json(file, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scan(pattern_id: &str, matched: &[&str], files_scanned: usize) -> PatternScan {
        PatternScan {
            pattern_id: pattern_id.to_string(),
            pattern: format!("{pattern_id}-regex"),
            matched_paths: matched.iter().map(PathBuf::from).collect(),
            files_scanned,
            warnings: Vec::new(),
        }
    }

    fn make_report(scans: &[PatternScan]) -> VerificationReport {
        VerificationReport::from_scans(
            Path::new("/var/log/impala"),
            "native",
            Utc::now(),
            Duration::from_millis(12),
            scans,
        )
    }

    #[test]
    fn test_clean_report() {
        let report = make_report(&[make_scan("a", &[], 3), make_scan("b", &[], 3)]);
        assert!(report.is_clean());
        assert_eq!(report.patterns_checked, 2);
        assert_eq!(report.files_scanned, 3);
        assert!(!report.vacuous_pass);
    }

    #[test]
    fn test_vacuous_pass_flagged() {
        let report = make_report(&[make_scan("a", &[], 0)]);
        assert!(report.is_clean());
        assert!(report.vacuous_pass);
    }

    #[test]
    fn test_matches_aggregated_across_patterns() {
        let report = make_report(&[
            make_scan("a", &["/logs/one.log"], 2),
            make_scan("b", &["/logs/one.log", "/logs/two.log"], 2),
        ]);
        assert!(!report.is_clean());
        assert_eq!(report.matches.len(), 3);
        assert_eq!(report.matches[0].pattern_id, "a");
        assert_eq!(report.matches[2].path, PathBuf::from("/logs/two.log"));
    }

    #[test]
    fn test_json_export() {
        let report = make_report(&[make_scan("raw-query-id", &["/logs/impalad.INFO"], 1)]);
        let mut buf = Vec::new();
        report.write_json(&mut buf, Path::new("out.json")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("raw-query-id"));
        assert!(output.contains("impalad.INFO"));
        assert!(output.contains("\"vacuous_pass\": false"));
    }

    #[test]
    fn test_csv_export() {
        let report = make_report(&[make_scan("raw-query-id", &["/logs/impalad.INFO"], 1)]);
        let mut buf = Vec::new();
        report.write_csv(&mut buf, Path::new("out.csv")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("pattern_id,pattern,path"));
        assert!(output.contains("raw-query-id"));
    }
}
