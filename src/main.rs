// logwarden - main.rs
//
// CLI entry point. Handles:
// 1. Argument parsing and log-root resolution (flag, then environment)
// 2. Logging initialisation (debug mode support)
// 3. Pattern assembly (built-in + user TOML + ad-hoc)
// 4. Verification run, report export, and exit-code mapping
//
// Exit codes: 0 = all checks passed, 1 = banned pattern found,
// 2 = filesystem / configuration / search-tool failure.

use clap::{Parser, ValueEnum};
use logwarden::core::discovery::DiscoveryConfig;
use logwarden::core::matcher::{GrepMatcher, PatternMatcher, RegexMatcher};
use logwarden::core::pattern::{self, BannedPattern};
use logwarden::core::report::VerificationReport;
use logwarden::core::scanner::Verifier;
use logwarden::util::constants;
use logwarden::util::error::LogWardenError;
use std::path::PathBuf;
use std::time::Instant;

/// logwarden - post-run log verification.
///
/// Recursively scans a directory of server log files for banned message
/// patterns and fails if any are found.
#[derive(Parser, Debug)]
#[command(name = "logwarden", version, about)]
struct Cli {
    /// Log directory to scan (falls back to $LOGWARDEN_LOGS_DIR).
    log_dir: Option<PathBuf>,

    /// TOML file with additional banned patterns.
    #[arg(short = 'p', long = "patterns-file")]
    patterns_file: Option<PathBuf>,

    /// Ad-hoc banned pattern (extended regex, line-oriented). Repeatable.
    #[arg(short = 'e', long = "pattern")]
    patterns: Vec<String>,

    /// Run only the named built-in check(s). Repeatable.
    #[arg(short = 'c', long = "check")]
    checks: Vec<String>,

    /// Skip the built-in pattern set entirely.
    #[arg(long = "no-builtin")]
    no_builtin: bool,

    /// Pattern-matching backend.
    #[arg(short = 'm', long = "matcher", value_enum, default_value = "native")]
    matcher: MatcherKind,

    /// External search program for the grep backend.
    #[arg(long = "search-program", default_value = constants::DEFAULT_SEARCH_PROGRAM)]
    search_program: String,

    /// Exclude glob, matched against filenames and directory names. Repeatable.
    #[arg(short = 'x', long = "exclude")]
    excludes: Vec<String>,

    /// Record unreadable files as warnings instead of failing the scan.
    #[arg(long = "skip-unreadable")]
    skip_unreadable: bool,

    /// Write a report to this path (.csv = CSV, otherwise JSON).
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MatcherKind {
    /// In-process regex matching (memory-maps large files).
    Native,
    /// Shell out to an external line-search tool per file.
    Grep,
}

fn main() {
    let cli = Cli::parse();

    logwarden::util::logging::init(cli.debug);

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "logwarden starting"
    );

    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    // Resolve the log root: explicit argument first, environment fallback
    // for harness integration. The library itself never reads the
    // environment; the root becomes an explicit Verifier parameter here.
    let root = match cli
        .log_dir
        .clone()
        .or_else(|| std::env::var(constants::LOGS_DIR_ENV).ok().map(PathBuf::from))
    {
        Some(dir) => dir,
        None => {
            eprintln!(
                "Error: no log directory given; pass one as an argument or set ${}",
                constants::LOGS_DIR_ENV
            );
            return constants::EXIT_ERROR;
        }
    };

    let patterns = match assemble_patterns(&cli) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Pattern loading failed");
            eprintln!("Error: {e}");
            return constants::EXIT_ERROR;
        }
    };

    if patterns.is_empty() {
        eprintln!("Error: no patterns to check (--no-builtin with no extra patterns?)");
        return constants::EXIT_ERROR;
    }

    let matcher: Box<dyn PatternMatcher> = match cli.matcher {
        MatcherKind::Native => Box::new(RegexMatcher),
        MatcherKind::Grep => Box::new(GrepMatcher::new(cli.search_program.clone())),
    };

    let verifier = Verifier::new(&root, matcher).with_discovery_config(DiscoveryConfig {
        exclude_patterns: cli.excludes.clone(),
        skip_unreadable: cli.skip_unreadable,
    });

    let started_at = chrono::Utc::now();
    let start = Instant::now();

    let scans = match verifier.scan_all(&patterns) {
        Ok(scans) => scans,
        Err(e) => {
            tracing::error!(error = %e, "Scan failed");
            eprintln!("Error: {e}");
            return constants::EXIT_ERROR;
        }
    };

    let report = VerificationReport::from_scans(
        &root,
        verifier.matcher_name(),
        started_at,
        start.elapsed(),
        &scans,
    );

    if let Some(ref path) = cli.report {
        if let Err(e) = report.write_to_file(path) {
            tracing::error!(error = %e, "Report export failed");
            eprintln!("Error: {e}");
            return constants::EXIT_ERROR;
        }
        tracing::info!(path = %path.display(), "Report written");
    }

    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }

    if report.is_clean() {
        if report.vacuous_pass {
            eprintln!(
                "PASS (vacuous): '{}' contains no files; nothing was verified",
                root.display()
            );
        } else {
            eprintln!(
                "PASS: {} files clean against {} patterns",
                report.files_scanned, report.patterns_checked
            );
        }
        constants::EXIT_CLEAN
    } else {
        for m in &report.matches {
            eprintln!(
                "FAIL: '{}' contains banned pattern '{}' ({})",
                m.path.display(),
                m.pattern,
                m.pattern_id
            );
        }
        constants::EXIT_PATTERN_FOUND
    }
}

/// Assemble the pattern set: built-ins (optionally narrowed to --check ids),
/// then the user TOML file, then ad-hoc --pattern flags.
fn assemble_patterns(cli: &Cli) -> Result<Vec<BannedPattern>, LogWardenError> {
    let mut patterns: Vec<BannedPattern> = Vec::new();

    if !cli.no_builtin {
        let builtins = pattern::builtin_patterns();
        if cli.checks.is_empty() {
            patterns.extend(builtins);
        } else {
            for id in &cli.checks {
                let p = builtins.iter().find(|p| &p.id == id).cloned().ok_or(
                    logwarden::util::error::PatternError::UnknownId { id: id.clone() },
                )?;
                patterns.push(p);
            }
        }
    } else if !cli.checks.is_empty() {
        return Err(logwarden::util::error::PatternError::UnknownId {
            id: cli.checks[0].clone(),
        }
        .into());
    }

    if let Some(ref path) = cli.patterns_file {
        patterns.extend(pattern::load_patterns_file(path)?);
    }

    for (i, raw) in cli.patterns.iter().enumerate() {
        patterns.push(BannedPattern::new(&format!("cli-{}", i + 1), raw, "")?);
    }

    Ok(patterns)
}
