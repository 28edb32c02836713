mod analyzers;
mod classify;
mod config;
mod engine;
mod error;
mod filters;
mod git;
mod periods;
mod reporters;
mod temporal;
mod types;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{EngineConfig, GitInsightConfig, OutputFormat};
use error::InsightError;

#[derive(Parser, Debug)]
#[command(
    name = "gitinsight",
    about = "🌙 Who commits, when, and how late: team activity from git history",
    version,
    long_about = "Reads the full history of a git repository and reports per-author \
                  activity, after-hours work, monthly personnel trends, file hotspots \
                  and code stability.\n\n\
                  Commit times are converted to a single timezone and commits made \
                  before the day-boundary hour count toward the previous workday."
)]
struct Args {
    /// Path to a git repository (defaults to the current directory).
    #[arg(value_name = "PATH")]
    repo_path: Option<PathBuf>,

    /// Output format [default: terminal]
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file. For --format html, defaults to gitinsight-<repo>.html
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to a YAML config file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print an annotated config template (or write it to FILE) and exit.
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    generate_config: Option<PathBuf>,

    /// Reference workday for activity and recency, YYYY-MM-DD [default: today]
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    /// Target timezone as a UTC offset, e.g. +08:00 [default: +08:00]
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    timezone: Option<String>,

    /// Commits before this local hour belong to the previous workday [default: 6]
    #[arg(long, value_name = "HOUR")]
    day_boundary_hour: Option<u32>,

    /// Days since last commit for an author to count as active [default: 180]
    #[arg(long, value_name = "DAYS")]
    activity_window_days: Option<i64>,

    /// Entries per ranking [default: 10]
    #[arg(long)]
    top: Option<usize>,

    /// Debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(target) = &args.generate_config {
        let path = (target.as_os_str() != "-").then_some(target.as_path());
        config::print_template(path).context("failed to write config template")?;
        if let Some(p) = path {
            eprintln!("✓ Config template written to {}", p.display());
        }
        return Ok(());
    }

    let file_config = match &args.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GitInsightConfig::default(),
    };
    let engine_config = merge_config(&args, &file_config)?;

    let repo_path = match &args.repo_path {
        Some(p) => p.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    if !repo_path.exists() {
        bail!("path does not exist: {}", repo_path.display());
    }
    let repo_name = repo_display_name(&repo_path);

    let format = args.format.or(file_config.format).unwrap_or(OutputFormat::Terminal);
    let output = args
        .output
        .clone()
        .or_else(|| file_config.output.as_ref().map(PathBuf::from))
        .or_else(|| (format == OutputFormat::Html).then(|| default_html_path(&repo_name)));

    let as_of = args
        .as_of
        .unwrap_or_else(|| temporal::current_workday(Utc::now(), &engine_config));
    debug!(?engine_config, %as_of, "resolved configuration");

    run_analysis(&repo_path, &repo_name, &engine_config, as_of, format, output.as_deref())
        .with_context(|| format!("analysis of {} failed", repo_path.display()))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// CLI flags over the config file over built-in defaults.
fn merge_config(args: &Args, file: &GitInsightConfig) -> anyhow::Result<EngineConfig> {
    let mut cfg = file.engine_config()?;
    if let Some(tz) = &args.timezone {
        cfg.utc_offset = config::parse_utc_offset(tz)?;
    }
    if let Some(h) = args.day_boundary_hour {
        cfg.day_boundary_hour = h;
    }
    if let Some(days) = args.activity_window_days {
        cfg.activity_window_days = days;
    }
    if let Some(n) = args.top {
        cfg.top_n = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

// ── Analysis pipeline ──────────────────────────────────────────────────────────

fn run_analysis(
    repo_path:   &Path,
    repo_name:   &str,
    config:      &EngineConfig,
    as_of:       NaiveDate,
    format:      OutputFormat,
    output_path: Option<&Path>,
) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("constant spinner template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    let total_start = Instant::now();
    let mut step_start = Instant::now();

    pb.set_message("[1/3] Reading git log...");
    let (commits, changes) = match git::log_parser::read_log(repo_path) {
        Ok(read) => read,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    let t1 = fmt_dur(step_start.elapsed()); step_start = Instant::now();
    pb.println(format!("  ✓ [1/3] Reading git log ({} commits)         {t1}", commits.len()));

    pb.set_message("[2/3] Computing metrics...");
    let report = match engine::analyze(&commits, &changes, config, as_of) {
        Ok(r) => r,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    let t2 = fmt_dur(step_start.elapsed()); step_start = Instant::now();
    pb.println(format!(
        "  ✓ [2/3] Metrics ({} automated commits removed)  {t2}",
        report.summary.automated_removed
    ));

    pb.set_message("[3/3] Rendering report...");
    let rendered = match format {
        OutputFormat::Json => reporters::json::report_json(&report, output_path),
        OutputFormat::Html => match output_path {
            Some(path) => reporters::html::report_html(&report, repo_name, path),
            None => Err(InsightError::Config("output path required for html".to_string())),
        },
        // Terminal output shares the screen with the spinner, so it is printed
        // after the spinner clears.
        OutputFormat::Terminal => Ok(()),
    };
    if let Err(e) = rendered {
        pb.finish_and_clear();
        return Err(e.into());
    }
    let t3 = fmt_dur(step_start.elapsed());
    pb.println(format!("  ✓ [3/3] Rendering report ({})              {t3}", format_name(format)));
    pb.finish_and_clear();

    eprintln!(
        "✔ [{}] {} commits, {} authors, {} files ⏱ {}",
        repo_name,
        report.summary.total_commits,
        report.summary.total_authors,
        report.file_heatmap.len(),
        fmt_dur(total_start.elapsed()),
    );

    if format == OutputFormat::Terminal {
        reporters::terminal::report_terminal(&report, repo_name);
    }
    debug!(elapsed = %t3, "rendered report");
    Ok(())
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Terminal => "terminal",
        OutputFormat::Json => "json",
        OutputFormat::Html => "html",
    }
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 { format!("{:.1}s", d.as_secs_f64()) } else { format!("{ms}ms") }
}

/// Last path component, resolving `.` and friends through the filesystem.
fn repo_display_name(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo")
        .to_string()
}

/// `gitinsight-<repo>.html` in the working directory, with unsafe characters
/// replaced by `-`.
fn default_html_path(repo_name: &str) -> PathBuf {
    let safe: String = repo_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '-' })
        .collect();
    PathBuf::from(format!("gitinsight-{safe}.html"))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("gitinsight").chain(argv.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_fmt_dur_milliseconds() {
        let s = fmt_dur(Duration::from_millis(250));
        assert_eq!(s, "250ms", "sub-second durations should use 'ms'");
    }

    #[test]
    fn test_fmt_dur_seconds() {
        let s = fmt_dur(Duration::from_millis(1_500));
        assert_eq!(s, "1.5s", "durations >= 1s should use decimal seconds");
    }

    #[test]
    fn test_default_html_path() {
        assert_eq!(default_html_path("my-app"), PathBuf::from("gitinsight-my-app.html"));
        assert_eq!(default_html_path("my app/v2"), PathBuf::from("gitinsight-my-app-v2.html"));
    }

    #[test]
    fn test_repo_display_name_resolves_dot() {
        let dir = tempfile::tempdir().unwrap();
        let name = repo_display_name(dir.path());
        assert!(!name.is_empty());
        assert_ne!(name, ".");
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file: GitInsightConfig =
            serde_yaml::from_str("timezone: \"+09:00\"\ntop: 5\nday_boundary_hour: 4\n").unwrap();
        let args = parse(&["--top", "3", "--timezone", "-05:00"]);
        let cfg = merge_config(&args, &file).unwrap();
        assert_eq!(cfg.top_n, 3, "CLI wins over file");
        assert_eq!(cfg.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(cfg.day_boundary_hour, 4, "file wins over default");
        assert_eq!(cfg.activity_window_days, config::DEFAULT_ACTIVITY_WINDOW_DAYS);
    }

    #[test]
    fn test_negative_timezone_offset_parses() {
        let args = parse(&["--timezone", "-03:30", "."]);
        assert_eq!(args.timezone.as_deref(), Some("-03:30"), "leading '-' is a value, not a flag");
        assert_eq!(args.repo_path, Some(PathBuf::from(".")));
        let cfg = merge_config(&args, &GitInsightConfig::default()).unwrap();
        assert_eq!(cfg.utc_offset.local_minus_utc(), -(3 * 3600 + 30 * 60));
    }

    #[test]
    fn test_format_name_labels_step_three() {
        assert_eq!(format_name(OutputFormat::Terminal), "terminal");
        assert_eq!(format_name(OutputFormat::Json), "json");
        assert_eq!(format_name(OutputFormat::Html), "html");
    }

    #[test]
    fn test_invalid_cli_value_rejected() {
        let args = parse(&["--day-boundary-hour", "20"]);
        assert!(merge_config(&args, &GitInsightConfig::default()).is_err());
    }

    #[test]
    fn test_generate_config_flag_forms() {
        assert_eq!(parse(&["--generate-config"]).generate_config, Some(PathBuf::from("-")));
        assert_eq!(
            parse(&["--generate-config", "out.yml"]).generate_config,
            Some(PathBuf::from("out.yml"))
        );
        assert!(parse(&[]).generate_config.is_none());
    }

    #[test]
    fn test_as_of_and_format_parse() {
        let args = parse(&["--as-of", "2024-03-31", "--format", "json", "repo"]);
        assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.repo_path, Some(PathBuf::from("repo")));
        assert!(Args::try_parse_from(["gitinsight", "--as-of", "31/03/2024"]).is_err());
    }
}
