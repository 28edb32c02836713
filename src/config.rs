use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::error::InsightError;

const DEFAULT_OFFSET_SECS: i32 = 8 * 3600;
pub const DEFAULT_DAY_BOUNDARY_HOUR: u32 = 6;
pub const DEFAULT_ACTIVITY_WINDOW_DAYS: i64 = 180;
pub const DEFAULT_AUTOMATION_SUFFIX: &str = "+0000";
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_RECENT_MONTHS: u32 = 3;

/// Latest boundary hour that still leaves the 18:00–20:00 buckets inside
/// the same workday.
const MAX_DAY_BOUNDARY_HOUR: u32 = 12;

/// Settings consumed by the metrics engine. Passed by value into every run;
/// nothing here is global.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub utc_offset: FixedOffset,
    pub day_boundary_hour: u32,
    pub activity_window_days: i64,
    pub automation_suffix: String,
    pub top_n: usize,
    pub recent_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            // Asia/Shanghai, no DST
            utc_offset:           FixedOffset::east_opt(DEFAULT_OFFSET_SECS).expect("constant offset in range"),
            day_boundary_hour:    DEFAULT_DAY_BOUNDARY_HOUR,
            activity_window_days: DEFAULT_ACTIVITY_WINDOW_DAYS,
            automation_suffix:    DEFAULT_AUTOMATION_SUFFIX.to_string(),
            top_n:                DEFAULT_TOP_N,
            recent_months:        DEFAULT_RECENT_MONTHS,
        }
    }
}

impl EngineConfig {
    /// Checks constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), InsightError> {
        if self.day_boundary_hour > MAX_DAY_BOUNDARY_HOUR {
            return Err(InsightError::Config(format!(
                "Invalid 'day_boundary_hour' value: {}. Must be between 0 and {MAX_DAY_BOUNDARY_HOUR}",
                self.day_boundary_hour
            )));
        }
        if self.activity_window_days <= 0 {
            return Err(InsightError::Config(format!(
                "Invalid 'activity_window_days' value: {}. Must be 1 or greater",
                self.activity_window_days
            )));
        }
        if self.automation_suffix.trim().is_empty() {
            return Err(InsightError::Config(
                "Invalid 'automation_suffix' value: must not be empty".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(InsightError::Config(
                "Invalid 'top' value: 0. Must be 1 or greater".to_string(),
            ));
        }
        if self.recent_months == 0 {
            return Err(InsightError::Config(
                "Invalid 'recent_months' value: 0. Must be 1 or greater".to_string(),
            ));
        }
        Ok(())
    }
}

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:UTC)?([+-])(\d{2}):?(\d{2})$").expect("offset regex"));

/// Parses `+08:00`, `+0800`, `UTC+08:00` or `-05:30` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, InsightError> {
    let invalid = || {
        InsightError::Config(format!(
            "Invalid 'timezone' value: \"{raw}\". Expected a UTC offset like \"+08:00\""
        ))
    };
    let caps = OFFSET_RE.captures(raw.trim()).ok_or_else(invalid)?;
    let hours: i32 = caps[2].parse().map_err(|_| invalid())?;
    let minutes: i32 = caps[3].parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }
    let secs = (hours * 3600 + minutes * 60) * if &caps[1] == "-" { -1 } else { 1 };
    FixedOffset::east_opt(secs).ok_or_else(invalid)
}

// ─── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Terminal,
    Json,
    Html,
}

// ─── Config File ──────────────────────────────────────────────────────────────

/// All settings that can be placed in a .gitinsight.yml config file.
/// Every field is optional; omitted fields fall back to built-in defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitInsightConfig {
    pub timezone: Option<String>,
    pub day_boundary_hour: Option<u32>,
    pub activity_window_days: Option<i64>,
    pub automation_suffix: Option<String>,
    pub top: Option<usize>,
    pub recent_months: Option<u32>,

    pub format: Option<OutputFormat>,
    pub output: Option<String>,
}

impl GitInsightConfig {
    /// Builds the engine settings from this file, filling gaps with defaults.
    pub fn engine_config(&self) -> Result<EngineConfig, InsightError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            utc_offset: match &self.timezone {
                Some(tz) => parse_utc_offset(tz)?,
                None => defaults.utc_offset,
            },
            day_boundary_hour:    self.day_boundary_hour.unwrap_or(defaults.day_boundary_hour),
            activity_window_days: self.activity_window_days.unwrap_or(defaults.activity_window_days),
            automation_suffix:    self.automation_suffix.clone().unwrap_or(defaults.automation_suffix),
            top_n:                self.top.unwrap_or(defaults.top_n),
            recent_months:        self.recent_months.unwrap_or(defaults.recent_months),
        };
        Ok(config)
    }

    /// Validates semantic constraints that serde cannot enforce.
    pub fn validate(&self) -> Result<(), InsightError> {
        self.engine_config()?.validate()
    }
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<GitInsightConfig, InsightError> {
    let content = std::fs::read_to_string(path)?;
    let cfg: GitInsightConfig = serde_yaml::from_str(&content)?;
    cfg.validate().map_err(|e| match e {
        InsightError::Config(msg) => InsightError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    Ok(cfg)
}

/// Annotated YAML template, printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# gitinsight configuration file
# Generated by: gitinsight --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
#
#   gitinsight --config .gitinsight.yml [path]

# ── Time handling ──────────────────────────────────────────────────────────────

# Timezone every commit is converted into, as a UTC offset.
# timezone: "+08:00"

# Commits before this local hour count toward the previous workday.
# Accepted range: 0-12.
# day_boundary_hour: 6

# ── Classification ─────────────────────────────────────────────────────────────

# An author is active when their last commit is within this many days.
# activity_window_days: 180

# Commits whose timestamp ends with this suffix are treated as automated.
# automation_suffix: "+0000"

# Window (in months) for the "recent commits" ranking.
# recent_months: 3

# ── Output ─────────────────────────────────────────────────────────────────────

# Entries per ranking table.
# top: 10

# Output format: terminal, json, html
# format: "terminal"

# Output file path (json/html).
# output: "gitinsight-report.html"
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<(), InsightError> {
    match output_path {
        Some(path) => Ok(std::fs::write(path, TEMPLATE)?),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
