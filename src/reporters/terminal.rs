use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

use crate::types::{
    AuthorStats, ContributionLevel, InsightReport, Phase, QuarterStability, RankEntry, StabilityPhase,
};

const HOTSPOT_ROWS: usize = 15;

pub fn report_terminal(report: &InsightReport, repo_name: &str) {
    let s = &report.summary;
    eprintln!();
    println!(
        "{} {} ({} commits, {} authors, as of {})",
        "🌙 gitinsight".cyan().bold(),
        repo_name.bold(),
        s.total_commits.to_string().bright_black(),
        s.total_authors.to_string().bright_black(),
        s.as_of.to_string().bright_black(),
    );
    println!();

    print_summary(report);

    if s.total_commits == 0 {
        println!("{}", "  No commits left to analyze after filtering.".yellow());
        println!();
        return;
    }

    print_night_periods(report);
    print_rankings(report);
    print_authors(&report.authors);
    print_hotspots(report);
    print_stability(&report.stability);
    println!();
}

fn print_summary(report: &InsightReport) {
    let s = &report.summary;
    println!("{}", "Summary".bold().underline());
    println!("  Timezone           UTC{}", s.timezone);
    println!(
        "  Commits            {} ({} automated removed of {})",
        s.total_commits, s.automated_removed, s.commits_before_filter
    );
    println!("  Authors            {} ({} active)", s.total_authors, s.active_authors);
    println!(
        "  Lines              {} / {} (net {})",
        format!("+{}", s.total_insertions).green(),
        format!("-{}", s.total_deletions).red(),
        s.net_lines
    );
    if let (Some(first), Some(last)) = (s.first_workday, s.last_workday) {
        println!("  Lifecycle          {first} → {last} ({} days)", s.lifecycle_days);
    }
    println!(
        "  Night commits      {} ({})",
        s.night_commits,
        pct(s.night_ratio)
    );
    if s.file_changes.orphaned > 0 {
        println!(
            "  {}",
            format!("⚠ {} file-change rows matched no commit", s.file_changes.orphaned).yellow()
        );
    }
    println!();
}

fn print_night_periods(report: &InsightReport) {
    println!("{}", "After-hours commits".bold().underline());
    let max = report.night_periods.iter().map(|p| p.commits).max().unwrap_or(0);
    for p in &report.night_periods {
        println!(
            "  {:<24} {:>6}  {:>6}  {}",
            p.label,
            p.commits,
            pct(p.share),
            bar(p.commits, max, 30).magenta()
        );
    }
    println!();
}

fn print_rankings(report: &InsightReport) {
    let r = &report.rankings;
    print_ranking("Top committers", &r.by_commits, "");
    print_ranking("Top night owls", &r.by_night_commits, "");
    print_ranking("Most active recently", &r.by_recent_commits, "");
    print_ranking("Longest maintenance", &r.by_maintenance_days, " days");
}

fn print_ranking(title: &str, entries: &[RankEntry], unit: &str) {
    if entries.is_empty() {
        return;
    }
    println!("{}", title.bold().underline());
    for (i, e) in entries.iter().enumerate() {
        println!("  {:>3}. {:<28} {}", i + 1, e.author, format!("{}{unit}", e.commits).cyan());
    }
    println!();
}

fn print_authors(authors: &[AuthorStats]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "AUTHOR", "COMMITS", "NIGHT", "NIGHT %", "FIRST", "LAST", "DAYS", "+/-", "PHASE", "LEVEL",
    ]);
    for a in authors {
        table.add_row(vec![
            Cell::new(truncate(&a.author, 24)),
            Cell::new(a.total_commits),
            Cell::new(a.night_commits),
            night_cell(a.night_ratio),
            Cell::new(a.first_workday),
            Cell::new(a.last_workday),
            Cell::new(a.maintenance_days),
            Cell::new(format!("+{}/-{}", a.insertions, a.deletions)),
            phase_cell(a.phase),
            level_cell(a.contribution_level),
        ]);
    }
    println!("{}", "Authors".bold().underline());
    println!("{table}");
    println!();
}

fn print_hotspots(report: &InsightReport) {
    if report.file_heatmap.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["RANK", "FILE", "TOUCHES", "CHURN", "ADD %"]);
    for (i, f) in report.file_heatmap.iter().take(HOTSPOT_ROWS).enumerate() {
        table.add_row(vec![
            Cell::new(format!("{:3}", i + 1)),
            Cell::new(truncate(&f.path, 48)),
            Cell::new(f.touches).add_attribute(Attribute::Bold),
            Cell::new(f.churn),
            Cell::new(format!("{:.1}%", f.add_ratio * 100.0)),
        ]);
    }
    println!("{}", "File hotspots".bold().underline());
    println!("{table}");
    println!();
}

fn print_stability(quarters: &[QuarterStability]) {
    if quarters.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["QUARTER", "COMMITS", "+", "-", "ADD %", "PHASE"]);
    for q in quarters {
        table.add_row(vec![
            Cell::new(&q.quarter),
            Cell::new(q.commits),
            Cell::new(q.insertions).fg(Color::Green),
            Cell::new(q.deletions).fg(Color::Red),
            Cell::new(format!("{:.1}%", q.add_ratio * 100.0)),
            stability_cell(q.phase),
        ]);
    }
    println!("{}", "Code stability".bold().underline());
    println!("{table}");
}

// ─── Cell builders ────────────────────────────────────────────────────────────

fn night_cell(ratio: f64) -> Cell {
    let text = format!("{:.1}%", ratio * 100.0);
    if ratio >= 0.5 {
        Cell::new(text).fg(Color::Magenta).add_attribute(Attribute::Bold)
    } else if ratio >= 0.2 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text)
    }
}

fn phase_cell(phase: Phase) -> Cell {
    let cell = Cell::new(phase);
    match phase {
        Phase::New       => cell.fg(Color::Cyan),
        Phase::Steady    => cell.fg(Color::Green),
        Phase::Declining => cell.fg(Color::Yellow),
        Phase::Dormant   => cell.fg(Color::DarkGrey),
    }
}

fn level_cell(level: ContributionLevel) -> Cell {
    let cell = Cell::new(level);
    match level {
        ContributionLevel::Core       => cell.add_attribute(Attribute::Bold),
        ContributionLevel::Regular    => cell,
        ContributionLevel::Occasional => cell.fg(Color::DarkGrey),
    }
}

fn stability_cell(phase: StabilityPhase) -> Cell {
    let cell = Cell::new(phase);
    match phase {
        StabilityPhase::FeatureDevelopment => cell.fg(Color::Green),
        StabilityPhase::Stable             => cell,
        StabilityPhase::Refactoring        => cell.fg(Color::Yellow),
        StabilityPhase::Idle               => cell.fg(Color::DarkGrey),
    }
}

// ─── Other helpers ────────────────────────────────────────────────────────────

fn pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat(value * width / max)
}

fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - (max - 1)).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_formats_stored_ratio() {
        assert_eq!(pct(1.0 / 3.0), "33.3%");
        assert_eq!(pct(0.0), "0.0%");
        assert_eq!(pct(1.0), "100.0%");
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10, 5).chars().count(), 5);
        assert_eq!(bar(5, 10, 10).chars().count(), 5);
        assert!(bar(3, 0, 10).is_empty());
    }

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate("short.rs", 20), "short.rs");
        let t = truncate("src/very/long/path/to/file.rs", 10);
        assert_eq!(t.chars().count(), 10);
        assert!(t.starts_with('…'));
        assert!(t.ends_with("file.rs"));
    }

    #[test]
    fn test_truncate_multibyte() {
        let t = truncate("开发者名字很长很长的作者", 5);
        assert_eq!(t.chars().count(), 5);
    }
}
