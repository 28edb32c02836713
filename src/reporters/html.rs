use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::InsightError;
use crate::types::{AuthorStats, FileHeat, InsightReport, Phase, StabilityPhase};

const HOTSPOT_ROWS: usize = 25;

pub fn report_html(report: &InsightReport, repo_name: &str, output_file: &Path) -> Result<(), InsightError> {
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let html = build_html(report, repo_name, &generated)?;
    fs::write(output_file, html)?;
    eprintln!("✓ HTML report written to {}", output_file.display());
    Ok(())
}

fn build_html(report: &InsightReport, repo_name: &str, generated: &str) -> Result<String, InsightError> {
    let s = &report.summary;

    let daily_labels = js(&report.daily.iter().map(|d| d.date.to_string()).collect::<Vec<_>>())?;
    let daily_values = js(&report.daily.iter().map(|d| d.commits).collect::<Vec<_>>())?;
    let month_labels = js(&report.monthly.iter().map(|m| m.month.as_str()).collect::<Vec<_>>())?;
    let month_commits = js(&report.monthly.iter().map(|m| m.commits).collect::<Vec<_>>())?;
    let month_authors = js(&report.monthly.iter().map(|m| m.active_authors).collect::<Vec<_>>())?;
    let night_labels = js(&report.night_periods.iter().map(|p| p.label.as_str()).collect::<Vec<_>>())?;
    let night_values = js(&report.night_periods.iter().map(|p| p.commits).collect::<Vec<_>>())?;
    let hour_labels = js(&report.hourly.iter().map(|h| format!("{:02}:00", h.hour)).collect::<Vec<_>>())?;
    let hour_values = js(&report.hourly.iter().map(|h| h.commits).collect::<Vec<_>>())?;
    let tree = js(&report.file_tree)?;

    let author_rows: String = report.authors.iter().map(author_row).collect();
    let hotspot_rows: String = report
        .file_heatmap
        .iter()
        .take(HOTSPOT_ROWS)
        .enumerate()
        .map(|(i, f)| hotspot_row(i, f))
        .collect();
    let stability_rows: String = report
        .stability
        .iter()
        .map(|q| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num add\">+{}</td><td class=\"num del\">-{}</td>\
                 <td class=\"num\">{:.1}%</td><td>{}</td></tr>",
                esc(&q.quarter), q.commits, q.insertions, q.deletions, q.add_ratio * 100.0, stability_badge(q.phase)
            )
        })
        .collect();

    let night_pct = s.night_ratio * 100.0;
    let lifecycle = match (s.first_workday, s.last_workday) {
        (Some(first), Some(last)) => format!("{first} → {last}"),
        _ => "n/a".to_string(),
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>gitinsight · {repo}</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js"></script>
  <style>
    *,*::before,*::after{{box-sizing:border-box;margin:0;padding:0}}
    body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#0f172a;color:#e2e8f0;padding:2rem;font-size:14px;line-height:1.6}}
    h1{{font-size:1.75rem;font-weight:800}} h1 .moon{{color:#a78bfa}}
    h2{{font-size:1rem;font-weight:700;color:#94a3b8;text-transform:uppercase;letter-spacing:.06em;margin-bottom:1rem}}
    .meta{{color:#64748b;margin:.4rem 0 2rem;font-size:.8rem}} .meta span{{margin-right:1.5rem}}
    .stats{{display:grid;grid-template-columns:repeat(auto-fit,minmax(160px,1fr));gap:1rem;margin-bottom:1.5rem}}
    .stat{{background:#1e293b;border:1px solid #334155;border-radius:.625rem;padding:1rem 1.25rem}}
    .stat-label{{font-size:.7rem;text-transform:uppercase;letter-spacing:.06em;color:#64748b}}
    .stat-value{{font-size:2rem;font-weight:800;margin-top:.2rem}}
    .stat-value.violet{{color:#a78bfa}} .stat-value.blue{{color:#60a5fa}} .stat-value.green{{color:#4ade80}} .stat-value.slate{{color:#94a3b8}}
    .grid{{display:grid;grid-template-columns:repeat(auto-fit,minmax(420px,1fr));gap:1.5rem}}
    .card{{background:#1e293b;border:1px solid #334155;border-radius:.75rem;padding:1.5rem;margin-bottom:1.5rem}}
    .chart-wrap{{position:relative;height:280px}}
    table{{width:100%;border-collapse:collapse}}
    th{{text-align:left;padding:.5rem .75rem;border-bottom:2px solid #334155;font-size:.7rem;font-weight:700;text-transform:uppercase;letter-spacing:.06em;color:#64748b}}
    td{{padding:.5rem .75rem;border-bottom:1px solid #1a2744;vertical-align:middle}}
    tr:last-child td{{border-bottom:none}} tr:hover td{{background:#162032}}
    td.path{{font-family:'JetBrains Mono','Fira Code',ui-monospace,monospace;font-size:.78rem;color:#7dd3fc;word-break:break-all}}
    td.num{{text-align:right;color:#94a3b8}} td.add{{color:#4ade80}} td.del{{color:#f87171}}
    .dim{{color:#475569;font-size:.8em}}
    .badge{{display:inline-block;padding:.15rem .5rem;border-radius:999px;font-size:.7rem;font-weight:700;white-space:nowrap}}
    .badge-new{{background:rgba(56,189,248,.15);color:#7dd3fc}}
    .badge-steady{{background:rgba(34,197,94,.15);color:#86efac}}
    .badge-declining{{background:rgba(234,179,8,.15);color:#fde047}}
    .badge-dormant{{background:rgba(100,116,139,.2);color:#94a3b8}}
    .footer{{text-align:center;color:#334155;font-size:.75rem;margin-top:2rem}}
  </style>
</head>
<body>
  <h1><span class="moon">🌙</span> gitinsight · {repo}</h1>
  <p class="meta">
    <span>As of: <strong>{as_of}</strong></span>
    <span>Timezone: <strong>UTC{timezone}</strong></span>
    <span>Lifecycle: <strong>{lifecycle}</strong> ({lifecycle_days} days)</span>
    <span>Automated commits removed: <strong>{removed}</strong></span>
  </p>
  <div class="stats">
    <div class="stat"><div class="stat-label">Commits</div><div class="stat-value blue">{commits}</div></div>
    <div class="stat"><div class="stat-label">Authors</div><div class="stat-value slate">{authors}</div></div>
    <div class="stat"><div class="stat-label">Active Authors</div><div class="stat-value green">{active}</div></div>
    <div class="stat"><div class="stat-label">Night Commits</div><div class="stat-value violet">{night} <span class="dim">({night_pct:.1}%)</span></div></div>
    <div class="stat"><div class="stat-label">Net Lines</div><div class="stat-value slate">{net}</div></div>
  </div>
  <div class="card"><h2>Commits per Workday</h2><div class="chart-wrap"><canvas id="daily"></canvas></div></div>
  <div class="grid">
    <div class="card"><h2>Monthly Commits &amp; Active Authors</h2><div class="chart-wrap"><canvas id="monthly"></canvas></div></div>
    <div class="card"><h2>After-hours Commits</h2><div class="chart-wrap"><canvas id="night"></canvas></div></div>
  </div>
  <div class="grid">
    <div class="card"><h2>Commits by Hour of Day</h2><div class="chart-wrap"><canvas id="hourly"></canvas></div></div>
    <div class="card"><h2>Touches by Top-level Path</h2><div class="chart-wrap"><canvas id="tree"></canvas></div></div>
  </div>
  <div class="card">
    <h2>Authors</h2>
    <table>
      <thead><tr><th>Author</th><th style="text-align:right">Commits</th><th style="text-align:right">Night</th>
      <th style="text-align:right">Night %</th><th>First</th><th>Last</th><th style="text-align:right">Days</th>
      <th>Phase</th><th>Level</th></tr></thead>
      <tbody>{author_rows}</tbody>
    </table>
  </div>
  <div class="card">
    <h2>File Hotspots</h2>
    <table>
      <thead><tr><th>#</th><th>File</th><th style="text-align:right">Touches</th><th style="text-align:right">Churn</th>
      <th style="text-align:right">Add %</th></tr></thead>
      <tbody>{hotspot_rows}</tbody>
    </table>
  </div>
  <div class="card">
    <h2>Code Stability by Quarter</h2>
    <table>
      <thead><tr><th>Quarter</th><th style="text-align:right">Commits</th><th style="text-align:right">Added</th>
      <th style="text-align:right">Deleted</th><th style="text-align:right">Add %</th><th>Phase</th></tr></thead>
      <tbody>{stability_rows}</tbody>
    </table>
  </div>
  <p class="footer">Generated by gitinsight on {generated}</p>
  <script>
    const fileTree = {tree};
    const tick = {{ color: '#64748b' }};
    const grid = {{ color: '#1e2d47' }};
    const base = {{ responsive: true, maintainAspectRatio: false, plugins: {{ legend: {{ display: false }} }},
      scales: {{ y: {{ beginAtZero: true, ticks: tick, grid: grid }}, x: {{ ticks: tick, grid: {{ display: false }} }} }} }};
    new Chart(document.getElementById('daily'), {{ type: 'line',
      data: {{ labels: {daily_labels}, datasets: [{{ data: {daily_values}, borderColor: '#60a5fa', pointRadius: 0, tension: .2 }}] }},
      options: base }});
    new Chart(document.getElementById('monthly'), {{ type: 'bar',
      data: {{ labels: {month_labels}, datasets: [
        {{ label: 'Commits', data: {month_commits}, backgroundColor: 'rgba(96,165,250,0.75)', borderRadius: 4 }},
        {{ label: 'Active authors', data: {month_authors}, backgroundColor: 'rgba(74,222,128,0.75)', borderRadius: 4 }}] }},
      options: {{ ...base, plugins: {{ legend: {{ display: true, labels: tick }} }} }} }});
    new Chart(document.getElementById('night'), {{ type: 'bar',
      data: {{ labels: {night_labels}, datasets: [{{ data: {night_values}, backgroundColor: ['#c4b5fd', '#a78bfa', '#7c3aed'], borderRadius: 4 }}] }},
      options: base }});
    new Chart(document.getElementById('hourly'), {{ type: 'bar',
      data: {{ labels: {hour_labels}, datasets: [{{ data: {hour_values}, backgroundColor: 'rgba(148,163,184,0.6)', borderRadius: 3 }}] }},
      options: base }});
    new Chart(document.getElementById('tree'), {{ type: 'doughnut',
      data: {{ labels: fileTree.map(n => n.name), datasets: [{{ data: fileTree.map(n => n.value), borderColor: '#1e293b' }}] }},
      options: {{ responsive: true, maintainAspectRatio: false, plugins: {{ legend: {{ position: 'right', labels: tick }} }} }} }});
  </script>
</body>
</html>"#,
        repo = esc(repo_name),
        as_of = s.as_of,
        timezone = esc(&s.timezone),
        lifecycle = lifecycle,
        lifecycle_days = s.lifecycle_days,
        removed = s.automated_removed,
        commits = s.total_commits,
        authors = s.total_authors,
        active = s.active_authors,
        night = s.night_commits,
        night_pct = night_pct,
        net = s.net_lines,
        author_rows = author_rows,
        hotspot_rows = hotspot_rows,
        stability_rows = stability_rows,
        generated = esc(generated),
        tree = tree,
        daily_labels = daily_labels,
        daily_values = daily_values,
        month_labels = month_labels,
        month_commits = month_commits,
        month_authors = month_authors,
        night_labels = night_labels,
        night_values = night_values,
        hour_labels = hour_labels,
        hour_values = hour_values,
    ))
}

fn author_row(a: &AuthorStats) -> String {
    format!(
        "<tr><td>{} <span class=\"dim\">{}</span></td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
         <td class=\"num\">{:.1}%</td><td>{}</td><td>{}</td><td class=\"num\">{}</td><td>{}</td><td>{}</td></tr>",
        esc(&a.author),
        esc(&a.email),
        a.total_commits,
        a.night_commits,
        a.night_ratio * 100.0,
        a.first_workday,
        a.last_workday,
        a.maintenance_days,
        phase_badge(a.phase),
        a.contribution_level,
    )
}

fn hotspot_row(i: usize, f: &FileHeat) -> String {
    format!(
        "<tr><td class=\"num\">{}</td><td class=\"path\">{}</td><td class=\"num\"><strong>{}</strong></td>\
         <td class=\"num\">{}</td><td class=\"num\">{:.1}%</td></tr>",
        i + 1,
        esc(&f.path),
        f.touches,
        f.churn,
        f.add_ratio * 100.0,
    )
}

/// Serializes chart data for inline `<script>` use. `</` is escaped so a
/// name containing `</script>` cannot close the block.
fn js<T: Serialize + ?Sized>(value: &T) -> Result<String, InsightError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn phase_badge(phase: Phase) -> String {
    let class = match phase {
        Phase::New       => "badge-new",
        Phase::Steady    => "badge-steady",
        Phase::Declining => "badge-declining",
        Phase::Dormant   => "badge-dormant",
    };
    format!("<span class=\"badge {class}\">{phase}</span>")
}

fn stability_badge(phase: StabilityPhase) -> String {
    let class = match phase {
        StabilityPhase::FeatureDevelopment => "badge-new",
        StabilityPhase::Stable             => "badge-steady",
        StabilityPhase::Refactoring        => "badge-declining",
        StabilityPhase::Idle               => "badge-dormant",
    };
    format!("<span class=\"badge {class}\">{phase}</span>")
}
