// Report files and the terminal table for one ranked week.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ranker_engine::playoff::PlayoffReport;
use ranker_engine::WeekRankings;
use serde::Serialize;
use tracing::info;

/// `<output_dir>/<year>/week<W>`.
pub fn week_dir(output_dir: &Path, year: i32, week: u32) -> PathBuf {
    output_dir.join(year.to_string()).join(format!("week{week}"))
}

/// `<output_dir>/<year>/history.csv`.
pub fn history_export_path(output_dir: &Path, year: i32) -> PathBuf {
    output_dir.join(year.to_string()).join("history.csv")
}

#[derive(Serialize)]
struct WeekReport<'a> {
    rankings: &'a WeekRankings,
    playoffs: Option<&'a PlayoffReport>,
}

// ---------------------------------------------------------------------------
// File outputs
// ---------------------------------------------------------------------------

/// Write every report file for the week into `dir`, creating it if needed.
/// Returns the paths written.
pub fn write_week_reports(
    dir: &Path,
    rankings: &WeekRankings,
    playoffs: Option<&PlayoffReport>,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::new();

    let path = dir.join("rankings.csv");
    write_rankings_csv(&path, rankings)?;
    written.push(path);

    let path = dir.join("rankings.json");
    let file = fs::File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &WeekReport { rankings, playoffs })
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    let path = dir.join("lsq_iterations.csv");
    write_lsq_trace(&path, rankings)?;
    written.push(path);

    if rankings.tier_density.is_some() {
        let path = dir.join("tier_density.csv");
        write_tier_density(&path, rankings)?;
        written.push(path);
    } else {
        info!("no density curve for week {}, skipping tier_density.csv", rankings.week);
    }

    if let Some(report) = playoffs {
        let path = dir.join("playoff_odds.csv");
        write_playoff_odds(&path, report)?;
        written.push(path);
    }

    info!("wrote {} report files to {}", written.len(), dir.display());
    Ok(written)
}

fn csv_writer(path: &Path) -> anyhow::Result<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

fn write_rankings_csv(path: &Path, rankings: &WeekRankings) -> anyhow::Result<()> {
    let mut wtr = csv_writer(path)?;
    for row in &rankings.rows {
        wtr.serialize(row)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per LSQ iteration, one column per team id.
fn write_lsq_trace(path: &Path, rankings: &WeekRankings) -> anyhow::Result<()> {
    let mut wtr = csv_writer(path)?;
    let mut header = vec!["iteration".to_string()];
    header.extend(rankings.lsq_team_ids.iter().map(|id| id.to_string()));
    wtr.write_record(&header)?;

    for (i, ratings) in rankings.lsq_trace.iter().enumerate() {
        let mut record = vec![i.to_string()];
        record.extend(ratings.iter().map(|r| r.to_string()));
        wtr.write_record(&record)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_tier_density(path: &Path, rankings: &WeekRankings) -> anyhow::Result<()> {
    let Some(curve) = &rankings.tier_density else {
        return Ok(());
    };
    let mut wtr = csv_writer(path)?;
    wtr.write_record(["power", "density", "tier_break"])?;
    for (x, y) in curve.grid.iter().zip(&curve.density) {
        let is_break = curve.minima.contains(x);
        wtr.write_record([x.to_string(), y.to_string(), is_break.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_playoff_odds(path: &Path, report: &PlayoffReport) -> anyhow::Result<()> {
    let mut wtr = csv_writer(path)?;
    for team in &report.teams {
        wtr.serialize(team)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Terminal output
// ---------------------------------------------------------------------------

/// `+2`, `-1`, `0`, or `-` when there is no previous week.
pub fn format_delta(delta: Option<i32>) -> String {
    match delta {
        Some(d) if d > 0 => format!("+{d}"),
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

/// Power table, one line per team in power-rank order.
pub fn format_rankings_table(rankings: &WeekRankings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Power rankings {} week {}", rankings.year, rankings.week);
    let _ = writeln!(
        out,
        "{:>4} {:>4} {:<24} {:>6} {:>7} {:>4} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Rank", "Chg", "Team", "W-L", "Power", "Tier", "Dom", "LSQ", "Col", "AWP", "SOS", "Luck", "Cons"
    );
    for row in &rankings.rows {
        let _ = writeln!(
            out,
            "{:>4} {:>4} {:<24} {:>6} {:>7.2} {:>4} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>6.3}",
            row.power_rank,
            format_delta(row.power_delta),
            truncate(&row.name, 24),
            format!("{}-{}", row.wins, row.losses),
            row.power,
            row.tier,
            row.dom,
            row.lsq,
            row.col,
            row.awp,
            row.sos,
            row.luck,
            row.cons,
        );
    }
    out
}

/// Playoff odds table, best odds first.
pub fn format_playoff_table(report: &PlayoffReport) -> String {
    let mut teams: Vec<_> = report.teams.iter().collect();
    teams.sort_by(|a, b| b.playoff_odds.total_cmp(&a.playoff_odds).then(a.team_id.cmp(&b.team_id)));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Playoff odds after week {} ({} simulated seasons)",
        report.week, report.trials
    );
    let _ = writeln!(
        out,
        "{:<24} {:>4} {:>7} {:>8} {:>8} {:>8}",
        "Team", "W", "xW", "Div", "WC", "Playoff"
    );
    for team in teams {
        let _ = writeln!(
            out,
            "{:<24} {:>4} {:>7.2} {:>7.1}% {:>7.1}% {:>7.1}%",
            truncate(&team.name, 24),
            team.wins,
            team.expected_wins,
            team.division_odds * 100.0,
            team.wildcard_odds * 100.0,
            team.playoff_odds * 100.0,
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).chain(['~']).collect()
    }
}
