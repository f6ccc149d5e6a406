// Power ranker entry point.
//
// Run sequence:
// 1. Initialize tracing (log to file)
// 2. Load config (seeding config/ from defaults/ on first run)
// 3. Load the season and pick the week to rank
// 4. Compute the week's rankings
// 5. Attach deltas from the history store and record this week
// 6. Simulate playoff odds (when enabled)
// 7. Write report files and the history export
// 8. Print the tables

mod report;

use std::path::Path;

use anyhow::{bail, Context};
use ranker_core::config;
use ranker_core::db::HistoryStore;
use ranker_core::loader;
use ranker_engine::history::apply_history;
use ranker_engine::playoff::simulate_playoffs;
use ranker_engine::{compute_week, RankingWarning};
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Power ranker starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: league={}, year={}", config.league.name, config.league.year);

    // 3. Load the season
    let season = loader::load_season(&config).context("failed to load season data")?;
    let week = match config.league.week.or_else(|| season.last_completed_week()) {
        Some(week) => week,
        None => bail!("season {} has no completed games to rank", season.year()),
    };
    info!("Ranking week {week} of {}", season.year());

    // 4. Compute rankings
    let rankings = compute_week(&season, week, &config.ranking)
        .with_context(|| format!("failed to rank week {week}"))?;

    // 5. History
    let history_dir = Path::new(&config.paths.history_dir);
    let store = HistoryStore::open_for_year(history_dir, season.year())
        .context("failed to open rank history")?;
    let rankings = apply_history(rankings, &store).context("failed to update rank history")?;
    log_warnings(&rankings.warnings);

    // 6. Playoff odds
    let playoffs = if config.ranking.playoffs.enabled {
        let report = simulate_playoffs(&season, week, &config.ranking.playoffs)
            .context("failed to simulate playoff odds")?;
        Some(report)
    } else {
        info!("Playoff simulation disabled");
        None
    };

    // 7. Reports
    let output_dir = Path::new(&config.paths.output_dir);
    let dir = report::week_dir(output_dir, season.year(), week);
    report::write_week_reports(&dir, &rankings, playoffs.as_ref())
        .context("failed to write report files")?;
    let export = report::history_export_path(output_dir, season.year());
    let exported = store
        .export_csv(&export)
        .context("failed to export rank history")?;
    info!("Exported {exported} history rows to {}", export.display());

    // 8. Print
    println!("{}", report::format_rankings_table(&rankings));
    if let Some(report) = &playoffs {
        println!("{}", report::format_playoff_table(report));
    }

    info!("Power ranker finished week {week}");
    Ok(())
}

/// Defaulted knobs are summarized on one line; everything else is logged
/// individually.
fn log_warnings(warnings: &[RankingWarning]) {
    let defaulted: Vec<&str> = warnings
        .iter()
        .filter_map(|w| match w {
            RankingWarning::ConfigDefaulted { field } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    if !defaulted.is_empty() {
        info!("Using defaults for {} ranking knob(s): {}", defaulted.len(), defaulted.join(", "));
    }
    for warning in warnings
        .iter()
        .filter(|w| !matches!(w, RankingWarning::ConfigDefaulted { .. }))
    {
        warn!("{warning}");
    }
}

/// Initialize tracing to log to `logs/power-ranker.log`; stdout carries the
/// tables.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("power-ranker.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("ranker_app=info,ranker_engine=info,ranker_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
