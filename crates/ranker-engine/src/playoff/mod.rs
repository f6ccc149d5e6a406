// Playoff odds: analytic expected wins plus a Monte Carlo simulation of the
// remaining regular season.

pub mod simulate;
pub mod standings;

use ranker_core::config::PlayoffConfig;
use ranker_core::season::{Season, TeamId};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::RankingError;
use crate::record::team_records;
use simulate::{win_probability, Counts, Scenario, ScoreModel};
use standings::{current_seeding, CurrentSeeding, Standing};

pub const MAX_SIMULATIONS: usize = 1_000_000;
/// Trials per RNG stream inside a batch.
const CHUNK_TRIALS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOdds {
    pub team_id: TeamId,
    pub name: String,
    pub wins: u32,
    pub expected_wins: f64,
    pub division_odds: f64,
    pub wildcard_odds: f64,
    pub playoff_odds: f64,
}

/// Playoff odds after a given number of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergencePoint {
    pub trials: u64,
    /// Largest change in any team's playoff odds since the previous batch.
    pub max_change: Option<f64>,
    /// Same order as `PlayoffReport::teams`.
    pub playoff_odds: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayoffReport {
    pub week: u32,
    pub seed: u64,
    pub trials: u64,
    pub teams: Vec<TeamOdds>,
    pub seeding: CurrentSeeding,
    pub convergence: Vec<ConvergencePoint>,
}

/// Scenario for the season as of `week`: current standings for every team,
/// score models from games through `week`, and the unplayed regular-season
/// games after it.
pub fn build_scenario(season: &Season, week: u32) -> Result<Scenario, RankingError> {
    let window = season.window(week)?;
    let records = team_records(&window);

    let mut standings = Vec::with_capacity(season.teams().len());
    let mut models = Vec::with_capacity(season.teams().len());
    for team in season.teams() {
        let record = window.index_of(team.id).map(|i| &records[i]);
        standings.push(Standing {
            team_id: team.id,
            division_id: team.division_id,
            wins: record.map_or(0, |r| r.wins),
            points_for: record.map_or(0.0, |r| r.points_for),
        });
        models.push(ScoreModel::fit(
            record.map_or(&[][..], |r| r.weekly_scores.as_slice()),
        ));
    }

    let settings = season.settings();
    let position = |id: TeamId| season.teams().binary_search_by_key(&id, |t| t.id).ok();
    let remaining = season
        .games()
        .iter()
        .filter(|g| g.matchup_period > week && g.matchup_period <= settings.regular_season_weeks)
        .filter_map(|g| Some((position(g.home_team_id)?, position(g.away_team_id)?)))
        .collect();

    Ok(Scenario {
        standings,
        remaining,
        models,
        divisions: settings.divisions.clone(),
        spots: settings.playoff_team_count.min(season.teams().len()),
    })
}

/// Current wins plus the summed win probability of each remaining game.
pub fn expected_wins(scenario: &Scenario) -> Vec<f64> {
    let mut expected: Vec<f64> = scenario.standings.iter().map(|s| s.wins as f64).collect();
    for &(h, a) in &scenario.remaining {
        let p_home = win_probability(&scenario.models[h], &scenario.models[a]);
        expected[h] += p_home;
        expected[a] += 1.0 - p_home;
    }
    expected
}

fn playoff_odds(counts: &Counts) -> Vec<f64> {
    let trials = counts.trials.max(1) as f64;
    counts
        .division
        .iter()
        .zip(&counts.wildcard)
        .map(|(&d, &w)| (d + w) as f64 / trials)
        .collect()
}

/// Simulate the rest of the regular season from `week` and report each
/// team's odds of a division title, a wild card, and any playoff berth.
pub fn simulate_playoffs(
    season: &Season,
    week: u32,
    config: &PlayoffConfig,
) -> Result<PlayoffReport, RankingError> {
    let scenario = build_scenario(season, week)?;
    let n = scenario.standings.len();

    let mut remaining_games = vec![0u32; n];
    for &(h, a) in &scenario.remaining {
        remaining_games[h] += 1;
        remaining_games[a] += 1;
    }
    let seeding = current_seeding(
        &scenario.standings,
        &remaining_games,
        &scenario.divisions,
        scenario.spots,
    );
    let expected = expected_wins(&scenario);

    let total = config.num_simulations.min(MAX_SIMULATIONS);
    let batch_size = config.batch_size.max(1);
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        "simulating {total} seasons from week {week} ({} games left, seed {seed})",
        scenario.remaining.len()
    );

    let mut counts = Counts::new(n);
    let mut convergence = Vec::new();
    let mut previous: Option<Vec<f64>> = None;
    let mut next_chunk = 0u64;
    while (counts.trials as usize) < total {
        let batch = batch_size.min(total - counts.trials as usize);
        let batch_counts = scenario.run_batch(seed, next_chunk, batch, CHUNK_TRIALS);
        next_chunk += batch.div_ceil(CHUNK_TRIALS) as u64;
        counts = counts.merge(batch_counts);

        let odds = playoff_odds(&counts);
        let max_change = previous.as_ref().map(|prev| {
            prev.iter()
                .zip(&odds)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        });
        debug!("{} trials, max change {:?}", counts.trials, max_change);
        convergence.push(ConvergencePoint {
            trials: counts.trials,
            max_change,
            playoff_odds: odds.clone(),
        });
        previous = Some(odds);

        if let (Some(tol), Some(change)) = (config.tolerance, max_change) {
            if change < tol {
                info!("playoff odds converged after {} trials", counts.trials);
                break;
            }
        }
    }

    let trials = counts.trials.max(1) as f64;
    let teams = season
        .teams()
        .iter()
        .enumerate()
        .map(|(i, team)| TeamOdds {
            team_id: team.id,
            name: team.name.clone(),
            wins: scenario.standings[i].wins,
            expected_wins: expected[i],
            division_odds: counts.division[i] as f64 / trials,
            wildcard_odds: counts.wildcard[i] as f64 / trials,
            playoff_odds: (counts.division[i] + counts.wildcard[i]) as f64 / trials,
        })
        .collect();

    Ok(PlayoffReport {
        week,
        seed,
        trials: counts.trials,
        teams,
        seeding,
        convergence,
    })
}
