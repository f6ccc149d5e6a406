// Iteratively reweighted least-squares ratings.
//
// Each decided game produces a target rating difference R_g between home and
// away. Ratings are solved in a [30, 130] box, then games are reweighted so
// that mismatches between far-apart teams count less, and the solve repeats.
// The final score averages the late iterations, squashes with tanh, and
// normalizes to the league max.

pub mod solver;

use nalgebra::{DMatrix, DVector};
use ranker_core::config::LsqConfig;
use ranker_core::season::{Game, SeasonWindow, Winner};
use tracing::{debug, warn};

use crate::error::{RankingError, RankingWarning};
use crate::scale::normalize_by_max;
use solver::BoundedLeastSquares;

pub const ITERATIONS: usize = 100;
/// Iterations averaged into the final rating (inclusive range).
pub const AVERAGE_FIRST: usize = 71;
pub const AVERAGE_LAST: usize = 99;
pub const RATING_FLOOR: f64 = 30.0;
pub const RATING_CEILING: f64 = 130.0;
const SQUASH_SCALE: f64 = 75.0;
const SPREAD_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct LsqOutcome {
    /// Final score per team, aligned with `window.team_ids()`.
    pub scores: Vec<f64>,
    /// Raw box-bounded ratings, one vector per iteration.
    pub trace: Vec<Vec<f64>>,
    pub warnings: Vec<RankingWarning>,
}

/// Target home-minus-away rating difference for one game.
pub fn game_value(game: &Game, config: &LsqConfig) -> f64 {
    let home = game.home_points();
    let away = game.away_points();
    let margin = home - away;

    let (sign, winner_score) = match game.winner {
        Winner::Home => (1.0, home),
        Winner::Away => (-1.0, away),
        Winner::Undecided => (0.0, 0.0),
    };
    let ratio = if winner_score == 0.0 {
        0.0
    } else {
        config.bonus_ratio * margin / winner_score
    };

    sign * config.bonus_win + config.ds_max * (margin / config.ds_max).tanh() + ratio
}

/// Per-game weights from the previous iteration's ratings.
fn game_weights(games: &[(usize, usize)], ratings: &DVector<f64>, beta_w: f64) -> Vec<f64> {
    let spread = ratings.max() - ratings.min();
    if spread < SPREAD_EPSILON {
        return vec![1.0; games.len()];
    }
    let alpha = spread / (beta_w * beta_w).ln();
    games
        .iter()
        .map(|&(h, a)| (-(ratings[h] - ratings[a]).abs() / alpha).exp())
        .collect()
}

pub fn lsq(window: &SeasonWindow<'_>, config: &LsqConfig) -> Result<LsqOutcome, RankingError> {
    let n = window.num_teams();
    let mut pairs = Vec::with_capacity(window.games().len());
    let mut values = Vec::with_capacity(window.games().len());
    for game in window.games() {
        let (Some(h), Some(a)) = (
            window.index_of(game.home_team_id),
            window.index_of(game.away_team_id),
        ) else {
            continue;
        };
        pairs.push((h, a));
        values.push(game_value(game, config));
    }

    let solver = BoundedLeastSquares::new(RATING_FLOOR, RATING_CEILING);
    let mut trace: Vec<Vec<f64>> = Vec::with_capacity(ITERATIONS);
    let mut weights: Vec<f64> = vec![1.0; pairs.len()];
    let mut failed = 0usize;
    let mut first_failed = None;
    let mut last_step = 0.0;

    for iteration in 0..ITERATIONS {
        // sigma_g = 1 / sqrt(w_g), so each row scales by sqrt(w_g).
        let mut a = DMatrix::zeros(pairs.len(), n);
        let mut b = DVector::zeros(pairs.len());
        for (g, (&(h, aw), &w)) in pairs.iter().zip(&weights).enumerate() {
            let scale = w.sqrt();
            a[(g, h)] = scale;
            a[(g, aw)] = -scale;
            b[g] = values[g] * scale;
        }

        let solution = solver.solve(&a, &b);
        if !solution.converged {
            failed += 1;
            first_failed.get_or_insert(iteration);
            last_step = solution.last_step;
        }

        weights = game_weights(&pairs, &solution.x, config.beta_w);
        trace.push(solution.x.iter().copied().collect());
    }

    let mut warnings = Vec::new();
    if let Some(first_iteration) = first_failed {
        warn!(
            "LSQ solver did not converge in {failed} of {ITERATIONS} iterations (first: {first_iteration})"
        );
        warnings.push(RankingWarning::SolverNotConverged {
            first_iteration,
            failed_iterations: failed,
            last_step,
        });
    }

    let averaged = &trace[AVERAGE_FIRST..=AVERAGE_LAST];
    let mut scores: Vec<f64> = (0..n)
        .map(|t| {
            let mean = averaged.iter().map(|it| it[t]).sum::<f64>() / averaged.len() as f64;
            (mean / SQUASH_SCALE).tanh()
        })
        .collect();
    normalize_by_max(&mut scores);

    debug!("LSQ ratings computed for {n} teams over {} games", pairs.len());
    Ok(LsqOutcome {
        scores,
        trace,
        warnings,
    })
}
