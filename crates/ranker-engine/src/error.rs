// Engine error and warning types.

use ranker_core::season::{DataError, TeamId};
use serde::Serialize;
use thiserror::Error;

/// Failures that stop a ranking computation.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("dominance is undefined for week {week}: no team has a weighted win")]
    DegenerateDominance { week: u32 },

    #[error("Colley system over {teams} teams is singular")]
    SingularColley { teams: usize },

    #[error("rank history error: {0:#}")]
    History(anyhow::Error),
}

/// Conditions that degrade a result without invalidating it. They travel with
/// the computed rankings and are also logged where they arise.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankingWarning {
    #[error(
        "least-squares solver hit its sweep limit in {failed_iterations} iteration(s), \
         first at iteration {first_iteration} (last step {last_step:e})"
    )]
    SolverNotConverged {
        first_iteration: usize,
        failed_iterations: usize,
        last_step: f64,
    },

    #[error(
        "week {previous_week} history has {stored} team(s) but week {week} ranks {current}; \
         deltas skipped"
    )]
    HistoryMismatch {
        week: u32,
        previous_week: u32,
        stored: usize,
        current: usize,
        missing: Vec<TeamId>,
    },

    #[error("ranking knob `{field}` not set or out of range, using default")]
    ConfigDefaulted { field: String },
}
