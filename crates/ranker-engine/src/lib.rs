// Ranking engine: the statistical ranking methods, their blend into a power
// score, tiers, week-over-week deltas, and playoff odds.

pub mod colley;
pub mod dominance;
pub mod error;
pub mod history;
pub mod lsq;
pub mod metrics;
pub mod pipeline;
pub mod playoff;
pub mod power;
pub mod record;
pub mod scale;
pub mod table;
pub mod tiers;

pub use error::{RankingError, RankingWarning};
pub use pipeline::compute_week;
pub use table::{RankingRow, SortKey, WeekRankings};
