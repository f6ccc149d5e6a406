// Ranking table rows, sort keys, and rank assignment.

use std::cmp::Ordering;

use ranker_core::season::TeamId;
use serde::{Deserialize, Serialize};

use crate::error::RankingWarning;
use crate::tiers::DensityCurve;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub team_id: TeamId,
    pub name: String,
    pub owner: String,
    pub division_id: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub awp: f64,
    pub streak: i32,
    pub dom: f64,
    pub lsq: f64,
    pub col: f64,
    pub sos: f64,
    pub luck: f64,
    pub cons: f64,
    pub power: f64,
    pub tier: u32,
    pub power_rank: u32,
    pub overall_rank: u32,
    /// Previous power rank minus this one; positive means the team climbed.
    pub power_delta: Option<i32>,
    pub overall_delta: Option<i32>,
}

/// Everything computed for one league-week.
#[derive(Debug, Clone, Serialize)]
pub struct WeekRankings {
    pub year: i32,
    pub week: u32,
    /// Sorted by power rank.
    pub rows: Vec<RankingRow>,
    /// Team ids in the column order of `lsq_trace`.
    pub lsq_team_ids: Vec<TeamId>,
    /// Raw LSQ ratings per iteration.
    pub lsq_trace: Vec<Vec<f64>>,
    pub tier_density: Option<DensityCurve>,
    pub warnings: Vec<RankingWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TeamId,
    PowerRank,
    OverallRank,
}

impl SortKey {
    pub fn compare(self, a: &RankingRow, b: &RankingRow) -> Ordering {
        match self {
            SortKey::TeamId => a.team_id.cmp(&b.team_id),
            SortKey::PowerRank => a.power_rank.cmp(&b.power_rank).then(a.team_id.cmp(&b.team_id)),
            SortKey::OverallRank => a
                .overall_rank
                .cmp(&b.overall_rank)
                .then(a.team_id.cmp(&b.team_id)),
        }
    }
}

pub fn sort_rows(rows: &mut [RankingRow], key: SortKey) {
    rows.sort_by(|a, b| key.compare(a, b));
}

/// Standings order: more wins, then more points for, then lower team id.
pub fn standings_order(a: &RankingRow, b: &RankingRow) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then(b.points_for.total_cmp(&a.points_for))
        .then(a.team_id.cmp(&b.team_id))
}

/// Power order: higher power, then lower team id.
pub fn power_order(a: &RankingRow, b: &RankingRow) -> Ordering {
    b.power.total_cmp(&a.power).then(a.team_id.cmp(&b.team_id))
}

/// Fill `overall_rank` and `power_rank` (1-based), leaving the rows sorted by
/// power rank.
pub fn assign_ranks(rows: &mut [RankingRow]) {
    rows.sort_by(standings_order);
    for (i, row) in rows.iter_mut().enumerate() {
        row.overall_rank = i as u32 + 1;
    }
    rows.sort_by(power_order);
    for (i, row) in rows.iter_mut().enumerate() {
        row.power_rank = i as u32 + 1;
    }
}
