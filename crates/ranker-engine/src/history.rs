// Week-over-week rank deltas against stored history.

use std::collections::{BTreeSet, HashMap};

use ranker_core::db::{HistoryRecord, HistoryStore};
use ranker_core::season::TeamId;
use tracing::info;

use crate::error::{RankingError, RankingWarning};
use crate::table::WeekRankings;

/// Rows to store for this week.
pub fn history_records(rankings: &WeekRankings) -> Vec<HistoryRecord> {
    rankings
        .rows
        .iter()
        .map(|r| HistoryRecord {
            week: rankings.week,
            team_id: r.team_id,
            overall_rank: r.overall_rank,
            power_rank: r.power_rank,
            tier: r.tier,
            power: r.power,
        })
        .collect()
}

/// Attach deltas from the previous week's stored ranks.
///
/// With no previous rows the table comes back unchanged. When the stored
/// team set differs from this week's, deltas are skipped and a
/// `HistoryMismatch` warning is added for the caller to report.
pub fn with_deltas(mut rankings: WeekRankings, previous: &[HistoryRecord]) -> WeekRankings {
    if previous.is_empty() {
        return rankings;
    }

    let prev_week = rankings.week.saturating_sub(1);
    let stored: HashMap<TeamId, &HistoryRecord> = previous.iter().map(|r| (r.team_id, r)).collect();
    let current: BTreeSet<TeamId> = rankings.rows.iter().map(|r| r.team_id).collect();
    let stored_ids: BTreeSet<TeamId> = stored.keys().copied().collect();

    if previous.len() != rankings.rows.len() || stored_ids != current {
        let missing: Vec<TeamId> = current.symmetric_difference(&stored_ids).copied().collect();
        let warning = RankingWarning::HistoryMismatch {
            week: rankings.week,
            previous_week: prev_week,
            stored: previous.len(),
            current: rankings.rows.len(),
            missing,
        };
        rankings.warnings.push(warning);
        return rankings;
    }

    for row in &mut rankings.rows {
        if let Some(old) = stored.get(&row.team_id) {
            row.power_delta = Some(old.power_rank as i32 - row.power_rank as i32);
            row.overall_delta = Some(old.overall_rank as i32 - row.overall_rank as i32);
        }
    }
    rankings
}

/// Load last week's ranks from `store`, attach deltas, and record this week.
pub fn apply_history(rankings: WeekRankings, store: &HistoryStore) -> Result<WeekRankings, RankingError> {
    let previous = match rankings.week.checked_sub(1) {
        Some(prev) if prev > 0 => store.load_week(prev).map_err(RankingError::History)?,
        _ => Vec::new(),
    };
    if previous.is_empty() {
        info!("no stored ranks before week {}, skipping deltas", rankings.week);
    }

    let rankings = with_deltas(rankings, &previous);
    store
        .record_week(rankings.week, &history_records(&rankings))
        .map_err(RankingError::History)?;
    Ok(rankings)
}
