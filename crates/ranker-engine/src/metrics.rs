// Derived metrics: aggregate win pct, strength of schedule, luck, consistency,
// and the streak discount.

use std::collections::BTreeMap;

use ranker_core::config::{LuckConfig, SosConfig};
use ranker_core::season::{SeasonWindow, TeamId};

use crate::record::TeamRecord;
use crate::scale::{mean, normalize_by_max};

/// Added to both win percentages in the luck ratio so a winless team with
/// a zero aggregate record stays finite.
const LUCK_PCT_OFFSET: f64 = 0.01;
const STREAK_DISCOUNT: f64 = 0.25;

// ---------------------------------------------------------------------------
// Aggregate win percentage
// ---------------------------------------------------------------------------

/// Fraction of (team, week) comparisons a team wins when its score is held
/// against every other score posted that week. Ties count as losses.
/// Aligned with `window.team_ids()`.
pub fn aggregate_win_pct(window: &SeasonWindow<'_>) -> Vec<f64> {
    let mut by_week: BTreeMap<u32, Vec<(TeamId, f64)>> = BTreeMap::new();
    for game in window.games() {
        let entries = by_week.entry(game.matchup_period).or_default();
        entries.push((game.home_team_id, game.home_points()));
        entries.push((game.away_team_id, game.away_points()));
    }

    let n = window.num_teams();
    let mut wins = vec![0u32; n];
    let mut losses = vec![0u32; n];
    for entries in by_week.values() {
        for (pos, &(team_id, score)) in entries.iter().enumerate() {
            let Some(i) = window.index_of(team_id) else {
                continue;
            };
            for (other_pos, &(_, other)) in entries.iter().enumerate() {
                if other_pos == pos {
                    continue;
                }
                if score > other {
                    wins[i] += 1;
                } else {
                    losses[i] += 1;
                }
            }
        }
    }

    wins.iter()
        .zip(&losses)
        .map(|(&w, &l)| match w + l {
            0 => 0.0,
            total => w as f64 / total as f64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Strength of schedule
// ---------------------------------------------------------------------------

/// Mean of `opponent_lsq^rank_power` over each team's games, max-normalized.
/// `lsq` must be aligned with `window.team_ids()`.
pub fn strength_of_schedule(window: &SeasonWindow<'_>, lsq: &[f64], config: &SosConfig) -> Vec<f64> {
    let mut sos: Vec<f64> = window
        .team_ids()
        .iter()
        .map(|&team_id| {
            let opponents: Vec<f64> = window
                .games_for(team_id)
                .filter_map(|g| window.index_of(g.opponent_of(team_id)))
                .map(|j| lsq[j].powf(config.rank_power))
                .collect();
            mean(&opponents)
        })
        .collect();
    normalize_by_max(&mut sos);
    sos
}

// ---------------------------------------------------------------------------
// Luck
// ---------------------------------------------------------------------------

/// Luck index, max-normalized. Higher means results ran better than the
/// team's scoring suggests.
///
/// Blends the win pct / aggregate win pct ratio with the mean ratio of each
/// opponent's average score to what that opponent scored in the game.
/// Games where the opponent scored zero or less are skipped in the second
/// ratio; a team with no usable games gets a neutral ratio of 1.
pub fn luck(
    window: &SeasonWindow<'_>,
    records: &[TeamRecord],
    awp: &[f64],
    config: &LuckConfig,
) -> Vec<f64> {
    let mut luck: Vec<f64> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let ratio_a = (LUCK_PCT_OFFSET + record.win_pct()) / (LUCK_PCT_OFFSET + awp[i]);

            let opp_ratios: Vec<f64> = window
                .games_for(record.team_id)
                .filter_map(|g| {
                    let opponent = g.opponent_of(record.team_id);
                    let scored = g.score_of(opponent);
                    if scored <= 0.0 {
                        return None;
                    }
                    let j = window.index_of(opponent)?;
                    Some(records[j].mean_score() / scored)
                })
                .collect();
            let ratio_b = if opp_ratios.is_empty() {
                1.0
            } else {
                mean(&opp_ratios)
            };

            1.0 / (config.awp_weight * ratio_a + (1.0 - config.awp_weight) * ratio_b)
        })
        .collect();
    normalize_by_max(&mut luck);
    luck
}

// ---------------------------------------------------------------------------
// Consistency and streak
// ---------------------------------------------------------------------------

/// `min + max + mean` of weekly scores, max-normalized.
pub fn consistency(records: &[TeamRecord]) -> Vec<f64> {
    let mut cons: Vec<f64> = records
        .iter()
        .map(|r| {
            if r.weekly_scores.is_empty() {
                return 0.0;
            }
            let min = r.weekly_scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = r.weekly_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            min + max + r.mean_score()
        })
        .collect();
    normalize_by_max(&mut cons);
    cons
}

/// Streak contribution to the power blend: a quarter point per game once a
/// streak is longer than one game, in either direction.
pub fn streak_discount(streak: i32) -> f64 {
    if streak.abs() > 1 {
        STREAK_DISCOUNT * streak as f64
    } else {
        0.0
    }
}
