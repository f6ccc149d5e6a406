// Per-team season record through the window week.

use ranker_core::season::{SeasonWindow, TeamId};
use serde::Serialize;

use crate::scale::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
    /// Points scored each game, in week order.
    pub weekly_scores: Vec<f64>,
    /// Current run of identical results: +n for n straight wins, -n for losses.
    pub streak: i32,
}

impl TeamRecord {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        match self.games_played() {
            0 => 0.0,
            n => self.wins as f64 / n as f64,
        }
    }

    pub fn mean_score(&self) -> f64 {
        mean(&self.weekly_scores)
    }
}

/// Records for every team in the window, aligned with `window.team_ids()`.
pub fn team_records(window: &SeasonWindow<'_>) -> Vec<TeamRecord> {
    window
        .team_ids()
        .iter()
        .map(|&team_id| {
            let mut record = TeamRecord {
                team_id,
                wins: 0,
                losses: 0,
                points_for: 0.0,
                points_against: 0.0,
                weekly_scores: Vec::new(),
                streak: 0,
            };
            for game in window.games_for(team_id) {
                let scored = game.score_of(team_id);
                let allowed = game.score_of(game.opponent_of(team_id));
                record.points_for += scored;
                record.points_against += allowed;
                record.weekly_scores.push(scored);

                let won = game.winner_id() == Some(team_id);
                if won {
                    record.wins += 1;
                } else {
                    record.losses += 1;
                }
                record.streak = match (won, record.streak) {
                    (true, s) if s > 0 => s + 1,
                    (true, _) => 1,
                    (false, s) if s < 0 => s - 1,
                    (false, _) => -1,
                };
            }
            record
        })
        .collect()
}
