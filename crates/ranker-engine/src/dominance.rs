// Two-step dominance: direct wins plus wins over teams you beat.

use nalgebra::DMatrix;
use ranker_core::config::DominanceConfig;
use ranker_core::season::SeasonWindow;
use tracing::debug;

use crate::error::RankingError;
use crate::scale::normalize_by_mean;

/// Weighted wins matrix over the window's teams: `M[i][j]` sums, for every
/// win of team i over team j, `(1 - d) + d * week / W`.
pub fn wins_matrix(window: &SeasonWindow<'_>, decay_penalty: f64) -> DMatrix<f64> {
    let n = window.num_teams();
    let current = window.week() as f64;
    let mut m = DMatrix::zeros(n, n);

    for game in window.games() {
        let (Some(winner), Some(loser)) = (game.winner_id(), game.loser_id()) else {
            continue;
        };
        let (Some(i), Some(j)) = (window.index_of(winner), window.index_of(loser)) else {
            continue;
        };
        m[(i, j)] += (1.0 - decay_penalty) + decay_penalty * game.matchup_period as f64 / current;
    }
    m
}

/// Dominance score per team, aligned with `window.team_ids()` and
/// normalized so the league mean is 1.0.
pub fn dominance(window: &SeasonWindow<'_>, config: &DominanceConfig) -> Result<Vec<f64>, RankingError> {
    let m = wins_matrix(window, config.decay_penalty);
    let two_step = &m * (1.0 - config.sq_weight) + (&m * &m) * config.sq_weight;

    let mut scores: Vec<f64> = two_step.row_iter().map(|row| row.sum()).collect();
    if normalize_by_mean(&mut scores).is_none() {
        return Err(RankingError::DegenerateDominance {
            week: window.week(),
        });
    }

    debug!("dominance computed for {} teams through week {}", scores.len(), window.week());
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranker_core::season::{Game, LeagueSettings, Season, Team, Winner};

    fn season(games: Vec<Game>) -> Season {
        let teams = (1..=3)
            .map(|id| Team {
                id,
                name: format!("T{id}"),
                owner: String::new(),
                abbrev: None,
                division_id: 0,
            })
            .collect();
        let settings = LeagueSettings {
            name: "L".into(),
            year: 2023,
            regular_season_weeks: 4,
            playoff_team_count: 2,
            divisions: vec![],
        };
        Season::new(settings, teams, games).unwrap()
    }

    fn win(week: u32, winner: u32, loser: u32) -> Game {
        Game {
            matchup_period: week,
            home_team_id: winner,
            away_team_id: loser,
            home_score: Some(100.0),
            away_score: Some(80.0),
            winner: Winner::Home,
        }
    }

    #[test]
    fn recent_wins_weigh_more() {
        let s = season(vec![win(1, 1, 2), win(2, 2, 3)]);
        let w = s.window(2).unwrap();
        let m = wins_matrix(&w, 0.5);
        // Week 1 of 2: 0.5 + 0.5 * 0.5; week 2 of 2: full weight.
        assert!((m[(0, 1)] - 0.75).abs() < 1e-12);
        assert!((m[(1, 2)] - 1.0).abs() < 1e-12);
        assert_eq!(m[(1, 0)], 0.0);
    }

    #[test]
    fn transitive_wins_add_second_step() {
        let s = season(vec![win(1, 1, 2), win(1, 2, 3)]);
        let w = s.window(1).unwrap();
        let scores = dominance(&w, &DominanceConfig::default()).unwrap();
        // Team 1 beat team 2, who beat team 3: 0.75 + 0.25 over the mean.
        assert!(scores[0] > scores[1]);
        assert_eq!(scores[2], 0.0);
        let mean = scores.iter().sum::<f64>() / 3.0;
        assert!((mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_decay_counts_every_win_as_one() {
        let s = season(vec![win(1, 1, 2), win(3, 1, 3)]);
        let w = s.window(3).unwrap();
        let m = wins_matrix(&w, 0.0);
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(0, 2)], 1.0);
    }
}
