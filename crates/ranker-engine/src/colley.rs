// Colley matrix ratings.
//
// C[i][i] = 2 + games_i, C[i][j] = -games between i and j,
// b[i] = 1 + (wins_i - losses_i) / 2. The system is assembled over the whole
// team arena; teams with no games in the window leave all-zero rows and
// columns, which are dropped before solving.

use nalgebra::{DMatrix, DVector};
use ranker_core::season::SeasonWindow;
use tracing::debug;

use crate::error::RankingError;
use crate::scale::normalize_by_max;

/// Colley system over every team in the season, in arena (team id) order.
#[derive(Debug, Clone)]
pub struct ColleySystem {
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// Arena positions of teams with at least one game.
    pub active: Vec<usize>,
}

pub fn colley_system(window: &SeasonWindow<'_>) -> ColleySystem {
    let season = window.season();
    let teams = season.teams();
    let n = teams.len();
    let arena_index = |id| teams.binary_search_by_key(&id, |t| t.id).ok();

    let mut matrix = DMatrix::zeros(n, n);
    let mut games = vec![0.0; n];
    let mut net_wins = vec![0.0; n];

    for game in window.games() {
        let (Some(h), Some(a)) = (arena_index(game.home_team_id), arena_index(game.away_team_id))
        else {
            continue;
        };
        matrix[(h, a)] -= 1.0;
        matrix[(a, h)] -= 1.0;
        games[h] += 1.0;
        games[a] += 1.0;
        if let (Some(w), Some(l)) = (game.winner_id(), game.loser_id()) {
            if let (Some(w), Some(l)) = (arena_index(w), arena_index(l)) {
                net_wins[w] += 1.0;
                net_wins[l] -= 1.0;
            }
        }
    }

    let mut active = Vec::new();
    for i in 0..n {
        if games[i] > 0.0 {
            matrix[(i, i)] = 2.0 + games[i];
            active.push(i);
        }
    }
    let rhs = DVector::from_iterator(n, net_wins.iter().map(|nw| 1.0 + 0.5 * nw));

    ColleySystem {
        matrix,
        rhs,
        active,
    }
}

/// Colley rating per team, aligned with `window.team_ids()` and
/// max-normalized.
pub fn colley(window: &SeasonWindow<'_>) -> Result<Vec<f64>, RankingError> {
    let system = colley_system(window);
    let k = system.active.len();

    let matrix = system
        .matrix
        .select_rows(&system.active)
        .select_columns(&system.active);
    let rhs = system.rhs.select_rows(&system.active);

    let solution = matrix
        .lu()
        .solve(&rhs)
        .filter(|x| x.iter().all(|v| v.is_finite()))
        .ok_or(RankingError::SingularColley { teams: k })?;

    let mut ratings: Vec<f64> = solution.iter().copied().collect();
    normalize_by_max(&mut ratings);

    debug!("Colley ratings solved for {k} teams through week {}", window.week());
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranker_core::season::{Game, LeagueSettings, Season, Team, Winner};

    fn season(ids: &[u32], games: Vec<Game>) -> Season {
        let teams = ids
            .iter()
            .map(|&id| Team {
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
            regular_season_weeks: 3,
            playoff_team_count: 2,
            divisions: vec![],
        };
        Season::new(settings, teams, games).unwrap()
    }

    fn game(week: u32, home: u32, away: u32, winner: Winner) -> Game {
        let (home_score, away_score) = match winner {
            Winner::Away => (90.0, 100.0),
            _ => (100.0, 90.0),
        };
        Game {
            matchup_period: week,
            home_team_id: home,
            away_team_id: away,
            home_score: Some(home_score),
            away_score: Some(away_score),
            winner,
        }
    }

    #[test]
    fn matrix_is_symmetric_with_expected_diagonal() {
        let s = season(
            &[1, 2, 3],
            vec![
                game(1, 1, 2, Winner::Home),
                game(2, 3, 1, Winner::Away),
                game(3, 2, 3, Winner::Home),
                game(3, 1, 2, Winner::Away),
            ],
        );
        let w = s.window(3).unwrap();
        let sys = colley_system(&w);
        let m = &sys.matrix;
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(m[(i, j)], m[(j, i)]);
            }
        }
        assert_eq!(m[(0, 0)], 5.0);
        assert_eq!(m[(0, 1)], -2.0);
        // Team 1: 2 wins, 1 loss.
        assert_eq!(sys.rhs[0], 1.5);
    }

    #[test]
    fn teams_without_games_are_dropped() {
        let s = season(&[1, 2, 5], vec![game(1, 1, 2, Winner::Home)]);
        let w = s.window(1).unwrap();
        let sys = colley_system(&w);
        assert_eq!(sys.active, vec![0, 1]);

        let ratings = colley(&w).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0], 1.0);
        assert!(ratings[1] < 1.0);
    }

    #[test]
    fn two_team_ratings_match_closed_form() {
        // One game: C = [[3,-1],[-1,3]], b = [1.5, 0.5] -> r = [5/8, 3/8].
        let s = season(&[1, 2], vec![game(1, 1, 2, Winner::Home)]);
        let w = s.window(1).unwrap();
        let ratings = colley(&w).unwrap();
        assert!((ratings[1] - 0.6).abs() < 1e-12);
    }
}
