// Season dataset: teams, games, league settings, and the as-of-week window.
//
// Games reference teams by id only. Teams live in an arena sorted by id and
// every opponent lookup goes through the id -> index map.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TeamId = u32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Bad upstream input. Raised before any ranking computation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("season has no teams")]
    NoTeams,

    #[error("season schedule is empty")]
    EmptySchedule,

    #[error("duplicate team id {team_id}")]
    DuplicateTeam { team_id: TeamId },

    #[error("game in week {matchup_period} references unknown team {team_id}")]
    UnknownTeam {
        team_id: TeamId,
        matchup_period: u32,
    },

    #[error("team {team_id} plays itself in week {matchup_period}")]
    SelfMatchup {
        team_id: TeamId,
        matchup_period: u32,
    },

    #[error("decided game in week {matchup_period} ({home} vs {away}) is missing a score")]
    MissingScore {
        matchup_period: u32,
        home: TeamId,
        away: TeamId,
    },

    #[error(
        "game in week {matchup_period} ({home} vs {away}) is marked {winner:?} \
         but scored {home_score}-{away_score}"
    )]
    WinnerMismatch {
        matchup_period: u32,
        home: TeamId,
        away: TeamId,
        winner: Winner,
        home_score: f64,
        away_score: f64,
    },

    #[error("week must be at least 1, got {week}")]
    InvalidWeek { week: u32 },

    #[error("week {week} is beyond the last scheduled week {last_week}")]
    WeekBeyondSchedule { week: u32, last_week: u32 },

    #[error("no completed games through week {week}")]
    NoCompletedGames { week: u32 },
}

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Outcome of a scheduled matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Winner {
    Home,
    Away,
    Undecided,
}

impl Winner {
    pub fn is_decided(self) -> bool {
        self != Winner::Undecided
    }

    /// Parse the ESPN spelling (`HOME`, `AWAY`, `UNDECIDED`), case-insensitive.
    pub fn from_str_winner(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOME" => Some(Winner::Home),
            "AWAY" => Some(Winner::Away),
            "UNDECIDED" | "" => Some(Winner::Undecided),
            _ => None,
        }
    }
}

/// One scheduled matchup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub matchup_period: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub home_score: Option<f64>,
    #[serde(default)]
    pub away_score: Option<f64>,
    pub winner: Winner,
}

impl Game {
    pub fn is_decided(&self) -> bool {
        self.winner.is_decided()
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// The winning team's id, if the game is decided.
    pub fn winner_id(&self) -> Option<TeamId> {
        match self.winner {
            Winner::Home => Some(self.home_team_id),
            Winner::Away => Some(self.away_team_id),
            Winner::Undecided => None,
        }
    }

    /// The losing team's id, if the game is decided.
    pub fn loser_id(&self) -> Option<TeamId> {
        match self.winner {
            Winner::Home => Some(self.away_team_id),
            Winner::Away => Some(self.home_team_id),
            Winner::Undecided => None,
        }
    }

    /// Opponent of `team_id` in this game. Caller must ensure the team played.
    pub fn opponent_of(&self, team_id: TeamId) -> TeamId {
        if self.home_team_id == team_id {
            self.away_team_id
        } else {
            self.home_team_id
        }
    }

    /// Score posted by `team_id` (0.0 if unplayed).
    pub fn score_of(&self, team_id: TeamId) -> f64 {
        let score = if self.home_team_id == team_id {
            self.home_score
        } else {
            self.away_score
        };
        score.unwrap_or(0.0)
    }

    pub fn home_points(&self) -> f64 {
        self.home_score.unwrap_or(0.0)
    }

    pub fn away_points(&self) -> f64 {
        self.away_score.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub abbrev: Option<String>,
    #[serde(default)]
    pub division_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: u32,
    pub name: String,
}

/// League-level settings that the playoff simulator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub name: String,
    pub year: i32,
    /// Number of regular-season matchup periods.
    pub regular_season_weeks: u32,
    pub playoff_team_count: usize,
    #[serde(default)]
    pub divisions: Vec<Division>,
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

/// A validated season. Teams are kept sorted by id.
#[derive(Debug, Clone)]
pub struct Season {
    settings: LeagueSettings,
    teams: Vec<Team>,
    games: Vec<Game>,
    index: HashMap<TeamId, usize>,
}

impl Season {
    /// Validate and assemble a season.
    ///
    /// Fails on an empty team set or schedule, duplicate team ids, games that
    /// reference unknown teams, decided games without both scores, and
    /// winners that contradict the scores.
    pub fn new(
        settings: LeagueSettings,
        mut teams: Vec<Team>,
        mut games: Vec<Game>,
    ) -> Result<Self, DataError> {
        if teams.is_empty() {
            return Err(DataError::NoTeams);
        }
        if games.is_empty() {
            return Err(DataError::EmptySchedule);
        }

        teams.sort_by_key(|t| t.id);
        let mut index = HashMap::with_capacity(teams.len());
        for (i, team) in teams.iter().enumerate() {
            if index.insert(team.id, i).is_some() {
                return Err(DataError::DuplicateTeam { team_id: team.id });
            }
        }

        for game in &games {
            for id in [game.home_team_id, game.away_team_id] {
                if !index.contains_key(&id) {
                    return Err(DataError::UnknownTeam {
                        team_id: id,
                        matchup_period: game.matchup_period,
                    });
                }
            }
            if game.home_team_id == game.away_team_id {
                return Err(DataError::SelfMatchup {
                    team_id: game.home_team_id,
                    matchup_period: game.matchup_period,
                });
            }
            if game.is_decided() && (game.home_score.is_none() || game.away_score.is_none()) {
                return Err(DataError::MissingScore {
                    matchup_period: game.matchup_period,
                    home: game.home_team_id,
                    away: game.away_team_id,
                });
            }
            if let (Some(home_score), Some(away_score)) = (game.home_score, game.away_score) {
                // Equal scores may still carry a decided tiebreak.
                let contradicts = match game.winner {
                    Winner::Home => home_score < away_score,
                    Winner::Away => away_score < home_score,
                    Winner::Undecided => false,
                };
                if contradicts {
                    return Err(DataError::WinnerMismatch {
                        matchup_period: game.matchup_period,
                        home: game.home_team_id,
                        away: game.away_team_id,
                        winner: game.winner,
                        home_score,
                        away_score,
                    });
                }
            }
        }

        // Stable sort keeps the provider's order within a week.
        games.sort_by_key(|g| g.matchup_period);

        Ok(Self {
            settings,
            teams,
            games,
            index,
        })
    }

    pub fn settings(&self) -> &LeagueSettings {
        &self.settings
    }

    pub fn year(&self) -> i32 {
        self.settings.year
    }

    /// All teams, sorted by id.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.index.get(&id).map(|&i| &self.teams[i])
    }

    /// Largest matchup period with at least one decided game.
    pub fn last_completed_week(&self) -> Option<u32> {
        self.games
            .iter()
            .filter(|g| g.is_decided())
            .map(|g| g.matchup_period)
            .max()
    }

    /// Build the as-of-week view used by every ranking method.
    pub fn window(&self, week: u32) -> Result<SeasonWindow<'_>, DataError> {
        SeasonWindow::new(self, week)
    }

    /// Copy of this season with every game after `week` dropped.
    pub fn truncated(&self, week: u32) -> Result<Season, DataError> {
        let games = self
            .games
            .iter()
            .filter(|g| g.matchup_period <= week)
            .cloned()
            .collect();
        Season::new(self.settings.clone(), self.teams.clone(), games)
    }
}

// ---------------------------------------------------------------------------
// As-of-week window
// ---------------------------------------------------------------------------

/// Decided games with `matchup_period <= week`, plus the dense index of the
/// teams that played at least one of them.
#[derive(Debug, Clone)]
pub struct SeasonWindow<'a> {
    season: &'a Season,
    week: u32,
    games: Vec<&'a Game>,
    team_ids: Vec<TeamId>,
    index: HashMap<TeamId, usize>,
}

impl<'a> SeasonWindow<'a> {
    fn new(season: &'a Season, week: u32) -> Result<Self, DataError> {
        if week == 0 {
            return Err(DataError::InvalidWeek { week });
        }
        let last_week = season.games.last().map_or(0, |g| g.matchup_period);
        if week > last_week {
            return Err(DataError::WeekBeyondSchedule { week, last_week });
        }

        let games: Vec<&Game> = season
            .games
            .iter()
            .filter(|g| g.matchup_period <= week && g.is_decided())
            .collect();
        if games.is_empty() {
            return Err(DataError::NoCompletedGames { week });
        }

        let played: BTreeSet<TeamId> = games
            .iter()
            .flat_map(|g| [g.home_team_id, g.away_team_id])
            .collect();
        let team_ids: Vec<TeamId> = played.into_iter().collect();
        let index = team_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        Ok(Self {
            season,
            week,
            games,
            team_ids,
            index,
        })
    }

    pub fn season(&self) -> &'a Season {
        self.season
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Decided games in the window, in week order.
    pub fn games(&self) -> &[&'a Game] {
        &self.games
    }

    /// Ids of teams with at least one game in the window, ascending.
    pub fn team_ids(&self) -> &[TeamId] {
        &self.team_ids
    }

    pub fn num_teams(&self) -> usize {
        self.team_ids.len()
    }

    /// Dense index of a team in `team_ids()`.
    pub fn index_of(&self, team_id: TeamId) -> Option<usize> {
        self.index.get(&team_id).copied()
    }

    /// Games in the window involving `team_id`, in week order.
    pub fn games_for(&self, team_id: TeamId) -> impl Iterator<Item = &'a Game> + '_ {
        self.games
            .iter()
            .copied()
            .filter(move |g| g.involves(team_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LeagueSettings {
        LeagueSettings {
            name: "Test League".into(),
            year: 2023,
            regular_season_weeks: 4,
            playoff_team_count: 2,
            divisions: vec![],
        }
    }

    fn team(id: TeamId) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            owner: format!("Owner {id}"),
            abbrev: None,
            division_id: 0,
        }
    }

    fn played(week: u32, home: TeamId, away: TeamId, hs: f64, aws: f64) -> Game {
        Game {
            matchup_period: week,
            home_team_id: home,
            away_team_id: away,
            home_score: Some(hs),
            away_score: Some(aws),
            winner: if hs > aws { Winner::Home } else { Winner::Away },
        }
    }

    fn unplayed(week: u32, home: TeamId, away: TeamId) -> Game {
        Game {
            matchup_period: week,
            home_team_id: home,
            away_team_id: away,
            home_score: None,
            away_score: None,
            winner: Winner::Undecided,
        }
    }

    #[test]
    fn rejects_unknown_team() {
        let err = Season::new(
            settings(),
            vec![team(1), team(2)],
            vec![played(1, 1, 3, 100.0, 90.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataError::UnknownTeam {
                team_id: 3,
                matchup_period: 1
            }
        );
    }

    #[test]
    fn rejects_duplicate_team() {
        let err = Season::new(
            settings(),
            vec![team(1), team(1)],
            vec![played(1, 1, 2, 100.0, 90.0)],
        )
        .unwrap_err();
        assert_eq!(err, DataError::DuplicateTeam { team_id: 1 });
    }

    #[test]
    fn rejects_empty_schedule() {
        let err = Season::new(settings(), vec![team(1), team(2)], vec![]).unwrap_err();
        assert_eq!(err, DataError::EmptySchedule);
    }

    #[test]
    fn rejects_decided_game_without_score() {
        let mut game = played(1, 1, 2, 100.0, 90.0);
        game.away_score = None;
        let err = Season::new(settings(), vec![team(1), team(2)], vec![game]).unwrap_err();
        assert!(matches!(err, DataError::MissingScore { .. }));
    }

    #[test]
    fn rejects_winner_contradicting_scores() {
        let mut game = played(2, 1, 2, 100.0, 90.0);
        game.winner = Winner::Away;
        let err = Season::new(settings(), vec![team(1), team(2)], vec![game]).unwrap_err();
        match err {
            DataError::WinnerMismatch {
                matchup_period,
                winner,
                ..
            } => {
                assert_eq!(matchup_period, 2);
                assert_eq!(winner, Winner::Away);
            }
            other => panic!("expected WinnerMismatch, got {other:?}"),
        }

        // A tie on points with a decided winner is a tiebreak, not an error.
        let mut tied = played(1, 1, 2, 95.0, 95.0);
        tied.winner = Winner::Home;
        assert!(Season::new(settings(), vec![team(1), team(2)], vec![tied]).is_ok());
    }

    #[test]
    fn window_excludes_future_and_undecided_games() {
        let season = Season::new(
            settings(),
            vec![team(1), team(2), team(3), team(4)],
            vec![
                played(1, 1, 2, 100.0, 90.0),
                played(2, 1, 3, 110.0, 95.0),
                unplayed(2, 2, 4),
                played(3, 4, 1, 80.0, 120.0),
            ],
        )
        .unwrap();

        let window = season.window(2).unwrap();
        assert_eq!(window.games().len(), 2);
        assert_eq!(window.team_ids(), &[1, 2, 3]);
        assert_eq!(window.index_of(4), None);
        assert_eq!(window.games_for(1).count(), 2);
    }

    #[test]
    fn window_without_completed_games_is_an_error() {
        let season = Season::new(
            settings(),
            vec![team(1), team(2)],
            vec![unplayed(1, 1, 2)],
        )
        .unwrap();
        assert_eq!(
            season.window(1).unwrap_err(),
            DataError::NoCompletedGames { week: 1 }
        );
        assert_eq!(
            season.window(0).unwrap_err(),
            DataError::InvalidWeek { week: 0 }
        );
        assert_eq!(
            season.window(2).unwrap_err(),
            DataError::WeekBeyondSchedule {
                week: 2,
                last_week: 1
            }
        );
    }

    #[test]
    fn last_completed_week_ignores_undecided() {
        let season = Season::new(
            settings(),
            vec![team(1), team(2)],
            vec![played(1, 1, 2, 1.0, 2.0), played(2, 2, 1, 3.0, 1.0), unplayed(3, 1, 2)],
        )
        .unwrap();
        assert_eq!(season.last_completed_week(), Some(2));
    }

    #[test]
    fn winner_parses_espn_strings() {
        assert_eq!(Winner::from_str_winner("HOME"), Some(Winner::Home));
        assert_eq!(Winner::from_str_winner("away"), Some(Winner::Away));
        assert_eq!(Winner::from_str_winner(""), Some(Winner::Undecided));
        assert_eq!(Winner::from_str_winner("TIE"), None);
        let json = serde_json::to_string(&Winner::Undecided).unwrap();
        assert_eq!(json, "\"UNDECIDED\"");
    }
}
