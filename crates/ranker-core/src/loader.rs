// Season data loading.
//
// Two input shapes are supported: a single JSON document carrying settings,
// teams, and games, or a pair of CSV files (teams and games) with league
// settings taken from league.toml.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Config, DataPaths, LeagueConfig};
use crate::season::{DataError, Game, LeagueSettings, Season, Team, TeamId, Winner};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid season data: {0}")]
    Data(#[from] DataError),

    #[error("no season source configured")]
    NoSource,
}

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SeasonFile {
    settings: LeagueSettings,
    teams: Vec<Team>,
    games: Vec<Game>,
}

#[derive(Debug, Deserialize)]
struct RawGameRow {
    matchup_period: u32,
    home_team_id: TeamId,
    away_team_id: TeamId,
    home_score: Option<f64>,
    away_score: Option<f64>,
    #[serde(default)]
    winner: String,
}

#[derive(Debug, Deserialize)]
struct RawTeamRow {
    id: TeamId,
    name: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    abbrev: Option<String>,
    #[serde(default)]
    division_id: Option<u32>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private)
// ---------------------------------------------------------------------------

fn games_from_reader<R: Read>(rdr: R) -> Result<Vec<Game>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut games = Vec::new();
    for result in reader.deserialize::<RawGameRow>() {
        match result {
            Ok(raw) => {
                let Some(winner) = Winner::from_str_winner(&raw.winner) else {
                    warn!(
                        "skipping week {} game {} vs {}: unknown winner '{}'",
                        raw.matchup_period, raw.home_team_id, raw.away_team_id, raw.winner
                    );
                    continue;
                };
                let scores_finite = [raw.home_score, raw.away_score]
                    .iter()
                    .flatten()
                    .all(|s| s.is_finite());
                if !scores_finite {
                    warn!(
                        "skipping week {} game {} vs {}: non-finite score",
                        raw.matchup_period, raw.home_team_id, raw.away_team_id
                    );
                    continue;
                }
                games.push(Game {
                    matchup_period: raw.matchup_period,
                    home_team_id: raw.home_team_id,
                    away_team_id: raw.away_team_id,
                    home_score: raw.home_score,
                    away_score: raw.away_score,
                    winner,
                });
            }
            Err(e) => {
                warn!("skipping malformed game row: {}", e);
            }
        }
    }
    Ok(games)
}

fn teams_from_reader<R: Read>(rdr: R) -> Result<Vec<Team>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut teams = Vec::new();
    for result in reader.deserialize::<RawTeamRow>() {
        match result {
            Ok(raw) => teams.push(Team {
                id: raw.id,
                name: raw.name.trim().to_string(),
                owner: raw.owner.trim().to_string(),
                abbrev: raw
                    .abbrev
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty()),
                division_id: raw.division_id.unwrap_or(0),
            }),
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(teams)
}

fn season_from_json_reader<R: Read>(rdr: R) -> Result<SeasonFile, serde_json::Error> {
    serde_json::from_reader(rdr)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::io::BufReader<std::fs::File>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(std::io::BufReader::new(file))
}

/// Load a season from a JSON document with `settings`, `teams`, and `games`.
pub fn load_season_json(path: &Path) -> Result<Season, LoadError> {
    let file = season_from_json_reader(open(path)?).map_err(|e| LoadError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    let season = Season::new(file.settings, file.teams, file.games)?;
    info!(
        "loaded season {} from {}: {} teams, {} games",
        season.year(),
        path.display(),
        season.teams().len(),
        season.games().len()
    );
    Ok(season)
}

/// Load a season from teams and games CSV files.
pub fn load_season_csv(
    teams_path: &Path,
    games_path: &Path,
    settings: LeagueSettings,
) -> Result<Season, LoadError> {
    let teams = teams_from_reader(open(teams_path)?).map_err(|e| LoadError::Csv {
        path: teams_path.display().to_string(),
        source: e,
    })?;
    let games = games_from_reader(open(games_path)?).map_err(|e| LoadError::Csv {
        path: games_path.display().to_string(),
        source: e,
    })?;
    let season = Season::new(settings, teams, games)?;
    info!(
        "loaded season {} from CSV: {} teams, {} games",
        season.year(),
        season.teams().len(),
        season.games().len()
    );
    Ok(season)
}

/// League settings described by league.toml.
pub fn settings_from_league(league: &LeagueConfig) -> LeagueSettings {
    LeagueSettings {
        name: league.name.clone(),
        year: league.year,
        regular_season_weeks: league.regular_season_weeks,
        playoff_team_count: league.playoff_team_count,
        divisions: league.divisions.clone(),
    }
}

/// Load the configured season.
pub fn load_season(config: &Config) -> Result<Season, LoadError> {
    load_season_from_paths(&config.paths, &config.league)
}

/// Load a season from explicit paths. A JSON season file wins over CSV files
/// when both are configured.
pub fn load_season_from_paths(paths: &DataPaths, league: &LeagueConfig) -> Result<Season, LoadError> {
    let season = match (&paths.season, &paths.teams, &paths.games) {
        (Some(season), _, _) => load_season_json(Path::new(season))?,
        (None, Some(teams), Some(games)) => {
            load_season_csv(Path::new(teams), Path::new(games), settings_from_league(league))?
        }
        _ => return Err(LoadError::NoSource),
    };

    if season.year() != league.year {
        warn!(
            "season file is for {} but league.toml says {}; using the file's year",
            season.year(),
            league.year
        );
    }
    Ok(season)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
