// Library root: season data model, loaders, configuration, and rank history
// storage shared by the ranking engine and the CLI.

pub mod config;
pub mod db;
pub mod loader;
pub mod season;

pub use season::{DataError, Division, Game, LeagueSettings, Season, SeasonWindow, Team, TeamId, Winner};
