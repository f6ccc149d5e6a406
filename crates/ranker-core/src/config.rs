// Configuration loading (league.toml, ranking.toml).
//
// league.toml is required and identifies the league-year and its data files.
// ranking.toml holds the numeric knobs of every ranking method; any knob that
// is missing, mistyped, or out of range falls back to its documented default and is
// recorded in `RankingConfig::defaulted`.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::season::Division;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub paths: DataPaths,
    pub ranking: RankingConfig,
}

// ---------------------------------------------------------------------------
// league.toml
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub year: i32,
    /// Week to rank. When omitted, the last week with a decided game is used.
    #[serde(default)]
    pub week: Option<u32>,
    /// Used when the season comes from CSV files; a season JSON file carries
    /// its own settings.
    #[serde(default = "default_regular_season_weeks")]
    pub regular_season_weeks: u32,
    #[serde(default = "default_playoff_team_count")]
    pub playoff_team_count: usize,
    #[serde(default)]
    pub divisions: Vec<Division>,
}

fn default_regular_season_weeks() -> u32 {
    13
}

fn default_playoff_team_count() -> usize {
    4
}

/// Where season data comes from and where results go.
///
/// Either `season` (a JSON file with settings, teams, and games) or both
/// `teams` and `games` (CSV files) must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub teams: Option<String>,
    #[serde(default)]
    pub games: Option<String>,
    pub history_dir: String,
    pub output_dir: String,
}

// ---------------------------------------------------------------------------
// ranking.toml: public resolved config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominanceConfig {
    /// Weight of the squared (transitive) wins matrix.
    pub sq_weight: f64,
    /// How strongly recent wins are favoured over early-season wins.
    pub decay_penalty: f64,
}

impl Default for DominanceConfig {
    fn default() -> Self {
        Self {
            sq_weight: 0.25,
            decay_penalty: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LsqConfig {
    /// Bonus for a win (B_w).
    pub bonus_win: f64,
    /// Bonus for the score ratio (B_r).
    pub bonus_ratio: f64,
    /// Margin-of-victory truncation cap (dS_max).
    pub ds_max: f64,
    /// Game reweighting sensitivity (beta_w); must exceed 1.
    pub beta_w: f64,
}

impl Default for LsqConfig {
    fn default() -> Self {
        Self {
            bonus_win: 30.0,
            bonus_ratio: 35.0,
            ds_max: 35.0,
            beta_w: 2.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosConfig {
    pub rank_power: f64,
}

impl Default for SosConfig {
    fn default() -> Self {
        Self { rank_power: 2.37 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuckConfig {
    /// Weight of the win-pct / aggregate-win-pct ratio; the opponent score
    /// ratio gets `1 - awp_weight`.
    pub awp_weight: f64,
}

impl Default for LuckConfig {
    fn default() -> Self {
        Self { awp_weight: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierConfig {
    pub bandwidth: f64,
    pub order: usize,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            bandwidth: 0.09,
            order: 4,
        }
    }
}

/// Blend weights for the power score. Expected to sum to roughly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerWeights {
    pub dom: f64,
    pub lsq: f64,
    pub col: f64,
    pub awp: f64,
    pub sos: f64,
    pub luck: f64,
    pub cons: f64,
    pub streak: f64,
}

impl Default for PowerWeights {
    fn default() -> Self {
        Self {
            dom: 0.18,
            lsq: 0.18,
            col: 0.18,
            awp: 0.18,
            sos: 0.06,
            luck: 0.06,
            cons: 0.10,
            streak: 0.06,
        }
    }
}

impl PowerWeights {
    pub fn sum(&self) -> f64 {
        self.dom + self.lsq + self.col + self.awp + self.sos + self.luck + self.cons + self.streak
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayoffConfig {
    pub enabled: bool,
    pub num_simulations: usize,
    /// Trials per convergence batch.
    pub batch_size: usize,
    pub seed: Option<u64>,
    /// Stop early once no probability moves more than this between batches.
    pub tolerance: Option<f64>,
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            num_simulations: 200_000,
            batch_size: 10_000,
            seed: None,
            tolerance: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingConfig {
    pub dominance: DominanceConfig,
    pub lsq: LsqConfig,
    pub sos: SosConfig,
    pub luck: LuckConfig,
    pub tiers: TierConfig,
    pub power: PowerWeights,
    pub playoffs: PlayoffConfig,
    /// Dotted names of knobs that fell back to their defaults.
    pub defaulted: Vec<String>,
}

// ---------------------------------------------------------------------------
// ranking.toml: knob resolution
// ---------------------------------------------------------------------------

/// Reads knobs out of the parsed ranking.toml table and collects the names
/// of knobs that were missing, mistyped, or out of range.
struct Resolver<'a> {
    root: &'a toml::Table,
    defaulted: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a toml::Table) -> Self {
        Self {
            root,
            defaulted: Vec::new(),
        }
    }

    /// Raw value of `section.key`. A section that is not a table counts as
    /// empty.
    fn value(&self, field: &str) -> Option<&'a toml::Value> {
        let (section, key) = field.split_once('.')?;
        let root: &'a toml::Table = self.root;
        match root.get(section)? {
            toml::Value::Table(table) => table.get(key),
            other => {
                warn!("ranking.toml `[{section}]` is a {}, not a table; ignoring it", other.type_str());
                None
            }
        }
    }

    fn fall_back<T: std::fmt::Display>(&mut self, field: &str, reason: String, default: T) -> T {
        warn!("ranking knob `{field}` {reason}, using default {default}");
        self.defaulted.push(field.to_string());
        default
    }

    fn wrong_type(value: &toml::Value) -> String {
        format!("has the wrong type ({})", value.type_str())
    }

    fn float(&mut self, field: &str, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
        let value = match self.value(field) {
            Some(toml::Value::Float(v)) => *v,
            Some(toml::Value::Integer(v)) => *v as f64,
            Some(other) => return self.fall_back(field, Self::wrong_type(other), default),
            None => {
                self.defaulted.push(field.to_string());
                return default;
            }
        };
        if value.is_finite() && valid(value) {
            value
        } else {
            self.fall_back(field, format!("= {value} is out of range"), default)
        }
    }

    fn count(&mut self, field: &str, default: usize) -> usize {
        match self.value(field) {
            Some(toml::Value::Integer(v)) if *v > 0 => *v as usize,
            Some(toml::Value::Integer(v)) => {
                self.fall_back(field, format!("= {v} must be positive"), default)
            }
            Some(other) => self.fall_back(field, Self::wrong_type(other), default),
            None => {
                self.defaulted.push(field.to_string());
                default
            }
        }
    }

    fn flag(&mut self, field: &str, default: bool) -> bool {
        match self.value(field) {
            Some(toml::Value::Boolean(v)) => *v,
            Some(other) => self.fall_back(field, Self::wrong_type(other), default),
            None => {
                self.defaulted.push(field.to_string());
                default
            }
        }
    }

    /// Knob with no default value: absent stays `None` and is not reported.
    fn optional<T>(&mut self, field: &str, parse: impl Fn(&toml::Value) -> Option<T>) -> Option<T> {
        let value = self.value(field)?;
        let parsed = parse(value);
        if parsed.is_none() {
            warn!("ranking knob `{field}` = {value} is invalid, ignoring it");
            self.defaulted.push(field.to_string());
        }
        parsed
    }

    fn resolve(mut self) -> RankingConfig {
        let d = RankingConfig::default();

        let dominance = DominanceConfig {
            sq_weight: self.float("dominance.sq_weight", d.dominance.sq_weight, unit_interval),
            decay_penalty: self.float("dominance.decay_penalty", d.dominance.decay_penalty, unit_interval),
        };

        let lsq = LsqConfig {
            bonus_win: self.float("lsq.bonus_win", d.lsq.bonus_win, non_negative),
            bonus_ratio: self.float("lsq.bonus_ratio", d.lsq.bonus_ratio, non_negative),
            ds_max: self.float("lsq.ds_max", d.lsq.ds_max, positive),
            beta_w: self.float("lsq.beta_w", d.lsq.beta_w, |v| v > 1.0),
        };

        let sos = SosConfig {
            rank_power: self.float("sos.rank_power", d.sos.rank_power, positive),
        };

        let luck = LuckConfig {
            awp_weight: self.float("luck.awp_weight", d.luck.awp_weight, unit_interval),
        };

        let tiers = TierConfig {
            bandwidth: self.float("tiers.bandwidth", d.tiers.bandwidth, positive),
            order: self.count("tiers.order", d.tiers.order),
        };

        let dp = d.power;
        let power = PowerWeights {
            dom: self.float("power.w_dom", dp.dom, non_negative),
            lsq: self.float("power.w_lsq", dp.lsq, non_negative),
            col: self.float("power.w_col", dp.col, non_negative),
            awp: self.float("power.w_awp", dp.awp, non_negative),
            sos: self.float("power.w_sos", dp.sos, non_negative),
            luck: self.float("power.w_luck", dp.luck, non_negative),
            cons: self.float("power.w_cons", dp.cons, non_negative),
            streak: self.float("power.w_strk", dp.streak, non_negative),
        };

        let playoffs = PlayoffConfig {
            enabled: self.flag("playoffs.enabled", d.playoffs.enabled),
            num_simulations: self.count("playoffs.num_simulations", d.playoffs.num_simulations),
            batch_size: self.count("playoffs.batch_size", d.playoffs.batch_size),
            seed: self.optional("playoffs.seed", |v| {
                v.as_integer().and_then(|i| u64::try_from(i).ok())
            }),
            tolerance: self.optional("playoffs.tolerance", |v| {
                let t = v.as_float().or_else(|| v.as_integer().map(|i| i as f64))?;
                (t.is_finite() && t > 0.0).then_some(t)
            }),
        };

        RankingConfig {
            dominance,
            lsq,
            sos,
            luck,
            tiers,
            power,
            playoffs,
            defaulted: self.defaulted,
        }
    }
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

fn non_negative(v: f64) -> bool {
    v >= 0.0
}

fn positive(v: f64) -> bool {
    v > 0.0
}

impl RankingConfig {
    /// Resolve ranking knobs from TOML text. Missing, mistyped, or
    /// out-of-range knobs fall back to defaults; only text that is not
    /// valid TOML is an error.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let root: toml::Table = toml::from_str(text)?;
        Ok(Resolver::new(&root).resolve())
    }

    /// Every knob at its default, with all of them reported as defaulted.
    pub fn all_defaulted() -> Self {
        Resolver::new(&toml::Table::new()).resolve()
    }
}

// ---------------------------------------------------------------------------

/// Load configuration from `config/league.toml` (required) and
/// `config/ranking.toml` (optional), relative to `base_dir`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let ranking_path = config_dir.join("ranking.toml");
    let ranking = if ranking_path.exists() {
        let text = read_file(&ranking_path)?;
        RankingConfig::from_toml_str(&text).map_err(|e| ConfigError::ParseError {
            path: ranking_path.clone(),
            source: e,
        })?
    } else {
        info!("{} not found, using default ranking knobs", ranking_path.display());
        RankingConfig::all_defaulted()
    };

    let config = Config {
        league: league_file.league,
        paths: league_file.paths,
        ranking,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy any config file missing from `config/` out of `defaults/`.
/// Returns the files that were created. `.example` templates are skipped.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");
    let copy_err = |message: String| ConfigError::DefaultsCopyError { message };

    if !defaults_dir.exists() {
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(copy_err(format!(
            "neither defaults/ nor config/ directory found in {}",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_err(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_err(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_err(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if !path.is_file() || file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut dest) => {
                let content = std::fs::read(&path)
                    .map_err(|e| copy_err(format!("failed to read {}: {e}", path.display())))?;
                dest.write_all(&content)
                    .map_err(|e| copy_err(format!("failed to write {}: {e}", target.display())))?;
                info!("initialized {} from defaults", target.display());
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(copy_err(format!("failed to create {}: {e}", target.display())));
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, seeding
/// `config/` from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let invalid = |field: &str, message: String| ConfigError::ValidationError {
        field: field.into(),
        message,
    };

    if config.league.week == Some(0) {
        return Err(invalid("league.week", "must be at least 1".into()));
    }
    if config.league.regular_season_weeks == 0 {
        return Err(invalid("league.regular_season_weeks", "must be greater than 0".into()));
    }
    if config.league.playoff_team_count < config.league.divisions.len() {
        return Err(invalid(
            "league.playoff_team_count",
            format!(
                "must be at least the number of divisions ({}), got {}",
                config.league.divisions.len(),
                config.league.playoff_team_count
            ),
        ));
    }

    let paths = &config.paths;
    let has_csv = paths.teams.is_some() && paths.games.is_some();
    if paths.season.is_none() && !has_csv {
        return Err(invalid(
            "paths.season",
            "set `season` (JSON) or both `teams` and `games` (CSV)".into(),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn workspace_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .canonicalize()
            .unwrap()
    }

    fn fresh_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        tmp
    }

    const LEAGUE_TOML: &str = r#"
[league]
name = "Test League"
year = 2023
week = 5

[paths]
season = "data/season.json"
history_dir = "output/history"
output_dir = "output"
"#;

    #[test]
    fn load_default_config_files() {
        let root = workspace_root();
        let tmp = fresh_dir("ranker_config_defaults");
        fs::copy(root.join("defaults/league.toml"), tmp.join("config/league.toml")).unwrap();
        fs::copy(root.join("defaults/ranking.toml"), tmp.join("config/ranking.toml")).unwrap();

        let config = load_config_from(&tmp).expect("defaults should load");
        assert_eq!(config.league.regular_season_weeks, 13);
        assert_eq!(config.ranking.dominance, DominanceConfig::default());
        assert_eq!(config.ranking.lsq, LsqConfig::default());
        assert_eq!(config.ranking.power, PowerWeights::default());
        assert_eq!(config.ranking.tiers, TierConfig::default());
        assert!(
            config.ranking.defaulted.is_empty(),
            "defaults file should set every knob, defaulted: {:?}",
            config.ranking.defaulted
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_ranking_toml_defaults_everything() {
        let tmp = fresh_dir("ranker_config_no_ranking");
        fs::write(tmp.join("config/league.toml"), LEAGUE_TOML).unwrap();

        let config = load_config_from(&tmp).expect("should load without ranking.toml");
        assert_eq!(config.league.week, Some(5));
        assert_eq!(config.ranking.sos.rank_power, 2.37);
        assert!(config.ranking.defaulted.contains(&"power.w_dom".to_string()));
        assert!(config.ranking.defaulted.contains(&"tiers.order".to_string()));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_knobs_fall_back_and_are_reported() {
        let config = RankingConfig::from_toml_str(
            r#"
[dominance]
sq_weight = 0.4

[power]
w_dom = 0.2
"#,
        )
        .unwrap();

        assert_eq!(config.dominance.sq_weight, 0.4);
        assert_eq!(config.dominance.decay_penalty, 0.5);
        assert_eq!(config.power.dom, 0.2);
        assert_eq!(config.power.lsq, 0.18);
        assert!(config.defaulted.contains(&"dominance.decay_penalty".to_string()));
        assert!(!config.defaulted.contains(&"dominance.sq_weight".to_string()));
        assert!(config.defaulted.contains(&"power.w_lsq".to_string()));
    }

    #[test]
    fn out_of_range_knobs_fall_back() {
        let config = RankingConfig::from_toml_str(
            r#"
[dominance]
decay_penalty = 1.5

[lsq]
beta_w = 0.9

[tiers]
order = 0

[playoffs]
tolerance = -1.0
"#,
        )
        .unwrap();

        assert_eq!(config.dominance.decay_penalty, 0.5);
        assert_eq!(config.lsq.beta_w, 2.2);
        assert_eq!(config.tiers.order, 4);
        assert_eq!(config.playoffs.tolerance, None);
        for field in ["dominance.decay_penalty", "lsq.beta_w", "tiers.order", "playoffs.tolerance"] {
            assert!(config.defaulted.contains(&field.to_string()), "{field} not reported");
        }
    }

    #[test]
    fn mistyped_knobs_fall_back() {
        let config = RankingConfig::from_toml_str(
            r#"
luck = 3

[dominance]
decay_penalty = "0.5"

[tiers]
order = 4.0

[lsq]
bonus_win = 25

[playoffs]
enabled = "yes"
seed = "abc"
"#,
        )
        .unwrap();

        assert_eq!(config.dominance.decay_penalty, 0.5);
        assert_eq!(config.tiers.order, 4);
        assert_eq!(config.luck.awp_weight, 0.5);
        assert!(!config.playoffs.enabled);
        assert_eq!(config.playoffs.seed, None);
        // Integers are accepted where a float is expected.
        assert_eq!(config.lsq.bonus_win, 25.0);
        assert!(!config.defaulted.contains(&"lsq.bonus_win".to_string()));
        for field in [
            "dominance.decay_penalty",
            "tiers.order",
            "luck.awp_weight",
            "playoffs.enabled",
            "playoffs.seed",
        ] {
            assert!(config.defaulted.contains(&field.to_string()), "{field} not reported");
        }
    }

    #[test]
    fn malformed_ranking_toml_is_a_parse_error() {
        let tmp = fresh_dir("ranker_config_bad_ranking");
        fs::write(tmp.join("config/league.toml"), LEAGUE_TOML).unwrap();
        fs::write(tmp.join("config/ranking.toml"), "this is not [[[ toml").unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("ranking.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = fresh_dir("ranker_config_missing_league");

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_week_zero() {
        let tmp = fresh_dir("ranker_config_week_zero");
        fs::write(
            tmp.join("config/league.toml"),
            LEAGUE_TOML.replace("week = 5", "week = 0"),
        )
        .unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "league.week"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_missing_data_source() {
        let tmp = fresh_dir("ranker_config_no_source");
        fs::write(
            tmp.join("config/league.toml"),
            LEAGUE_TOML.replace("season = \"data/season.json\"", "games = \"data/games.csv\""),
        )
        .unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "paths.season"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_existing() {
        let tmp = std::env::temp_dir().join("ranker_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        let config_dir = tmp.join("config");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::create_dir_all(&config_dir).unwrap();

        fs::write(defaults_dir.join("league.toml"), LEAGUE_TOML).unwrap();
        fs::write(defaults_dir.join("ranking.toml"), "[sos]\nrank_power = 2.0\n").unwrap();
        fs::write(defaults_dir.join("ranking.toml.example"), "# template\n").unwrap();
        fs::write(config_dir.join("league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("ranking.toml"));
        assert_eq!(fs::read_to_string(config_dir.join("league.toml")).unwrap(), "# custom\n");
        assert!(!config_dir.join("ranking.toml.example").exists());

        // A second pass finds everything in place and copies nothing.
        assert!(ensure_config_files(&tmp).expect("should succeed").is_empty());
        assert_eq!(
            fs::read_to_string(config_dir.join("ranking.toml")).unwrap(),
            "[sos]\nrank_power = 2.0\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("ranker_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
