use crate::{
    cli::Cli,
    core::leaderboard::{LeaderboardConfig, Leaderboards},
    error::{BotError, BotResult},
};
use figment::{
    providers::{Env, Format, Json, Serialized, Yaml},
    Figment,
};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

// Scalar settings that may come from the environment. Example:
// BACKEND_BASE_URL="http://localhost:8080" would set backend_base_url.
const ENV_SETTINGS: [&'static str; 5] = [
    "trace_level",
    "backend_base_url",
    "backend_api_timeout_sec",
    "refresh_interval_sec",
    "db_path",
];

// Settings are read once at boot from the configuration file, then the
// environment, then the command line (last one wins).
#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,
    #[serde(default = "default_backend_api_timeout_sec")]
    pub backend_api_timeout_sec: u64,
    // Both datasets are refreshed at this interval
    #[serde(default = "default_refresh_interval_sec")]
    pub refresh_interval_sec: u64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    // Requester ids allowed to run membership commands
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub leaderboards: BTreeMap<String, LeaderboardConfig>,
}

impl Settings {
    pub fn new(cli: &Cli) -> BotResult<Self> {
        let figment = match cli.config.exists() {
            true => Settings::file_provider(&cli.config)?,
            false => {
                return Err(BotError::Config(format!(
                    "configuration file {} not found",
                    cli.config.display()
                )))
            }
        };

        Settings::extract(
            figment
                .merge(Env::raw().only(&ENV_SETTINGS))
                .merge(Serialized::defaults(cli)),
        )
    }

    fn file_provider(path: &Path) -> BotResult<Figment> {
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Figment::new().merge(Json::file(path)),
            Some("yaml") | Some("yml") => Figment::new().merge(Yaml::file(path)),
            _ => {
                return Err(BotError::Config(format!(
                    "{} should be a .yaml or .json file",
                    path.display()
                )))
            }
        };
        Ok(figment)
    }

    pub fn extract(figment: Figment) -> BotResult<Self> {
        let settings: Settings = figment.extract()?;
        if settings.refresh_interval_sec == 0 {
            return Err(BotError::Config(
                "refresh_interval_sec must be positive".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Resolver over the configured leaderboards. Rejects aliases pointing
    /// nowhere.
    pub fn leaderboards(&self) -> BotResult<Leaderboards> {
        Leaderboards::new(self.leaderboards.clone(), self.aliases.clone())
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase().as_str() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_backend_base_url() -> String {
    "https://byu-cpc-backend-433866642768.us-west1.run.app".to_string()
}

fn default_backend_api_timeout_sec() -> u64 {
    30
}

fn default_refresh_interval_sec() -> u64 {
    600
}

fn default_db_path() -> String {
    "./db.json".to_string()
}
