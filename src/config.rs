//! Application-level configuration loading: question shape, challenge policy and leaderboard paging.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GLOBETROTTER_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Number of clues handed out per question.
    pub clue_count: usize,
    /// Number of city options per question, including the correct one.
    pub option_count: usize,
    /// Lifetime of a challenge code.
    pub challenge_ttl: Duration,
    /// Length of generated challenge codes.
    pub challenge_code_length: usize,
    /// How many fresh codes to try before giving up on collisions.
    pub challenge_code_attempts: u32,
    /// Points a challenger needs on top of the inviter score (1 = strict beat, 0 = tie wins).
    pub challenge_target_margin: u32,
    /// Public base URL used to build share links.
    pub share_base_url: String,
    /// Page size used when the leaderboard request omits `limit`.
    pub leaderboard_default_limit: u32,
    /// Upper bound applied to the leaderboard `limit`.
    pub leaderboard_max_limit: u32,
    /// Client-side countdown per question.
    pub round_time_limit: Duration,
    /// Optional destinations file loaded into the store at startup.
    pub catalog_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        clue_count = app_config.clue_count,
                        challenge_ttl_secs = app_config.challenge_ttl.as_secs(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Score a challenger must reach to beat an inviter who scored `inviter_score`.
    pub fn challenge_target(&self, inviter_score: u32) -> u32 {
        inviter_score.saturating_add(self.challenge_target_margin)
    }

    /// Shareable link for a challenge code.
    pub fn share_url(&self, code: &str) -> String {
        format!(
            "{}/challenge/{code}",
            self.share_base_url.trim_end_matches('/')
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clue_count: 3,
            option_count: 4,
            challenge_ttl: Duration::from_secs(24 * 60 * 60),
            challenge_code_length: 10,
            challenge_code_attempts: 5,
            challenge_target_margin: 1,
            share_base_url: "http://localhost:3000".into(),
            leaderboard_default_limit: 10,
            leaderboard_max_limit: 100,
            round_time_limit: Duration::from_secs(120),
            catalog_path: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file; every key is optional.
struct RawConfig {
    clue_count: Option<usize>,
    option_count: Option<usize>,
    challenge_ttl_secs: Option<u64>,
    challenge_code_length: Option<usize>,
    challenge_code_attempts: Option<u32>,
    challenge_target_margin: Option<u32>,
    share_base_url: Option<String>,
    leaderboard_default_limit: Option<u32>,
    leaderboard_max_limit: Option<u32>,
    round_time_limit_secs: Option<u64>,
    catalog_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let leaderboard_max_limit = raw
            .leaderboard_max_limit
            .unwrap_or(defaults.leaderboard_max_limit)
            .max(1);
        Self {
            clue_count: raw.clue_count.unwrap_or(defaults.clue_count).max(1),
            // A question needs at least the answer and one distractor.
            option_count: raw.option_count.unwrap_or(defaults.option_count).max(2),
            challenge_ttl: raw
                .challenge_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.challenge_ttl),
            challenge_code_length: raw
                .challenge_code_length
                .unwrap_or(defaults.challenge_code_length)
                .max(6),
            challenge_code_attempts: raw
                .challenge_code_attempts
                .unwrap_or(defaults.challenge_code_attempts)
                .max(1),
            challenge_target_margin: raw
                .challenge_target_margin
                .unwrap_or(defaults.challenge_target_margin),
            share_base_url: raw.share_base_url.unwrap_or(defaults.share_base_url),
            leaderboard_default_limit: raw
                .leaderboard_default_limit
                .unwrap_or(defaults.leaderboard_default_limit)
                .clamp(1, leaderboard_max_limit),
            leaderboard_max_limit,
            round_time_limit: raw
                .round_time_limit_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.round_time_limit),
            catalog_path: raw.catalog_path,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
