//! Server configuration read from the environment.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quizduel_duel::application::settings::DuelSettings;

use crate::error::AppError;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding the match, stats and score documents.
    pub data_dir: PathBuf,
    /// JSON file with the question pool.
    pub questions_path: PathBuf,
    /// Engine tunables.
    pub settings: DuelSettings,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse, or if the
    /// round count or round timeout is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = DuelSettings::default();

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 3000_u16)?;
        let data_dir = PathBuf::from(lookup("QUIZDUEL_DATA_DIR").unwrap_or_else(|| "storage".to_string()));
        let questions_path = lookup("QUIZDUEL_QUESTIONS")
            .map_or_else(|| data_dir.join("quiz_questions.json"), PathBuf::from);

        let rounds_per_match = parse_var(&lookup, "QUIZDUEL_ROUNDS", defaults.rounds_per_match)?;
        let round_timeout = parse_var(
            &lookup,
            "QUIZDUEL_ROUND_TIMEOUT_SECS",
            defaults.round_timeout.as_secs(),
        )?;
        let match_ttl = parse_var(
            &lookup,
            "QUIZDUEL_MATCH_TTL_SECS",
            defaults.match_ttl.as_secs(),
        )?;

        if rounds_per_match == 0 {
            return Err(AppError::Config("QUIZDUEL_ROUNDS must be at least 1".into()));
        }
        if round_timeout == 0 {
            return Err(AppError::Config(
                "QUIZDUEL_ROUND_TIMEOUT_SECS must be at least 1".into(),
            ));
        }

        Ok(Self {
            host,
            port,
            data_dir,
            questions_path,
            settings: DuelSettings {
                rounds_per_match,
                round_timeout: Duration::from_secs(round_timeout),
                match_ttl: Duration::from_secs(match_ttl),
            },
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of the match document.
    #[must_use]
    pub fn matches_path(&self) -> PathBuf {
        self.data_dir.join("pvp_matches.json")
    }

    /// Path of the duel stats document.
    #[must_use]
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("pvp_stats.json")
    }

    /// Path of the global score document.
    #[must_use]
    pub fn scores_path(&self) -> PathBuf {
        self.data_dir.join("scores.json")
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid ({raw:?}): {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.data_dir, PathBuf::from("storage"));
        assert_eq!(
            config.questions_path,
            PathBuf::from("storage").join("quiz_questions.json")
        );
        assert_eq!(config.settings, DuelSettings::default());
    }

    #[test]
    fn test_overrides_are_read() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("QUIZDUEL_DATA_DIR", "/var/lib/quizduel"),
            ("QUIZDUEL_QUESTIONS", "/etc/quizduel/questions.json"),
            ("QUIZDUEL_ROUNDS", "3"),
            ("QUIZDUEL_ROUND_TIMEOUT_SECS", "30"),
            ("QUIZDUEL_MATCH_TTL_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.matches_path(),
            PathBuf::from("/var/lib/quizduel/pvp_matches.json")
        );
        assert_eq!(
            config.questions_path,
            PathBuf::from("/etc/quizduel/questions.json")
        );
        assert_eq!(config.settings.rounds_per_match, 3);
        assert_eq!(config.settings.round_timeout, Duration::from_secs(30));
        assert_eq!(config.settings.match_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = config_from(&[("PORT", "eighty")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_rounds_is_rejected() {
        let result = config_from(&[("QUIZDUEL_ROUNDS", "0")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
