//! Runtime configuration: executor limits and the environment-driven [`ResearchConfig`].

use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "alibaba/tongyi-deepresearch-30b-a3b";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_HELPER_MODEL: &str = "openai/gpt-4o";
pub const DEFAULT_PLANNING_PORT: u16 = 6001;
pub const DEFAULT_MAX_ROUNDS: u32 = 8;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 2700;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Per-call bound for the planner and synthesizer LLM requests.
pub const LLM_TIMEOUT_SECONDS: u64 = 120;

/// Tools the reasoning agent is expected to carry.
pub const FUNCTION_LIST: [&str; 4] = ["search", "visit", "google_scholar", "PythonInterpreter"];

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("OPENROUTER_API_KEY is required when deep research is enabled")]
    MissingApiKey,
    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

/// Limits for the executor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Attempts per plan step. Must be at least 1.
    pub max_retries: u32,
    /// Per-attempt budget. Checked after the attempt returns; no preemption.
    pub timeout_seconds: Option<u64>,
    /// Passed through to the reasoning agent.
    pub max_rounds: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::NonPositive("max_retries"));
        }
        if self.timeout_seconds == Some(0) {
            return Err(ConfigError::NonPositive("timeout_seconds"));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::NonPositive("max_rounds"));
        }
        Ok(())
    }
}

/// Deep research settings, read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchConfig {
    pub enabled: bool,
    pub model: String,
    pub planning_port: u16,
    pub max_rounds: u32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub api_key: Option<String>,
    pub base_url: String,
    pub planner_model: String,
    pub synthesizer_model: String,
    pub log_level: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: DEFAULT_MODEL.to_string(),
            planning_port: DEFAULT_PLANNING_PORT,
            max_rounds: DEFAULT_MAX_ROUNDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            planner_model: DEFAULT_HELPER_MODEL.to_string(),
            synthesizer_model: DEFAULT_HELPER_MODEL.to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_number<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ResearchConfig {
    /// Loads `.env` and the XDG config file into the environment (existing variables
    /// win), then reads the settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = env_config::load_and_apply("deepresearch", None) {
            tracing::warn!(error = %e, "failed to load config files, using process environment");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`. Missing or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            enabled: lookup("DEEP_RESEARCHER_ENABLE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            model: non_blank(lookup("DEEPRESEARCH_MODEL")).unwrap_or(defaults.model),
            planning_port: parse_number(
                "DEEPRESEARCH_PORT",
                lookup("DEEPRESEARCH_PORT"),
                defaults.planning_port,
            )?,
            max_rounds: parse_number(
                "DEEPRESEARCH_MAX_ROUNDS",
                lookup("DEEPRESEARCH_MAX_ROUNDS"),
                defaults.max_rounds,
            )?,
            timeout_seconds: parse_number(
                "DEEPRESEARCH_TIMEOUT",
                lookup("DEEPRESEARCH_TIMEOUT"),
                defaults.timeout_seconds,
            )?,
            max_retries: parse_number(
                "DEEPRESEARCH_RETRIES",
                lookup("DEEPRESEARCH_RETRIES"),
                defaults.max_retries,
            )?,
            api_key: non_blank(lookup("OPENROUTER_API_KEY")),
            base_url: non_blank(lookup("OPENROUTER_BASE_URL")).unwrap_or(defaults.base_url),
            planner_model: non_blank(lookup("PLANNER_MODEL")).unwrap_or(defaults.planner_model),
            synthesizer_model: non_blank(lookup("SYNTHESIZER_MODEL"))
                .unwrap_or(defaults.synthesizer_model),
            log_level: non_blank(lookup("DEEPRESEARCH_LOG_LEVEL")).unwrap_or(defaults.log_level),
        })
    }

    /// A disabled configuration is always valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        self.executor_config().validate()
    }

    pub fn function_list(&self) -> Vec<String> {
        FUNCTION_LIST.iter().map(|s| s.to_string()).collect()
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_retries: self.max_retries,
            timeout_seconds: Some(self.timeout_seconds),
            max_rounds: self.max_rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// **Scenario**: An empty environment yields the documented defaults.
    #[test]
    fn defaults_from_empty_lookup() {
        let cfg = ResearchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ResearchConfig::default());
        assert!(!cfg.enabled);
        assert_eq!(cfg.planning_port, 6001);
        assert_eq!(cfg.executor_config(), ExecutorConfig::default());
        assert!(cfg.validate().is_ok());
    }

    /// **Scenario**: Values from the environment override defaults.
    #[test]
    fn overrides_from_lookup() {
        let cfg = ResearchConfig::from_lookup(lookup(&[
            ("DEEP_RESEARCHER_ENABLE", "TRUE"),
            ("DEEPRESEARCH_MAX_ROUNDS", "3"),
            ("DEEPRESEARCH_TIMEOUT", " 60 "),
            ("DEEPRESEARCH_RETRIES", "4"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("PLANNER_MODEL", "p"),
            ("SYNTHESIZER_MODEL", ""),
        ]))
        .unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.max_rounds, 3);
        assert_eq!(cfg.timeout_seconds, 60);
        assert_eq!(cfg.max_retries, 4);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.planner_model, "p");
        assert_eq!(cfg.synthesizer_model, DEFAULT_HELPER_MODEL);
        assert!(cfg.validate().is_ok());
    }

    /// **Scenario**: A non-numeric value is reported with its key.
    #[test]
    fn invalid_number_is_rejected() {
        let err = ResearchConfig::from_lookup(lookup(&[("DEEPRESEARCH_RETRIES", "two")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "DEEPRESEARCH_RETRIES".into(),
                value: "two".into()
            }
        );
    }

    /// **Scenario**: Enabled config needs an API key and positive limits.
    #[test]
    fn enabled_validation() {
        let mut cfg = ResearchConfig {
            enabled: true,
            ..ResearchConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::MissingApiKey));
        cfg.api_key = Some("k".into());
        cfg.max_retries = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositive("max_retries")));
        cfg.max_retries = 1;
        cfg.timeout_seconds = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive("timeout_seconds"))
        );
    }

    #[test]
    fn function_list_names_agent_tools() {
        let names = ResearchConfig::default().function_list();
        assert_eq!(
            names,
            vec!["search", "visit", "google_scholar", "PythonInterpreter"]
        );
    }
}
