use serde::Deserialize;
use vocab_study::{AnswerMatcher, FeedbackDelays, HintPenalty, StudyConfig};

/// Deployment flavour; drives log format and defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Settings read from the process environment (after `.env`, if any).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    /// Comma separated list of origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_learn_correct_delay_ms")]
    pub learn_correct_delay_ms: u64,
    #[serde(default = "default_learn_incorrect_delay_ms")]
    pub learn_incorrect_delay_ms: u64,
    #[serde(default = "default_comprehensive_delay_ms")]
    pub comprehensive_delay_ms: u64,
    #[serde(default)]
    pub hint_penalty: HintPenalty,
    #[serde(default)]
    pub ignore_diacritics: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> String {
    "http://localhost:8080".to_string()
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_session_idle_minutes() -> u64 {
    60
}

const fn default_max_sessions() -> usize {
    10_000
}

const fn default_learn_correct_delay_ms() -> u64 {
    1000
}

const fn default_learn_incorrect_delay_ms() -> u64 {
    2000
}

const fn default_comprehensive_delay_ms() -> u64 {
    1000
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Self>()
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub const fn session_idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }

    /// Engine settings shared by every session this host creates.
    pub const fn study_config(&self) -> StudyConfig {
        StudyConfig {
            feedback: FeedbackDelays {
                learn_correct_ms: self.learn_correct_delay_ms,
                learn_incorrect_ms: self.learn_incorrect_delay_ms,
                comprehensive_ms: self.comprehensive_delay_ms,
            },
            hint_penalty: self.hint_penalty,
            matcher: AnswerMatcher {
                ignore_diacritics: self.ignore_diacritics,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ApiConfig, envy::Error> {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        )
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/vocab")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.allowed_origins(), vec!["http://localhost:8080"]);
        assert_eq!(config.max_sessions, 10_000);
        assert_eq!(config.study_config(), StudyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/vocab"),
            ("ENVIRONMENT", "production"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("HINT_PENALTY", "treat_as_incorrect"),
            ("IGNORE_DIACRITICS", "true"),
            ("LEARN_INCORRECT_DELAY_MS", "3000"),
        ])
        .unwrap();
        assert!(config.environment.is_production());
        assert_eq!(
            config.allowed_origins(),
            vec!["https://a.example", "https://b.example"]
        );

        let study = config.study_config();
        assert_eq!(study.hint_penalty, HintPenalty::TreatAsIncorrect);
        assert!(study.matcher.ignore_diacritics);
        assert_eq!(study.feedback.learn_incorrect_ms, 3000);
    }

    #[test]
    fn test_idle_timeout_saturates() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/vocab"),
            ("SESSION_IDLE_MINUTES", "18446744073709551615"),
        ])
        .unwrap();
        assert_eq!(
            config.session_idle_timeout(),
            std::time::Duration::from_secs(u64::MAX)
        );

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/vocab"),
            ("SESSION_IDLE_MINUTES", "5"),
        ])
        .unwrap();
        assert_eq!(
            config.session_idle_timeout(),
            std::time::Duration::from_secs(300)
        );
    }

    #[test]
    fn test_database_url_required() {
        assert!(config_from(&[]).is_err());
    }
}
