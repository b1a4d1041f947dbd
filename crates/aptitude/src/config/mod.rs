use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::{LeadPolicy, PasswordPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = PasswordPolicy::default();
        let password = PasswordPolicy {
            min_length: env_usize("APP_PASSWORD_MIN_LENGTH", defaults.min_length)?,
            require_letter: defaults.require_letter,
            require_digit: env_flag("APP_PASSWORD_REQUIRE_DIGIT", defaults.require_digit)?,
            require_symbol: env_flag("APP_PASSWORD_REQUIRE_SYMBOL", defaults.require_symbol)?,
            require_uppercase: env_flag(
                "APP_PASSWORD_REQUIRE_UPPERCASE",
                defaults.require_uppercase,
            )?,
        };
        let require_phone = env_flag("APP_LEAD_REQUIRE_PHONE", true)?;
        let session_capacity =
            env_usize("APP_SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?.max(1);

        let taxonomy_path = env::var("APP_TAXONOMY_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentConfig {
                taxonomy_path,
                lead_policy: LeadPolicy {
                    password,
                    require_phone,
                },
                session_capacity,
            },
        })
    }
}

fn env_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key, value: raw }),
        },
    }
}

fn env_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Taxonomy source and lead-capture policy.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    /// Optional JSON file with extra taxonomy definitions merged over the built-ins.
    pub taxonomy_path: Option<PathBuf>,
    pub lead_policy: LeadPolicy,
    /// Upper bound on sessions held by the in-memory store; the oldest are evicted first.
    pub session_capacity: usize,
}

pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { key: &'static str, value: String },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be a boolean flag, found '{value}'")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidNumber { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_TAXONOMY_PATH",
            "APP_PASSWORD_MIN_LENGTH",
            "APP_PASSWORD_REQUIRE_DIGIT",
            "APP_PASSWORD_REQUIRE_SYMBOL",
            "APP_PASSWORD_REQUIRE_UPPERCASE",
            "APP_LEAD_REQUIRE_PHONE",
            "APP_SESSION_CAPACITY",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.assessment.taxonomy_path.is_none());
        assert_eq!(config.assessment.lead_policy, LeadPolicy::default());
        assert_eq!(config.assessment.session_capacity, DEFAULT_SESSION_CAPACITY);
    }

    #[test]
    fn session_capacity_is_at_least_one() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SESSION_CAPACITY", "0");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.assessment.session_capacity, 1);

        env::set_var("APP_SESSION_CAPACITY", "many");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "APP_SESSION_CAPACITY",
                ..
            })
        ));
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_password_policy_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PASSWORD_MIN_LENGTH", "10");
        env::set_var("APP_PASSWORD_REQUIRE_SYMBOL", "yes");
        env::set_var("APP_LEAD_REQUIRE_PHONE", "false");
        let config = AppConfig::load().expect("config loads");
        let policy = config.assessment.lead_policy;
        assert_eq!(policy.password.min_length, 10);
        assert!(policy.password.require_symbol);
        assert!(!policy.require_phone);
        reset_env();
    }

    #[test]
    fn rejects_malformed_flags() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PASSWORD_REQUIRE_DIGIT", "sometimes");
        match AppConfig::load() {
            Err(ConfigError::InvalidFlag { key, value }) => {
                assert_eq!(key, "APP_PASSWORD_REQUIRE_DIGIT");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected invalid flag error, got {other:?}"),
        }
        reset_env();
    }
}
