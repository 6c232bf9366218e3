//! Configuration module for the schedule backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::schedule::OvernightPolicy;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid {} value: {:?}", self.var, self.value)
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// How department rollups treat shifts whose end is before their start
    pub overnight_policy: OvernightPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("SCHED_DB_PATH")
            .unwrap_or_else(|_| "./data/schedule.sqlite".to_string())
            .into();

        let bind_addr_raw =
            env::var("SCHED_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_raw.parse().map_err(|_| ConfigError {
            var: "SCHED_BIND_ADDR",
            value: bind_addr_raw.clone(),
        })?;

        let log_level = env::var("SCHED_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match env::var("SCHED_LOG_FORMAT") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "json" => true,
                "text" | "" => false,
                _ => {
                    return Err(ConfigError {
                        var: "SCHED_LOG_FORMAT",
                        value: raw,
                    })
                }
            },
            Err(_) => false,
        };

        let overnight_policy = match env::var("SCHED_OVERNIGHT_SHIFTS") {
            Ok(raw) => OvernightPolicy::from_str(&raw).ok_or(ConfigError {
                var: "SCHED_OVERNIGHT_SHIFTS",
                value: raw,
            })?,
            Err(_) => OvernightPolicy::default(),
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            overnight_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Env vars are process-wide; tests touching them must not interleave.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        env::remove_var("SCHED_DB_PATH");
        env::remove_var("SCHED_BIND_ADDR");
        env::remove_var("SCHED_LOG_LEVEL");
        env::remove_var("SCHED_LOG_FORMAT");
        env::remove_var("SCHED_OVERNIGHT_SHIFTS");
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/schedule.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.overnight_policy, OvernightPolicy::Preserve);
    }

    #[test]
    fn test_overnight_policy_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("SCHED_OVERNIGHT_SHIFTS", "wrap");

        let config = Config::from_env().unwrap();
        assert_eq!(config.overnight_policy, OvernightPolicy::Wrap);

        clear_env();
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("SCHED_BIND_ADDR", "not-an-address");
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.var, "SCHED_BIND_ADDR");

        env::remove_var("SCHED_BIND_ADDR");
        env::set_var("SCHED_OVERNIGHT_SHIFTS", "sometimes");
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.var, "SCHED_OVERNIGHT_SHIFTS");
        assert_eq!(err.value, "sometimes");

        env::remove_var("SCHED_OVERNIGHT_SHIFTS");
        env::set_var("SCHED_LOG_FORMAT", "xml");
        assert_eq!(Config::from_env().unwrap_err().var, "SCHED_LOG_FORMAT");

        env::set_var("SCHED_LOG_FORMAT", "JSON");
        assert!(Config::from_env().unwrap().log_json);

        clear_env();
    }
}
