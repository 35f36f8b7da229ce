use std::env;
use std::time::Duration;

use crate::error::{Result, TetherError};
use crate::relay::ProbeConfig;
use crate::supervisor::Backoff;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay discovery configuration
    pub relay: RelayConfig,
    /// Reconnect backoff configuration
    pub backoff: BackoffConfig,
    /// Credential persistence configuration
    pub session: SessionConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// File holding candidate invite links, one per line (default: proxies.txt)
    pub invite_file: String,
    /// Maximum concurrent probes (default: 20)
    pub probe_concurrency: usize,
    /// Per-probe connect timeout in seconds (default: 3)
    pub probe_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Minimum retry delay in seconds (default: 1)
    pub floor: u64,
    /// Maximum retry delay in seconds (default: 300)
    pub ceiling: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Path of the persisted session file (default: tether.session)
    pub file: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Config {
            relay: RelayConfig {
                invite_file: get_env_or("TETHER_INVITE_FILE", "proxies.txt"),
                probe_concurrency: get_env_or("TETHER_PROBE_CONCURRENCY", "20")
                    .parse()
                    .map_err(|_| {
                        TetherError::InvalidConfig(
                            "TETHER_PROBE_CONCURRENCY must be a valid number".into(),
                        )
                    })?,
                probe_timeout: get_env_or("TETHER_PROBE_TIMEOUT", "3").parse().map_err(|_| {
                    TetherError::InvalidConfig("TETHER_PROBE_TIMEOUT must be a valid number".into())
                })?,
            },
            backoff: BackoffConfig {
                floor: get_env_or("TETHER_BACKOFF_FLOOR", "1").parse().map_err(|_| {
                    TetherError::InvalidConfig("TETHER_BACKOFF_FLOOR must be a valid number".into())
                })?,
                ceiling: get_env_or("TETHER_BACKOFF_CEILING", "300")
                    .parse()
                    .map_err(|_| {
                        TetherError::InvalidConfig(
                            "TETHER_BACKOFF_CEILING must be a valid number".into(),
                        )
                    })?,
            },
            session: SessionConfig {
                file: get_env_or("TETHER_SESSION_FILE", "tether.session"),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        };

        if config.relay.probe_concurrency == 0 {
            return Err(TetherError::InvalidConfig(
                "TETHER_PROBE_CONCURRENCY must be at least 1".into(),
            ));
        }
        if config.backoff.floor == 0 || config.backoff.ceiling < config.backoff.floor {
            return Err(TetherError::InvalidConfig(
                "TETHER_BACKOFF_FLOOR must be >= 1 and <= TETHER_BACKOFF_CEILING".into(),
            ));
        }

        Ok(config)
    }

    /// Probe scheduler settings derived from this configuration
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            concurrency: self.relay.probe_concurrency,
            attempt_timeout: Duration::from_secs(self.relay.probe_timeout),
        }
    }

    /// Reconnect backoff derived from this configuration
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_secs(self.backoff.floor),
            Duration::from_secs(self.backoff.ceiling),
        )
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const CONFIG_ENV_KEYS: &[&str] = &[
        "TETHER_INVITE_FILE",
        "TETHER_PROBE_CONCURRENCY",
        "TETHER_PROBE_TIMEOUT",
        "TETHER_BACKOFF_FLOOR",
        "TETHER_BACKOFF_CEILING",
        "TETHER_SESSION_FILE",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let saved = keys
                .iter()
                .map(|&key| {
                    let old = env::var(key).ok();
                    env::remove_var(key);
                    (key.to_string(), old)
                })
                .collect();

            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        let config = Config::from_env().unwrap();

        assert_eq!(config.relay.invite_file, "proxies.txt");
        assert_eq!(config.relay.probe_concurrency, 20);
        assert_eq!(config.relay.probe_timeout, 3);
        assert_eq!(config.backoff.floor, 1);
        assert_eq!(config.backoff.ceiling, 300);
        assert_eq!(config.session.file, "tether.session");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_config_from_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("TETHER_INVITE_FILE", "relays.txt");
        env::set_var("TETHER_PROBE_CONCURRENCY", "5");
        env::set_var("TETHER_PROBE_TIMEOUT", "10");
        env::set_var("TETHER_BACKOFF_FLOOR", "2");
        env::set_var("TETHER_BACKOFF_CEILING", "60");

        let config = Config::from_env().unwrap();

        assert_eq!(config.relay.invite_file, "relays.txt");
        assert_eq!(config.relay.probe_concurrency, 5);
        assert_eq!(config.probe_config().attempt_timeout, Duration::from_secs(10));
        assert_eq!(config.backoff().current(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_from_env_invalid_concurrency() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("TETHER_PROBE_CONCURRENCY", "0");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, TetherError::InvalidConfig(_)));

        env::set_var("TETHER_PROBE_CONCURRENCY", "lots");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, TetherError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_backoff_ordering_enforced() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("TETHER_BACKOFF_FLOOR", "120");
        env::set_var("TETHER_BACKOFF_CEILING", "30");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, TetherError::InvalidConfig(_)));
    }
}
