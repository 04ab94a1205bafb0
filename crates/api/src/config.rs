use std::time::Duration;

use chrono_tz::Tz;
use sessiond_core::display::{parse_timezone, DEFAULT_DISPLAY_TIMEZONE};

/// Errors raised while reading [`ServerConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {kind}, got '{value}'")]
    Invalid {
        var: &'static str,
        kind: &'static str,
        value: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error(
        "SESSION_SWEEP_INTERVAL_SECS ({sweep}) must not exceed SESSION_IDLE_TIMEOUT_SECS ({idle})"
    )]
    SweepSlowerThanIdle { sweep: u64, idle: u64 },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Sessions idle for longer than this are evicted (default: `600`).
    pub session_idle_timeout_secs: u64,
    /// How often the reaper sweeps (default: `60`).
    pub session_sweep_interval_secs: u64,
    /// Name of the cookie carrying the session id (default: `sid`).
    pub session_cookie_name: String,
    /// `Max-Age` of the session cookie in seconds (default: `86400`).
    pub session_cookie_max_age_secs: u64,
    /// Zone used to render timestamps (default: `America/Mexico_City`).
    pub display_timezone: Tz,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            session_idle_timeout_secs: 600,
            session_sweep_interval_secs: 60,
            session_cookie_name: "sid".into(),
            session_cookie_max_age_secs: 24 * 60 * 60,
            display_timezone: DEFAULT_DISPLAY_TIMEZONE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SESSION_IDLE_TIMEOUT_SECS`   | `600`                   |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `60`                    |
    /// | `SESSION_COOKIE_NAME`         | `sid`                   |
    /// | `SESSION_COOKIE_MAX_AGE_SECS` | `86400`                 |
    /// | `DISPLAY_TIMEZONE`            | `America/Mexico_City`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", "u16", lookup("PORT"), defaults.port)?;

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let request_timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            "u64",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout_secs,
        )?;
        let session_idle_timeout_secs = parse_or(
            "SESSION_IDLE_TIMEOUT_SECS",
            "u64",
            lookup("SESSION_IDLE_TIMEOUT_SECS"),
            defaults.session_idle_timeout_secs,
        )?;
        let session_sweep_interval_secs = parse_or(
            "SESSION_SWEEP_INTERVAL_SECS",
            "u64",
            lookup("SESSION_SWEEP_INTERVAL_SECS"),
            defaults.session_sweep_interval_secs,
        )?;
        let session_cookie_max_age_secs = parse_or(
            "SESSION_COOKIE_MAX_AGE_SECS",
            "u64",
            lookup("SESSION_COOKIE_MAX_AGE_SECS"),
            defaults.session_cookie_max_age_secs,
        )?;

        let session_cookie_name = lookup("SESSION_COOKIE_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.session_cookie_name);

        let display_timezone = match lookup("DISPLAY_TIMEZONE") {
            Some(raw) => parse_timezone(&raw).map_err(|_| ConfigError::Invalid {
                var: "DISPLAY_TIMEZONE",
                kind: "IANA time zone",
                value: raw,
            })?,
            None => defaults.display_timezone,
        };

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_idle_timeout_secs,
            session_sweep_interval_secs,
            session_cookie_name,
            session_cookie_max_age_secs,
            display_timezone,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("REQUEST_TIMEOUT_SECS"));
        }
        if self.session_idle_timeout_secs == 0 {
            return Err(ConfigError::Zero("SESSION_IDLE_TIMEOUT_SECS"));
        }
        if self.session_sweep_interval_secs == 0 {
            return Err(ConfigError::Zero("SESSION_SWEEP_INTERVAL_SECS"));
        }
        // Stale sessions may outlive the idle window by at most one sweep.
        if self.session_sweep_interval_secs > self.session_idle_timeout_secs {
            return Err(ConfigError::SweepSlowerThanIdle {
                sweep: self.session_sweep_interval_secs,
                idle: self.session_idle_timeout_secs,
            });
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    kind: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            kind,
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_idle_timeout_secs, 600);
        assert_eq!(config.session_sweep_interval_secs, 60);
        assert_eq!(config.session_cookie_name, "sid");
        assert_eq!(config.display_timezone, chrono_tz::America::Mexico_City);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
            ("SESSION_IDLE_TIMEOUT_SECS", "300"),
            ("SESSION_SWEEP_INTERVAL_SECS", "30"),
            ("DISPLAY_TIMEZONE", "Europe/Madrid"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(30));
        assert_eq!(config.display_timezone, chrono_tz::Europe::Madrid);
    }

    #[test]
    fn bad_numbers_are_reported() {
        assert_matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
    }

    #[test]
    fn sweep_must_not_exceed_idle_timeout() {
        assert_matches!(
            load(&[
                ("SESSION_IDLE_TIMEOUT_SECS", "60"),
                ("SESSION_SWEEP_INTERVAL_SECS", "120"),
            ]),
            Err(ConfigError::SweepSlowerThanIdle { sweep: 120, idle: 60 })
        );
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        assert_matches!(
            load(&[("SESSION_IDLE_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Zero("SESSION_IDLE_TIMEOUT_SECS"))
        );
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_matches!(
            load(&[("DISPLAY_TIMEZONE", "Nowhere/Special")]),
            Err(ConfigError::Invalid { var: "DISPLAY_TIMEZONE", .. })
        );
    }
}
