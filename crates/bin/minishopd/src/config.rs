//! Daemon settings: an optional `minishop.toml` merged with `MINISHOP_*`
//! environment variables, the variables winning.
//!
//! `MINISHOP_CONFIG` points at another file. A missing file means defaults.

use std::str::FromStr;

use serde::Deserialize;
use tower_sessions::cookie::time::Duration;

const DEFAULT_PATH: &str = "minishop.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
}

/// Where the HTTP listener binds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Handed to the storage adapter as is, e.g. `sqlite:shop.db?mode=rwc`.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber` directive, `RUST_LOG` syntax.
    pub filter: String,
}

/// Back-office login sessions.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secure_cookies: bool,
    pub inactivity_minutes: u32,
}

impl SessionConfig {
    /// Idle time after which a session expires.
    #[must_use]
    pub fn inactivity(&self) -> Duration {
        Duration::minutes(i64::from(self.inactivity_minutes))
    }
}

impl Config {
    /// Read the settings file, then the process environment.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable or malformed file, an unparsable variable,
    /// or settings the daemon cannot run with.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = var("MINISHOP_CONFIG").unwrap_or_else(|| DEFAULT_PATH.to_string());
        let mut config = Self::read(&path)?;
        config.override_with(&var)?;
        config.check()?;
        Ok(config)
    }

    fn read(path: &str) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_string(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn override_with(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = var("MINISHOP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("MINISHOP_PORT") {
            self.server.port = parse("MINISHOP_PORT", &port)?;
        }
        if let Some(bind) = var("MINISHOP_BIND") {
            let Some((host, port)) = bind.rsplit_once(':') else {
                return Err(ConfigError::Variable {
                    key: "MINISHOP_BIND",
                    value: bind,
                });
            };
            self.server.port = parse("MINISHOP_BIND", port)?;
            self.server.host = host.to_string();
        }
        if let Some(url) = var("MINISHOP_DATABASE_URL") {
            self.database.url = url;
        }
        // RUST_LOG takes precedence over MINISHOP_LOG
        if let Some(filter) = var("RUST_LOG").or_else(|| var("MINISHOP_LOG")) {
            self.logging.filter = filter;
        }
        if let Some(secure) = var("MINISHOP_SECURE_COOKIES") {
            self.session.secure_cookies = flag("MINISHOP_SECURE_COOKIES", &secure)?;
        }
        if let Some(minutes) = var("MINISHOP_SESSION_MINUTES") {
            self.session.inactivity_minutes = parse("MINISHOP_SESSION_MINUTES", &minutes)?;
        }
        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Unusable("the listening port is 0"));
        }
        if self.session.inactivity_minutes == 0 {
            return Err(ConfigError::Unusable("sessions would expire immediately"));
        }
        Ok(())
    }

    /// `host:port` for the TCP listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Variable {
        key,
        value: value.to_string(),
    })
}

fn flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Variable {
            key,
            value: value.to_string(),
        }),
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:minishop.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "minishopd=info,minishop=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path} is not valid TOML")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("{key} has an unusable value {value:?}")]
    Variable { key: &'static str, value: String },
    #[error("refusing to start: {0}")]
    Unusable(&'static str),
}
