// Configuration: defaults, optional TOML file ($CONFIG_FILE), then environment overrides

use anyhow::Context;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for interval and timeout settings (one day).
const MAX_SECONDS: f64 = 86_400.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dish: DishConfig,
    pub server: ServerConfig,
    pub monitoring: MonitoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DishConfig {
    pub ip: String,
    pub port: u16,
    /// Connect and per-call timeout, seconds.
    pub timeout_secs: f64,
}

impl Default for DishConfig {
    fn default() -> Self {
        Self {
            ip: "192.168.100.1".into(),
            port: 9200,
            timeout_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 9877,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Seconds between polls; fractional values allowed.
    pub poll_interval_secs: f64,
    /// Drop rate (0.0-1.0) above which each poll logs an alert.
    pub alert_threshold: f64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2.0,
            alert_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".into(),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key}={raw:?} is not valid"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").ok();
        Self::load_with(path.as_deref(), |key: &str| std::env::var(key).ok())
    }

    /// Defaults, then the TOML file at `path` if given, then overrides from `lookup`.
    pub fn load_with(
        path: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => {
                let s = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {path}"))?;
                toml::from_str(&s).with_context(|| format!("parsing config file {path}"))?
            }
            None => AppConfig::default(),
        };
        base.with_overrides(lookup)
    }

    /// Parse and validate config from a TOML string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus overrides from `lookup` (environment-style keys).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        AppConfig::default().with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(ip) = lookup("DISH_IP") {
            self.dish.ip = ip.trim().to_string();
        }
        if let Some(port) = parse_var::<u16>(&lookup, "DISH_PORT")? {
            self.dish.port = port;
        }
        if let Some(timeout) = parse_var::<f64>(&lookup, "DISH_TIMEOUT")? {
            self.dish.timeout_secs = timeout;
        }
        if let Some(interval) = parse_var::<f64>(&lookup, "POLL_INTERVAL")? {
            self.monitoring.poll_interval_secs = interval;
        }
        if let Some(threshold) = parse_var::<f64>(&lookup, "ALERT_THRESHOLD")? {
            self.monitoring.alert_threshold = threshold;
        }
        if let Some(host) = lookup("HTTP_HOST") {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = parse_var::<u16>(&lookup, "HTTP_PORT")? {
            self.server.port = port;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.dish.ip.is_empty(), "dish.ip must be non-empty");
        anyhow::ensure!(
            self.dish.port > 0,
            "dish.port must be between 1 and 65535, got {}",
            self.dish.port
        );
        anyhow::ensure!(
            self.dish.timeout_secs > 0.0 && self.dish.timeout_secs <= MAX_SECONDS,
            "dish.timeout_secs must be > 0 and at most {MAX_SECONDS}, got {}",
            self.dish.timeout_secs
        );
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.monitoring.poll_interval_secs > 0.0
                && self.monitoring.poll_interval_secs <= MAX_SECONDS,
            "monitoring.poll_interval_secs must be > 0 and at most {MAX_SECONDS}, got {}",
            self.monitoring.poll_interval_secs
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.monitoring.alert_threshold),
            "monitoring.alert_threshold must be between 0.0 and 1.0, got {}",
            self.monitoring.alert_threshold
        );
        anyhow::ensure!(
            level_directive(&self.logging.level).is_some(),
            "logging.level must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL, got {:?}",
            self.logging.level
        );
        Ok(())
    }

    /// `ip:port` of the dish's gRPC endpoint.
    pub fn dish_target(&self) -> String {
        format!("{}:{}", self.dish.ip, self.dish.port)
    }

    pub fn dish_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.dish.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.monitoring.poll_interval_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// `EnvFilter` directive for the configured level.
    pub fn log_filter(&self) -> &'static str {
        level_directive(&self.logging.level).unwrap_or("info")
    }
}

fn level_directive(level: &str) -> Option<&'static str> {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" | "WARNING" => Some("warn"),
        "ERROR" | "CRITICAL" => Some("error"),
        _ => None,
    }
}
