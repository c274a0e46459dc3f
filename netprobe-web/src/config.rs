//! Server configuration loaded from TOML.
//!
//! Every field has a default, so the server starts without a config file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use netprobe_toolbox::{DEFAULT_DOH_ENDPOINT, LookupBackend, ToolboxOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dns: DnsConfig,
    pub rate_limit: RateLimitConfig,
}

/// Command line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// HTTP worker threads; `0` means one per CPU.
    pub workers: usize,
    /// Honour `CF-Connecting-IP` / `X-Forwarded-For` / `X-Real-IP`.
    pub trust_proxy: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            workers: 0,
            trust_proxy: false,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: "info"); `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
    /// Also write a daily-rotated log file into this directory.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsBackend {
    #[default]
    System,
    Doh,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Backend for `GET /api/dns`. Custom-resolver lookups always use classic DNS.
    pub backend: DnsBackend,
    pub doh_url: String,
    pub timeout_ms: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            backend: DnsBackend::System,
            doh_url: DEFAULT_DOH_ENDPOINT.to_string(),
            timeout_ms: 5000,
        }
    }
}

impl DnsConfig {
    pub fn toolbox_options(&self) -> ToolboxOptions {
        let backend = match self.backend {
            DnsBackend::System => LookupBackend::System,
            DnsBackend::Doh => LookupBackend::DnsOverHttps {
                endpoint: self.doh_url.clone(),
            },
        };
        ToolboxOptions {
            backend,
            dns_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Fixed-window limit for one group of endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitRule {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl RateLimitRule {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Shared by `/api/dns` and `/api/dns-resolve`.
    pub dns: RateLimitRule,
    pub port_scan: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dns: RateLimitRule {
                window_secs: 5 * 60,
                max_requests: 20,
            },
            port_scan: RateLimitRule {
                window_secs: 10 * 60,
                max_requests: 10,
            },
        }
    }
}

impl Config {
    /// Load configuration from `path` (or defaults when `None`) and apply CLI overrides.
    pub fn load(path: Option<&Path>, overrides: CliOverrides) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };

        if let Some(bind_address) = overrides.bind_address {
            config.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            bail!("server.port must not be 0");
        }
        if self.server.bind_address.trim().is_empty() {
            bail!("server.bind_address must not be empty");
        }
        if self.dns.timeout_ms == 0 {
            bail!("dns.timeout_ms must be greater than 0");
        }
        if self.dns.backend == DnsBackend::Doh && !self.dns.doh_url.starts_with("https://") {
            bail!("dns.doh_url must be an https:// URL when backend = \"doh\"");
        }
        for (name, rule) in [
            ("rate_limit.dns", &self.rate_limit.dns),
            ("rate_limit.port_scan", &self.rate_limit.port_scan),
        ] {
            if rule.window_secs == 0 || rule.max_requests == 0 {
                bail!("{name}: window_secs and max_requests must be greater than 0");
            }
        }
        Ok(())
    }
}
