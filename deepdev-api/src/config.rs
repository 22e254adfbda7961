//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: DEEPDEV_, nested keys split on `_`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/deepdev-api/config.toml
//! 4. System directory: /etc/deepdev-api/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Application name used for config directories
const APP_NAME: &str = "deepdev-api";

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "DEEPDEV_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Dataset location and refresh
    #[serde(default)]
    pub data: DataConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// IP lookup configuration
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one JSON array file per dataset
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// Seconds between dataset reloads, `0` disables reloading
    #[serde(default)]
    pub reload_interval_secs: u64,
}

impl DataConfig {
    /// Reload interval, `None` when reloading is disabled
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_secs > 0).then(|| Duration::from_secs(self.reload_interval_secs))
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            reload_interval_secs: 0,
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS mode: permissive, restrictive or disabled
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,

    /// Per-client rate limiting (governor)
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            compression: true,
            cors_mode: default_cors_mode(),
            rate_limit: default_rate_limit(),
        }
    }
}

/// Per-client rate limiting configuration (governor-based)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum requests per period
    #[serde(default = "default_rate_limit_requests")]
    pub requests_per_period: u32,

    /// Time period in seconds
    #[serde(default = "default_rate_limit_period_secs")]
    pub period_secs: u64,

    /// Requests a fresh client may send at once
    #[serde(default = "default_rate_limit_requests")]
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// Period as a `Duration`
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_period: default_rate_limit_requests(),
            period_secs: default_rate_limit_period_secs(),
            burst_size: default_rate_limit_requests(),
        }
    }
}

/// IP lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// How long a lookup result stays cached
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl IpLookupConfig {
    /// Cache TTL as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_rate_limit() -> Option<RateLimitConfig> {
    Some(RateLimitConfig::default())
}

fn default_rate_limit_requests() -> u32 {
    100
}

fn default_rate_limit_period_secs() -> u64 {
    900
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Environment variables (DEEPDEV_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment.merge(Self::env_provider()).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the standard search paths. Environment variables still
    /// take precedence.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env_provider())
            .extract()?;

        Ok(config)
    }

    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).split("_")
    }

    /// Config file paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(APP_NAME).join("config.toml"));

        paths
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Whether the service runs in a production environment
    pub fn is_production(&self) -> bool {
        self.service.environment.eq_ignore_ascii_case("production")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: APP_NAME.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            data: DataConfig::default(),
            middleware: MiddlewareConfig::default(),
            ip_lookup: IpLookupConfig::default(),
        }
    }
}
