/// Configuration management for Social Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Feed and search pagination settings
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Pagination limits shared by the feed and search assemblers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the caller does not ask for one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Larger requests are capped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Merge the viewer's own posts into their home feed
    #[serde(default)]
    pub include_viewer_posts: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            include_viewer_posts: false,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            bail!("FEED_DEFAULT_PAGE_SIZE must be at least 1");
        }
        if self.max_page_size < self.default_page_size {
            bail!(
                "FEED_MAX_PAGE_SIZE ({}) must not be below FEED_DEFAULT_PAGE_SIZE ({})",
                self.max_page_size,
                self.default_page_size
            );
        }
        Ok(())
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    50
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_or("DB_MAX_CONNECTIONS", default_max_connections()),
            min_connections: env_or("DB_MIN_CONNECTIONS", default_min_connections()),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", default_acquire_timeout_secs()),
        };

        let feed = FeedConfig {
            default_page_size: env_or("FEED_DEFAULT_PAGE_SIZE", default_page_size()),
            max_page_size: env_or("FEED_MAX_PAGE_SIZE", default_max_page_size()),
            include_viewer_posts: env_or("FEED_INCLUDE_VIEWER_POSTS", false),
        };
        feed.validate().context("Invalid feed configuration")?;

        Ok(Config {
            app,
            database,
            feed,
        })
    }
}
