use crate::services::resolver::{SlugPolicy, DEFAULT_FALLBACK_PREFIX, DEFAULT_MAX_ATTEMPTS};
use crate::services::slug::{
    self, SlugOptions, DEFAULT_MAX_LENGTH, DEFAULT_MAX_TOKENS, MIN_TOKENS, SEPARATOR,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub slug: SlugConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    pub url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlugConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Used when a title yields no slug; the last six characters of the
    /// article id are appended.
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Route names that articles may never claim.
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            max_tokens: default_max_tokens(),
            fallback_prefix: default_fallback_prefix(),
            max_attempts: default_max_attempts(),
            reserved: default_reserved(),
        }
    }
}

impl SlugConfig {
    /// Shortest `max_length` that still fits a fallback slug.
    const MIN_LENGTH: usize = 10;

    pub fn options(&self) -> SlugOptions {
        SlugOptions {
            max_length: self.max_length,
            max_tokens: self.max_tokens,
        }
    }

    pub fn policy(&self) -> SlugPolicy {
        SlugPolicy {
            options: self.options(),
            fallback_prefix: self.fallback_prefix.clone(),
            max_attempts: self.max_attempts,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens < MIN_TOKENS {
            anyhow::bail!("slug.max_tokens must be at least {}", MIN_TOKENS);
        }
        if self.max_length < Self::MIN_LENGTH {
            anyhow::bail!("slug.max_length must be at least {}", Self::MIN_LENGTH);
        }
        if self.max_attempts == 0 {
            anyhow::bail!("slug.max_attempts must be greater than 0");
        }

        let allowed =
            |c: char| c == SEPARATOR || (slug::is_slug_char(c) && !c.is_ascii_uppercase());
        if !self.fallback_prefix.chars().all(allowed) {
            anyhow::bail!(
                "slug.fallback_prefix '{}' may only contain lowercase letters, digits and '-'",
                self.fallback_prefix
            );
        }

        self.policy().fallback_slug("000000").map_err(|e| {
            anyhow::anyhow!("slug.fallback_prefix '{}' is unusable: {}", self.fallback_prefix, e)
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_language() -> String {
    "ar".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_fallback_prefix() -> String {
    DEFAULT_FALLBACK_PREFIX.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_reserved() -> Vec<String> {
    [
        "admin", "api", "login", "logout", "register", "dashboard", "orders", "bookings",
        "interpreters", "payments", "health",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `almofasir init` first?",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.default_page_size == 0 {
            anyhow::bail!("api.default_page_size must be greater than 0");
        }
        if self.api.default_page_size > self.api.max_page_size {
            anyhow::bail!("api.default_page_size must not exceed api.max_page_size");
        }
        self.slug.validate()?;
        Ok(())
    }
}
