use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::{SortKey, ViewMode, PAGE_SIZE};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Synthetic copies generated for every base product.
    #[serde(default = "default_variant_copies")]
    pub variant_copies: usize,
    /// Fixed RNG seed for variant generation; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON catalog file; the built-in catalog when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_variant_copies() -> usize { 4 }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            variant_copies: default_variant_copies(),
            seed: None,
            path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Simulated latency of each "load more".
    #[serde(default = "default_load_latency_ms")]
    pub load_latency_ms: u64,
}

fn default_page_size() -> usize { PAGE_SIZE }
fn default_load_latency_ms() -> u64 { 600 }

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            load_latency_ms: default_load_latency_ms(),
        }
    }
}

impl PaginationConfig {
    pub fn load_latency(&self) -> Duration {
        Duration::from_millis(self.load_latency_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrollConfig {
    /// Load more when fewer than this many lines remain below the viewport.
    #[serde(default = "default_threshold_lines")]
    pub threshold_lines: usize,
}

fn default_threshold_lines() -> usize { 4 }

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            threshold_lines: default_threshold_lines(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub sort: SortKey,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_size == 0 {
            bail!("pagination.page_size must be at least 1");
        }
        Ok(())
    }
}
