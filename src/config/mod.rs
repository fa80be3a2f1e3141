use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Where the index constituents table is scraped from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Zero-based position of the constituents table among all page tables.
    #[serde(default = "default_table_index")]
    pub table_index: usize,

    #[serde(default = "default_symbol_column")]
    pub symbol_column: String,

    #[serde(default = "default_sector_column")]
    pub sector_column: String,

    #[serde(default = "default_name_column")]
    pub name_column: String,
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Market data provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    #[serde(default = "default_chart_url")]
    pub chart_url: String,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

/// Terminal chart size in character cells
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u16,

    #[serde(default = "default_chart_height")]
    pub height: u16,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_source_url() -> String {
    "https://en.wikipedia.org/wiki/NIFTY_50".to_string()
}
fn default_table_index() -> usize {
    2
}
fn default_symbol_column() -> String {
    "Symbol".to_string()
}
fn default_sector_column() -> String {
    "Sector".to_string()
}
fn default_name_column() -> String {
    "Company name".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    250
}
fn default_jitter_ms() -> u64 {
    250
}
fn default_max_retries() -> u32 {
    2
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) nifty50-dashboard/0.1".to_string()
}
fn default_chart_url() -> String {
    "https://query2.finance.yahoo.com/v8/finance/chart".to_string()
}
fn default_concurrency() -> usize {
    4
}
fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_chart_width() -> u16 {
    100
}
fn default_chart_height() -> u16 {
    24
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            table_index: default_table_index(),
            symbol_column: default_symbol_column(),
            sector_column: default_sector_column(),
            name_column: default_name_column(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            jitter_ms: default_jitter_ms(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chart_url: default_chart_url(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_export_dir() }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            http: HttpConfig::default(),
            market: MarketConfig::default(),
            export: ExportConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("NIFTY").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_third_wikipedia_table() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.source.table_index, 2);
        assert!(cfg.source.url.ends_with("NIFTY_50"));
        assert_eq!(cfg.market.concurrency, 4);
    }

    #[test]
    fn test_partial_sources_fill_in_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .set_override("source.table_index", 1)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.source.table_index, 1);
        assert_eq!(cfg.source.symbol_column, "Symbol");
        assert_eq!(cfg.chart.height, 24);
    }
}
