pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::{HttpConfig, SourceConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::models::{ColumnNames, ConstituentTable};
use async_trait::async_trait;
use tracing::{debug, info};

use self::http_client::HttpClient;
use self::parsers::parse_table_at;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable provider of the page holding the index constituents.
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_html(&self) -> DashboardResult<String>;
}

// ── Wikipedia ─────────────────────────────────────────────────────────────────

pub struct WikipediaSource {
    client: HttpClient,
    url: String,
}

impl WikipediaSource {
    pub fn new(source: &SourceConfig, http: &HttpConfig) -> DashboardResult<Self> {
        Ok(Self {
            client: HttpClient::new(http)?,
            url: source.url.clone(),
        })
    }
}

#[async_trait]
impl IndexSource for WikipediaSource {
    async fn fetch_html(&self) -> DashboardResult<String> {
        info!("Fetching index page {}", self.url);
        self.client.get_text(&self.url).await.map_err(|e| match e {
            DashboardError::Http(e) => DashboardError::SourceUnavailable(e.to_string()),
            other => other,
        })
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Fetch the page and turn the configured table into constituents.
pub async fn load_constituents(
    source: &dyn IndexSource,
    config: &SourceConfig,
) -> DashboardResult<ConstituentTable> {
    let html = source.fetch_html().await?;
    let raw = parse_table_at(&html, config.table_index)?;
    debug!("Table #{} headers: {:?}", config.table_index, raw.headers);

    let table = ConstituentTable::from_records(&raw.headers, raw.records, &ColumnNames::from(config))?;
    if table.is_empty() {
        return Err(DashboardError::SourceUnavailable(format!(
            "table #{} has no constituent rows",
            config.table_index
        )));
    }

    info!("Loaded {} constituents", table.len());
    Ok(table)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
