//! Dashboard controller: owns the user inputs and wires them to the
//! filter, exporter, fetcher and renderer.
//!
//! ## Flow
//!
//! `Dashboard::open()` loads the constituents table once through the
//! [`DashboardContext`] and selects every sector. Inputs are changed with
//! `set_sectors()` / `set_company_count()`. `render()` fetches prices for the
//! whole index on first use, then plots the first N filtered tickers in
//! table order. Charts are rebuilt on every trigger.

pub mod session;

use crate::chart::{PriceChart, render_from};
use crate::config::AppConfig;
use crate::error::DashboardResult;
use crate::export::DownloadLink;
use crate::filter::{SectorSelection, distinct_sectors, filter_by_sector};
use crate::market::{PriceProvider, fetch_series};
use crate::models::{CompanyCount, ConstituentTable, PriceData, RenderRequest, TimeWindow};
use crate::scraper::{IndexSource, load_constituents};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

// ── Context ───────────────────────────────────────────────────────────────────

/// Load-once handles for the index table and the price map. Nothing here is
/// ever invalidated.
pub struct DashboardContext<S, P> {
    source: S,
    provider: Arc<P>,
    config: AppConfig,
    window: TimeWindow,
    table: OnceCell<Arc<ConstituentTable>>,
    prices: OnceCell<PriceData>,
}

impl<S, P> DashboardContext<S, P>
where
    S: IndexSource,
    P: PriceProvider + 'static,
{
    pub fn new(source: S, provider: P, config: AppConfig) -> Self {
        Self {
            source,
            provider: Arc::new(provider),
            config,
            window: TimeWindow::YearToDate,
            table: OnceCell::new(),
            prices: OnceCell::new(),
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The constituents table, scraped on first call.
    pub async fn table(&self) -> DashboardResult<Arc<ConstituentTable>> {
        let table = self
            .table
            .get_or_try_init(|| async {
                load_constituents(&self.source, &self.config.source)
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(table))
    }

    /// Prices for every ticker in the table, fetched on first call.
    pub async fn prices(&self, table: &ConstituentTable) -> &PriceData {
        self.prices
            .get_or_init(|| async {
                let tickers: Vec<String> = table.tickers().map(str::to_string).collect();
                fetch_series(
                    Arc::clone(&self.provider),
                    &tickers,
                    self.window,
                    self.config.market.concurrency,
                )
                .await
            })
            .await
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    Idle,
    Rendering,
}

pub struct Dashboard<S, P> {
    context: DashboardContext<S, P>,
    table: Arc<ConstituentTable>,
    selection: SectorSelection,
    count: CompanyCount,
    state: DashboardState,
}

impl<S, P> Dashboard<S, P>
where
    S: IndexSource,
    P: PriceProvider + 'static,
{
    /// Load the table and start with every sector selected.
    pub async fn open(context: DashboardContext<S, P>) -> DashboardResult<Self> {
        let table = context.table().await?;
        let selection = SectorSelection::all(&table);
        Ok(Self {
            context,
            table,
            selection,
            count: CompanyCount::default(),
            state: DashboardState::Idle,
        })
    }

    pub fn table(&self) -> &ConstituentTable {
        &self.table
    }

    pub fn config(&self) -> &AppConfig {
        self.context.config()
    }

    /// Every sector available for selection.
    pub fn sectors(&self) -> Vec<String> {
        distinct_sectors(&self.table)
    }

    pub fn selection(&self) -> &SectorSelection {
        &self.selection
    }

    pub fn company_count(&self) -> CompanyCount {
        self.count
    }

    pub fn state(&self) -> DashboardState {
        self.state
    }

    /// Replace the sector selection. Unknown labels leave it unchanged.
    pub fn set_sectors<I, T>(&mut self, labels: I) -> DashboardResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.selection = SectorSelection::from_labels(&self.table, labels)?;
        debug!("Selected sectors: {:?}", self.selection.labels());
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selection = SectorSelection::all(&self.table);
    }

    pub fn set_company_count(&mut self, n: u8) -> DashboardResult<()> {
        self.count = CompanyCount::new(n)?;
        Ok(())
    }

    /// Constituents in the selected sectors.
    pub fn filtered(&self) -> ConstituentTable {
        filter_by_sector(&self.table, &self.selection)
    }

    pub fn download_link(&self) -> DashboardResult<DownloadLink> {
        DownloadLink::for_table(&self.filtered())
    }

    /// What the next render trigger will plot, in order.
    pub fn render_requests(&self) -> Vec<RenderRequest> {
        self.filtered()
            .tickers()
            .take(self.count.get())
            .map(|ticker| RenderRequest {
                ticker_symbol: ticker.to_string(),
                max_company_count: self.count,
            })
            .collect()
    }

    /// Render trigger. Tickers without price data are skipped.
    pub async fn render(&mut self) -> Vec<PriceChart> {
        self.state = DashboardState::Rendering;

        let requests = self.render_requests();
        let prices = self.context.prices(&self.table).await;
        let charts: Vec<PriceChart> = requests
            .iter()
            .filter_map(|req| {
                debug!("Plot {} (first {})", req.ticker_symbol, req.max_company_count.get());
                render_from(&req.ticker_symbol, prices)
            })
            .collect();

        info!("Rendered {} of {} requested charts", charts.len(), requests.len());
        self.state = DashboardState::Idle;
        charts
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::market::tests::FakeProvider;
    use crate::scraper::tests::{StaticPage, sample_page};
    use std::sync::atomic::Ordering;

    const SIX: &str = r#"<html><body><table></table><table></table><table>
        <tr><th>Company name</th><th>Symbol</th><th>Sector[9]</th></tr>
        <tr><td>Alpha</td><td>A</td><td>Energy</td></tr>
        <tr><td>Beta</td><td>B</td><td>Energy</td></tr>
        <tr><td>Gamma</td><td>C</td><td>Metals</td></tr>
        <tr><td>Delta</td><td>D</td><td>Energy</td></tr>
        <tr><td>Epsilon</td><td>E</td><td>Metals</td></tr>
        <tr><td>Zeta</td><td>F</td><td>Energy</td></tr>
    </table></body></html>"#;

    pub(crate) async fn open_with(
        page: &'static str,
        priced: &[&str],
    ) -> Dashboard<StaticPage, FakeProvider> {
        let context = DashboardContext::new(
            StaticPage(Some(page)),
            FakeProvider::with(priced),
            AppConfig::default(),
        );
        Dashboard::open(context).await.unwrap()
    }

    fn titles(charts: &[PriceChart]) -> Vec<&str> {
        charts.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_defaults_after_open() {
        let dash = open_with(SIX, &[]).await;
        assert_eq!(dash.sectors(), vec!["Energy", "Metals"]);
        assert_eq!(dash.selection().labels(), dash.sectors().as_slice());
        assert_eq!(dash.company_count().get(), 1);
        assert_eq!(dash.state(), DashboardState::Idle);
        assert_eq!(dash.filtered().len(), 6);
    }

    #[tokio::test]
    async fn test_render_takes_first_n_in_table_order() {
        let all = ["A.NS", "B.NS", "C.NS", "D.NS", "E.NS", "F.NS"];
        let mut dash = open_with(SIX, &all).await;
        dash.set_company_count(3).unwrap();

        let charts = dash.render().await;
        assert_eq!(titles(&charts), vec!["A.NS", "B.NS", "C.NS"]);
        assert_eq!(dash.state(), DashboardState::Idle);
    }

    #[tokio::test]
    async fn test_missing_series_is_skipped_without_error() {
        let mut dash = open_with(SIX, &["A.NS", "C.NS"]).await;
        dash.set_company_count(3).unwrap();

        let charts = dash.render().await;
        assert_eq!(titles(&charts), vec!["A.NS", "C.NS"]);
    }

    #[tokio::test]
    async fn test_rerender_follows_current_inputs_and_fetches_once() {
        let all = ["A.NS", "B.NS", "C.NS", "D.NS", "E.NS", "F.NS"];
        let mut dash = open_with(SIX, &all).await;
        dash.set_company_count(2).unwrap();
        assert_eq!(titles(&dash.render().await), vec!["A.NS", "B.NS"]);

        dash.set_sectors(["Metals"]).unwrap();
        assert_eq!(titles(&dash.render().await), vec!["C.NS", "E.NS"]);

        assert_eq!(dash.context.provider.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_empty_selection_renders_and_exports_nothing() {
        let mut dash = open_with(SIX, &["A.NS"]).await;
        dash.set_sectors(Vec::<String>::new()).unwrap();

        assert!(dash.filtered().is_empty());
        assert!(dash.render_requests().is_empty());
        assert!(dash.render().await.is_empty());
        assert!(dash.download_link().unwrap().data_uri.starts_with("data:text/csv;base64,"));
    }

    #[tokio::test]
    async fn test_invalid_inputs_keep_previous_state() {
        let mut dash = open_with(SIX, &[]).await;
        dash.set_company_count(4).unwrap();
        dash.set_sectors(["Metals"]).unwrap();

        assert!(matches!(dash.set_company_count(9), Err(DashboardError::CompanyCountOutOfRange { .. })));
        assert!(matches!(dash.set_sectors(["Banks"]), Err(DashboardError::UnknownSector(_))));
        assert_eq!(dash.company_count().get(), 4);
        assert_eq!(dash.selection().labels(), ["Metals".to_string()]);

        let reqs = dash.render_requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].max_company_count.get(), 4);
    }

    #[tokio::test]
    async fn test_table_loaded_once_per_context() {
        let context = DashboardContext::new(sample_page(), FakeProvider::default(), AppConfig::default());
        let first = context.table().await.unwrap();
        let second = context.table().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_open_fails_when_source_is_down() {
        let context = DashboardContext::new(StaticPage(None), FakeProvider::default(), AppConfig::default());
        assert!(Dashboard::open(context).await.is_err());
    }
}
