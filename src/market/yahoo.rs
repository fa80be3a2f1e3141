//! Yahoo Finance v8 chart API provider.
//!
//! One request per ticker. Prices are split/dividend adjusted: `adjclose`
//! is used when Yahoo returns it, raw `close` otherwise.

use super::PriceProvider;
use crate::config::{HttpConfig, MarketConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::models::{PricePoint, PriceSeries, TimeWindow};
use crate::scraper::http_client::HttpClient;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooProvider {
    client: HttpClient,
    base_url: String,
}

impl YahooProvider {
    pub fn new(market: &MarketConfig, http: &HttpConfig) -> DashboardResult<Self> {
        Ok(Self {
            client: HttpClient::new(http)?,
            base_url: market.chart_url.trim_end_matches('/').to_string(),
        })
    }

    /// Chart URL for a ticker. Year-to-date uses Yahoo's own `ytd` range so
    /// the window follows the exchange calendar.
    fn chart_url(&self, ticker: &str, window: TimeWindow) -> DashboardResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, ticker))
            .map_err(|e| DashboardError::SourceUnavailable(format!("bad chart url: {e}")))?;
        {
            let mut q = url.query_pairs_mut();
            match window {
                TimeWindow::YearToDate => {
                    q.append_pair("range", "ytd");
                }
                TimeWindow::Range { start, end } => {
                    q.append_pair("period1", &day_start(start).to_string());
                    q.append_pair("period2", &day_end(end).to_string());
                }
            }
            q.append_pair("interval", "1d");
            q.append_pair("includePrePost", "true");
            q.append_pair("includeAdjustedClose", "true");
        }
        Ok(url)
    }
}

fn day_start(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp()).unwrap_or_default()
}

fn day_end(d: NaiveDate) -> i64 {
    d.and_hms_opt(23, 59, 59).map(|t| t.and_utc().timestamp()).unwrap_or_default()
}

/// Turn a chart payload into a series. `None` when Yahoo reports the symbol
/// unknown or returns no usable closes.
fn parse_chart(ticker: &str, body: &str) -> DashboardResult<Option<PriceSeries>> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DashboardError::SourceUnavailable(format!("unexpected chart payload for {ticker}: {e}"))
    })?;

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        if let Some(err) = resp.chart.error {
            debug!("{}: {} ({})", ticker, err.code, err.description);
        }
        return Ok(None);
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data.indicators.quote.into_iter().next().map(|q| q.close);
    let adjusted = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);

    let points: Vec<PricePoint> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            let adj = adjusted.as_ref().and_then(|v| v.get(i).copied().flatten());
            let raw = closes.as_ref().and_then(|v| v.get(i).copied().flatten());
            // Holidays come back as all-null rows
            let close = adj.or(raw)?;
            Some(PricePoint { date, close })
        })
        .collect();

    if points.is_empty() {
        return Ok(None);
    }
    Ok(Some(PriceSeries::new(ticker, points)))
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch_one(
        &self,
        ticker: &str,
        window: TimeWindow,
    ) -> DashboardResult<Option<PriceSeries>> {
        let url = self.chart_url(ticker, window)?;
        let fetched = self.client.get(url.as_str()).await?;

        if fetched.status == StatusCode::NOT_FOUND {
            return parse_chart(ticker, &fetched.body).or(Ok(None));
        }
        if !fetched.status.is_success() {
            return Err(DashboardError::SourceUnavailable(format!(
                "HTTP {} for {}",
                fetched.status, ticker
            )));
        }
        parse_chart(ticker, &fetched.body)
    }
}
