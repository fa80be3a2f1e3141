//! Closing-price charts.
//!
//! `render` builds a backend-neutral [`PriceChart`]; [`terminal`] draws it.

pub mod terminal;

use crate::models::{PriceData, PricePoint, PriceSeries};
use crate::scraper::cleaner::normalise_ticker;
use tracing::debug;

pub const X_LABEL: &str = "Date";
pub const Y_LABEL: &str = "Closing price";

/// One drawing pass over the chart's series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer {
    /// Area between the series and a horizontal baseline.
    Area { baseline: f64 },
    /// Outline through the points.
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<PricePoint>,
    pub layers: Vec<Layer>,
}

impl PriceChart {
    /// (min, max) closing price.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut it = self.points.iter().map(|p| p.close);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Chart for one ticker, or `None` when there is nothing to plot.
pub fn render(ticker: &str, series: Option<&PriceSeries>) -> Option<PriceChart> {
    let ticker = normalise_ticker(ticker);
    let Some(series) = series.filter(|s| !s.is_empty()) else {
        debug!("{}: no series, skipping plot", ticker);
        return None;
    };

    Some(PriceChart {
        title: ticker,
        x_label: X_LABEL,
        y_label: Y_LABEL,
        points: series.points.clone(),
        layers: vec![Layer::Area { baseline: 0.0 }, Layer::Line],
    })
}

/// Look the ticker up (after normalising it) and render it.
pub fn render_from(ticker: &str, data: &PriceData) -> Option<PriceChart> {
    render(ticker, data.get(&normalise_ticker(ticker)))
}
