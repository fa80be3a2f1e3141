use crate::config::SourceConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::scraper::cleaner::{header_key, normalise_ticker};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Columns ───────────────────────────────────────────────────────────────────

/// What a source column is used for by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Symbol,
    CompanyName,
    Sector,
    Extra,
}

/// A source column: raw header text (kept verbatim for export), its role and
/// its position in the source row. Headers may repeat; positions do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub header: String,
    pub role: ColumnRole,
    pub position: usize,
}

/// Header names used to locate the columns the dashboard needs.
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub symbol: String,
    pub sector: String,
    pub company_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for ColumnNames {
    fn from(cfg: &SourceConfig) -> Self {
        Self {
            symbol: cfg.symbol_column.clone(),
            sector: cfg.sector_column.clone(),
            company_name: cfg.name_column.clone(),
        }
    }
}

impl ColumnNames {
    fn role_of(&self, header: &str) -> ColumnRole {
        let key = header_key(header);
        if key == header_key(&self.symbol) {
            ColumnRole::Symbol
        } else if key == header_key(&self.sector) {
            ColumnRole::Sector
        } else if key == header_key(&self.company_name) {
            ColumnRole::CompanyName
        } else {
            ColumnRole::Extra
        }
    }
}

// ── Constituents ──────────────────────────────────────────────────────────────

/// One index constituent.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituentRow {
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    /// Passthrough cells keyed by column position.
    pub extra: HashMap<usize, String>,
    ticker_symbol: String,
}

impl ConstituentRow {
    pub fn new(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        sector: impl Into<String>,
        extra: HashMap<usize, String>,
    ) -> Self {
        let symbol = symbol.into();
        let ticker_symbol = normalise_ticker(&symbol);
        Self {
            symbol,
            company_name: company_name.into(),
            sector: sector.into(),
            extra,
            ticker_symbol,
        }
    }

    /// Market-data ticker, always derived from `symbol`.
    pub fn ticker_symbol(&self) -> &str {
        &self.ticker_symbol
    }

    /// Cell value for a column of the owning table.
    pub fn value(&self, column: &Column) -> &str {
        match column.role {
            ColumnRole::Symbol => &self.symbol,
            ColumnRole::CompanyName => &self.company_name,
            ColumnRole::Sector => &self.sector,
            ColumnRole::Extra => self
                .extra
                .get(&column.position)
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

/// Ordered constituents in scrape order. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstituentTable {
    columns: Vec<Column>,
    rows: Vec<ConstituentRow>,
}

impl ConstituentTable {
    /// Build a table from header cells and string records.
    ///
    /// Fails when the symbol or sector column cannot be found. A missing
    /// company-name column is tolerated (names stay empty).
    pub fn from_records(
        headers: &[String],
        records: Vec<Vec<String>>,
        names: &ColumnNames,
    ) -> DashboardResult<Self> {
        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let mut role = names.role_of(header);
            // First match wins; later duplicates are kept as passthrough.
            if role != ColumnRole::Extra && columns.iter().any(|c| c.role == role) {
                role = ColumnRole::Extra;
            }
            columns.push(Column {
                header: header.clone(),
                role,
                position,
            });
        }

        let index_of = |role: ColumnRole| columns.iter().position(|c| c.role == role);
        let symbol_idx = index_of(ColumnRole::Symbol)
            .ok_or_else(|| DashboardError::MissingColumn(names.symbol.clone()))?;
        let sector_idx = index_of(ColumnRole::Sector)
            .ok_or_else(|| DashboardError::MissingColumn(names.sector.clone()))?;
        let name_idx = index_of(ColumnRole::CompanyName);

        let cell = |record: &[String], i: usize| record.get(i).cloned().unwrap_or_default();

        let rows = records
            .into_iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
            .map(|record| {
                let extra = columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.role == ColumnRole::Extra)
                    .map(|(i, _)| (i, cell(&record, i)))
                    .collect();
                ConstituentRow::new(
                    cell(&record, symbol_idx),
                    name_idx.map(|i| cell(&record, i)).unwrap_or_default(),
                    cell(&record, sector_idx),
                    extra,
                )
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[ConstituentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Same columns, different rows. Used for derived views.
    pub fn with_rows(&self, rows: Vec<ConstituentRow>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Ticker symbols in table order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(ConstituentRow::ticker_symbol)
    }
}

// ── Prices ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closing prices for one ticker, in date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fetched series keyed by ticker symbol. Missing tickers have no entry.
pub type PriceData = HashMap<String, PriceSeries>;

/// Trailing window of daily prices to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    YearToDate,
    Range { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    /// Inclusive date bounds of the window as seen on `today`.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            TimeWindow::YearToDate => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (start, today)
            }
            TimeWindow::Range { start, end } => (start, end),
        }
    }
}

// ── User inputs ───────────────────────────────────────────────────────────────

/// How many companies to plot; the slider range is 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyCount(u8);

impl CompanyCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(n: u8) -> DashboardResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(DashboardError::CompanyCountOutOfRange {
                got: n,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for CompanyCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// One plot request created when the render trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub ticker_symbol: String,
    pub max_company_count: CompanyCount,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
