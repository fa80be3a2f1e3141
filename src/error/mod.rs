use thiserror::Error;

/// Errors surfaced by the dashboard core.
///
/// A ticker without price data is deliberately not represented here: it is
/// simply absent from the fetched price map.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("index source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("expected table #{index} on the page, found only {found} table(s)")]
    TableNotFound { index: usize, found: usize },

    #[error("required column `{0}` not found in index table")]
    MissingColumn(String),

    #[error("unknown sector `{0}`")]
    UnknownSector(String),

    #[error("company count must be between {min} and {max}, got {got}")]
    CompanyCountOutOfRange { got: u8, min: u8, max: u8 },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
