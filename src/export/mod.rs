//! CSV export of the (filtered) constituents table and the data-URI
//! download link offered for it.

use crate::error::{DashboardError, DashboardResult};
use crate::models::{ColumnNames, ConstituentTable};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FILE_NAME: &str = "Nifty50.csv";
pub const MIME_TYPE: &str = "text/csv";
/// Header of the derived ticker column appended after the source columns.
pub const TICKER_COLUMN: &str = "Yahoo_Symbol";

/// Serialize a table: source headers in order plus the ticker column, then
/// one record per row. Same table, same bytes.
pub fn to_csv(table: &ConstituentTable) -> DashboardResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = table.columns().iter().map(|c| c.header.as_str()).collect();
    header.push(TICKER_COLUMN);
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record: Vec<&str> = table.columns().iter().map(|c| row.value(c)).collect();
        record.push(row.ticker_symbol());
        wtr.write_record(&record)?;
    }

    wtr.into_inner()
        .map_err(|e| DashboardError::Csv(e.into_error().into()))
}

/// Parse an export back into a table. The ticker column is recomputed
/// from the symbol rather than trusted.
pub fn from_csv(bytes: &[u8], names: &ColumnNames) -> DashboardResult<ConstituentTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let skip = headers.iter().position(|h| h == TICKER_COLUMN);
    let keep = |i: usize| Some(i) != skip;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(*i))
        .map(|(_, h)| h.to_string())
        .collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        records.push(
            record
                .iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, v)| v.to_string())
                .collect(),
        );
    }

    ConstituentTable::from_records(&columns, records, names)
}

/// Write the export as `Nifty50.csv` inside `dir`.
pub fn write_csv(table: &ConstituentTable, dir: &Path) -> DashboardResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(FILE_NAME);
    std::fs::write(&path, to_csv(table)?)?;
    info!("Wrote {} rows to {:?}", table.len(), path);
    Ok(path)
}

/// A downloadable CSV payload wrapped in a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub file_name: String,
    pub mime_type: String,
    pub data_uri: String,
}

impl DownloadLink {
    pub fn for_table(table: &ConstituentTable) -> DashboardResult<Self> {
        let payload = STANDARD.encode(to_csv(table)?);
        Ok(Self {
            file_name: FILE_NAME.to_string(),
            mime_type: MIME_TYPE.to_string(),
            data_uri: format!("data:{MIME_TYPE};base64,{payload}"),
        })
    }

    /// HTML anchor offering the payload as a file download.
    pub fn to_html(&self) -> String {
        format!(
            r#"<a href="{}" download="{}">Download CSV File</a>"#,
            self.data_uri, self.file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SectorSelection, filter_by_sector};
    use crate::models::tests::sample_table;

    #[test]
    fn test_header_row_and_ticker_column() {
        let csv = String::from_utf8(to_csv(&sample_table()).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Company name,Symbol,Sector[18],Date added,Yahoo_Symbol")
        );
        assert_eq!(
            lines.next(),
            Some("Adani Ports,ADANIPORTS,Infrastructure,2015-09-28,ADANIPORTS.NS")
        );
        assert_eq!(lines.count(), 5);
    }

    #[test]
    fn test_round_trip_recovers_rows() {
        let table = sample_table();
        let parsed = from_csv(&to_csv(&table).unwrap(), &ColumnNames::default()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_quoting_of_delimiters_survives_round_trip() {
        let headers = vec!["Company name".to_string(), "Symbol".to_string(), "Sector".to_string()];
        let records = vec![vec![
            "Mahindra, \"M&M\"".to_string(),
            "M&M".to_string(),
            "Automobile".to_string(),
        ]];
        let table =
            ConstituentTable::from_records(&headers, records, &ColumnNames::default()).unwrap();
        let bytes = to_csv(&table).unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains(r#""Mahindra, ""M&M""""#));
        assert_eq!(from_csv(&bytes, &ColumnNames::default()).unwrap(), table);
    }

    #[test]
    fn test_repeated_headers_export_every_cell() {
        let headers: Vec<String> = ["Symbol", "Sector", "Note", "Note"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let records = vec![vec![
            "A".to_string(),
            "X".to_string(),
            "n1".to_string(),
            "n2".to_string(),
        ]];
        let table =
            ConstituentTable::from_records(&headers, records, &ColumnNames::default()).unwrap();
        let csv = String::from_utf8(to_csv(&table).unwrap()).unwrap();
        assert_eq!(csv, "Symbol,Sector,Note,Note,Yahoo_Symbol\nA,X,n1,n2,A.NS\n");
        assert_eq!(from_csv(csv.as_bytes(), &ColumnNames::default()).unwrap(), table);
    }

    #[test]
    fn test_export_is_deterministic() {
        let table = sample_table();
        assert_eq!(to_csv(&table).unwrap(), to_csv(&table).unwrap());
    }

    #[test]
    fn test_empty_selection_exports_header_only() {
        let table = filter_by_sector(&sample_table(), &SectorSelection::none());
        let csv = String::from_utf8(to_csv(&table).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_download_link_decodes_to_csv() {
        let table = sample_table();
        let link = DownloadLink::for_table(&table).unwrap();
        assert_eq!(link.file_name, "Nifty50.csv");

        let payload = link.data_uri.strip_prefix("data:text/csv;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), to_csv(&table).unwrap());
        assert!(link.to_html().ends_with(r#"download="Nifty50.csv">Download CSV File</a>"#));
    }

    #[test]
    fn test_write_csv_creates_file() {
        let dir = std::env::temp_dir().join(format!("nifty50-export-{}", std::process::id()));
        let path = write_csv(&sample_table(), &dir).unwrap();
        assert_eq!(path.file_name().unwrap(), FILE_NAME);
        assert_eq!(std::fs::read(&path).unwrap(), to_csv(&sample_table()).unwrap());
        std::fs::remove_dir_all(&dir).ok();
    }
}
