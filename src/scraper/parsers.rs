use crate::error::{DashboardError, DashboardResult};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::cleaner::clean_cell;

/// Header cells plus body records of one HTML table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

fn selector(s: &str) -> DashboardResult<Selector> {
    Selector::parse(s)
        .map_err(|e| DashboardError::SourceUnavailable(format!("selector {s}: {e:?}")))
}

fn cell_text(el: ElementRef<'_>) -> String {
    clean_cell(&el.text().collect::<String>())
}

/// Extract every `<table>` on the page in document order. The first row of
/// each table is treated as its header row.
pub fn parse_tables(html: &str) -> DashboardResult<Vec<RawTable>> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table")?;
    let tr_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let mut tables = Vec::new();
    for table in doc.select(&table_sel) {
        let mut rows = table.select(&tr_sel).map(|tr| {
            tr.select(&cell_sel).map(cell_text).collect::<Vec<String>>()
        });

        let headers = rows.next().unwrap_or_default();
        let records = rows.filter(|r| !r.is_empty()).collect();

        tables.push(RawTable { headers, records });
    }

    debug!("Found {} tables on page", tables.len());
    Ok(tables)
}

/// Pick the table at `index` (zero-based) from the page.
pub fn parse_table_at(html: &str, index: usize) -> DashboardResult<RawTable> {
    let mut tables = parse_tables(html)?;
    let found = tables.len();
    if index >= found {
        return Err(DashboardError::TableNotFound { index, found });
    }
    Ok(tables.swap_remove(index))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PAGE: &str = r#"
        <html><body>
        <table class="infobox"><tr><th>Operator</th><td>NSE</td></tr></table>
        <table><tr><th>Year</th><th>Close</th></tr><tr><td>2024</td><td>21,731</td></tr></table>
        <table class="wikitable sortable">
          <tbody>
            <tr><th>Company name</th><th>Symbol</th><th>Sector<sup>[18]</sup></th><th>Date added</th></tr>
            <tr><td><a href="/wiki/Adani">Adani Ports &amp; SEZ</a></td><td>ADANIPORTS</td><td>Infrastructure</td><td>2015-09-28</td></tr>
            <tr><td>Asian Paints</td><td>ASIANPAINT</td><td>Consumer Durables</td><td>2004-01-01</td></tr>
            <tr><td>Axis Bank</td><td>AXISBANK</td><td>Financial Services</td><td>2003-01-01</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_tables_in_document_order() {
        let tables = parse_tables(PAGE).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[1].headers, vec!["Year", "Close"]);
    }

    #[test]
    fn test_third_table_holds_constituents() {
        let t = parse_table_at(PAGE, 2).unwrap();
        assert_eq!(t.headers, vec!["Company name", "Symbol", "Sector[18]", "Date added"]);
        assert_eq!(t.records.len(), 3);
        assert_eq!(t.records[0][0], "Adani Ports & SEZ");
        assert_eq!(t.records[2][1], "AXISBANK");
    }

    #[test]
    fn test_table_index_out_of_range() {
        let err = parse_table_at(PAGE, 7).unwrap_err();
        assert!(matches!(err, DashboardError::TableNotFound { index: 7, found: 3 }));
    }
}
