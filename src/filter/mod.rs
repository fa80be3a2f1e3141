//! Sector selection and filtering.

use crate::error::{DashboardError, DashboardResult};
use crate::models::ConstituentTable;

/// Distinct sector labels in order of first appearance.
pub fn distinct_sectors(table: &ConstituentTable) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for row in table.rows() {
        if !seen.contains(&row.sector) {
            seen.push(row.sector.clone());
        }
    }
    seen
}

/// Sectors chosen by the user. Always a subset of the table's sectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectorSelection {
    sectors: Vec<String>,
}

impl SectorSelection {
    /// Every sector present in the table (the default selection).
    pub fn all(table: &ConstituentTable) -> Self {
        Self {
            sectors: distinct_sectors(table),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Build a selection from user labels, rejecting labels the table
    /// does not contain. Duplicates collapse; order follows the table.
    pub fn from_labels<I, S>(table: &ConstituentTable, labels: I) -> DashboardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let available = distinct_sectors(table);
        let mut wanted: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            // An exact label beats a case-insensitive one.
            let known = available
                .iter()
                .find(|s| s.as_str() == label)
                .or_else(|| available.iter().find(|s| s.eq_ignore_ascii_case(label)))
                .ok_or_else(|| DashboardError::UnknownSector(label.to_string()))?;
            wanted.push(known.clone());
        }

        Ok(Self {
            sectors: available.into_iter().filter(|s| wanted.contains(s)).collect(),
        })
    }

    pub fn contains(&self, sector: &str) -> bool {
        self.sectors.iter().any(|s| s == sector)
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.sectors
    }
}

/// Rows whose sector is selected, in table order. The source table is
/// left untouched.
pub fn filter_by_sector(table: &ConstituentTable, selection: &SectorSelection) -> ConstituentTable {
    let rows = table
        .rows()
        .iter()
        .filter(|row| selection.contains(&row.sector))
        .cloned()
        .collect();
    table.with_rows(rows)
}
