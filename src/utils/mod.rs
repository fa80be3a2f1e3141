use crate::export::TICKER_COLUMN;
use crate::models::ConstituentTable;
use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

/// "Data Dimension: 12 rows and 5 columns." The ticker column counts.
pub fn fmt_dimensions(table: &ConstituentTable) -> String {
    format!(
        "Data Dimension: {} rows and {} columns.",
        table.len(),
        table.columns().len() + 1
    )
}

/// Plain-text grid of the table with the ticker column last.
pub fn fmt_table(table: &ConstituentTable) -> String {
    let mut grid: Vec<Vec<&str>> = Vec::with_capacity(table.len() + 1);

    let mut header: Vec<&str> = table.columns().iter().map(|c| c.header.as_str()).collect();
    header.push(TICKER_COLUMN);
    grid.push(header);

    for row in table.rows() {
        let mut cells: Vec<&str> = table.columns().iter().map(|c| row.value(c)).collect();
        cells.push(row.ticker_symbol());
        grid.push(cells);
    }

    let mut widths = vec![0usize; grid[0].len()];
    for line in &grid {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    grid.iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
