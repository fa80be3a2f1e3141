//! Draws a [`PriceChart`] with ratatui into an off-screen buffer and turns
//! the buffer into printable text.

use super::{Layer, PriceChart};
use chrono::Datelike;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

const SKY_BLUE: Color = Color::Rgb(135, 206, 235);
const MIN_WIDTH: u16 = 30;
const MIN_HEIGHT: u16 = 8;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Axis bounds: x spans the dates, y spans the closes and every area
/// baseline, with 5% headroom on top.
fn bounds(chart: &PriceChart, xy: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let x_lo = xy.first().map(|p| p.0).unwrap_or(0.0);
    let x_hi = xy.last().map(|p| p.0).unwrap_or(0.0).max(x_lo + 1.0);

    let (lo, hi) = chart.y_range().unwrap_or((0.0, 1.0));
    let y_lo = chart
        .layers
        .iter()
        .filter_map(|l| match l {
            Layer::Area { baseline } => Some(*baseline),
            Layer::Line => None,
        })
        .fold(lo, f64::min);
    let pad = ((hi - y_lo) * 0.05).max(1e-6);

    ([x_lo, x_hi], [y_lo, hi + pad])
}

pub fn draw(chart: &PriceChart, width: u16, height: u16) -> Buffer {
    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(MIN_HEIGHT));
    let mut buf = Buffer::empty(area);

    let xy: Vec<(f64, f64)> = chart
        .points
        .iter()
        .map(|p| (p.date.num_days_from_ce() as f64, p.close))
        .collect();
    let ([x_lo, x_hi], [y_lo, y_hi]) = bounds(chart, &xy);

    let datasets: Vec<Dataset<'_>> = chart
        .layers
        .iter()
        .map(|layer| match layer {
            // Bars drop from each point to zero and read as a filled area
            Layer::Area { .. } => Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(SKY_BLUE).add_modifier(Modifier::DIM))
                .data(&xy),
            Layer::Line => Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SKY_BLUE))
                .data(&xy),
        })
        .collect();

    let date_label = |i: usize| {
        chart
            .points
            .get(i)
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    let last = chart.points.len().saturating_sub(1);
    let x_labels = vec![date_label(0), date_label(last / 2), date_label(last)];
    let y_labels = vec![
        format!("{:.0}", y_lo),
        format!("{:.0}", (y_lo + y_hi) / 2.0),
        format!("{:.0}", y_hi),
    ];

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" {} ", chart.title), bold())),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled(chart.x_label, bold()))
                .bounds([x_lo, x_hi])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(chart.y_label, bold()))
                .bounds([y_lo, y_hi])
                .labels(y_labels),
        )
        .render(area, &mut buf);

    buf
}

/// Buffer cells as lines of text, trailing blanks trimmed.
pub fn to_text(buf: &Buffer) -> String {
    let width = buf.area.width as usize;
    buf.content
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|cell| cell.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render;
    use crate::market::tests::series;

    #[test]
    fn test_drawn_chart_shows_title_and_axis_labels() {
        let chart = render("INFY", Some(&series("INFY.NS", &[1500.0, 1550.0, 1525.0, 1580.0])))
            .unwrap();
        let text = to_text(&draw(&chart, 80, 20));

        assert!(text.contains("INFY.NS"));
        assert!(text.contains("Date"));
        assert!(text.contains("Closing price"));
        assert!(text.contains("2026-01-01"));
        assert_eq!(text.lines().count(), 20);
    }

    #[test]
    fn test_area_baseline_sets_y_floor() {
        let chart = render("TCS", Some(&series("TCS.NS", &[3000.0, 3100.0]))).unwrap();
        let xy = vec![(0.0, 3000.0), (1.0, 3100.0)];
        let (_, [y_lo, y_hi]) = bounds(&chart, &xy);
        assert_eq!(y_lo, 0.0);
        assert!(y_hi > 3100.0);
    }

    #[test]
    fn test_single_point_and_tiny_area_do_not_panic() {
        let chart = render("ITC", Some(&series("ITC.NS", &[420.0]))).unwrap();
        let buf = draw(&chart, 1, 1);
        assert_eq!(buf.area.width, MIN_WIDTH);
        assert!(to_text(&buf).contains("ITC.NS"));
    }
}
