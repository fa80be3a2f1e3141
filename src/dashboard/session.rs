//! Line-oriented interactive session driving one [`Dashboard`].

use super::Dashboard;
use crate::chart::terminal::{draw, to_text};
use crate::export::write_csv;
use crate::market::PriceProvider;
use crate::scraper::IndexSource;
use crate::utils::{fmt_dimensions, fmt_table};
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const HELP: &str = "\
commands:
  sectors                 list sectors and the current selection
  status                  current inputs
  select <a>|<b>|...      choose sectors (`all` or `none` also work)
  count <1-5>             number of companies to plot
  show                    print the filtered table
  render                  plot closing prices
  export [dir]            write Nifty50.csv
  link                    print the CSV download link
  help                    this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sectors,
    Status,
    Select(Vec<String>),
    SelectAll,
    Count(u8),
    Show,
    Render,
    Export(Option<PathBuf>),
    Link,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let cmd = match word.to_lowercase().as_str() {
            "sectors" => Command::Sectors,
            "status" => Command::Status,
            "select" => match rest.to_lowercase().as_str() {
                "all" => Command::SelectAll,
                "none" | "" => Command::Select(vec![]),
                _ => Command::Select(
                    rest.split('|')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
            },
            "count" => Command::Count(
                rest.parse()
                    .map_err(|_| format!("count expects a number, got `{rest}`"))?,
            ),
            "show" => Command::Show,
            "render" | "plot" => Command::Render,
            "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "link" => Command::Link,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command `{other}` (try `help`)")),
        };
        Ok(Some(cmd))
    }
}

/// Read commands until `quit` or end of input. Input errors are reported
/// and the session carries on.
pub async fn run<S, P, R, W>(dash: &mut Dashboard<S, P>, input: R, out: &mut W) -> Result<()>
where
    S: IndexSource,
    P: PriceProvider + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{} constituents loaded. Type `help` for commands.", dash.table().len())?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "error: {msg}")?;
                continue;
            }
        };
        debug!("Session command: {:?}", cmd);

        match cmd {
            Command::Quit => break,
            cmd => {
                if let Err(e) = apply(dash, cmd, out).await {
                    writeln!(out, "error: {e:#}")?;
                }
            }
        }
    }
    Ok(())
}

async fn apply<S, P, W>(dash: &mut Dashboard<S, P>, cmd: Command, out: &mut W) -> Result<()>
where
    S: IndexSource,
    P: PriceProvider + 'static,
    W: Write,
{
    match cmd {
        Command::Sectors => {
            for sector in dash.sectors() {
                let mark = if dash.selection().contains(&sector) { "x" } else { " " };
                writeln!(out, "[{mark}] {sector}")?;
            }
        }
        Command::Status => {
            let selection = dash.selection();
            if selection.is_empty() {
                writeln!(out, "Sectors: none")?;
            } else {
                writeln!(out, "Sectors: {}", selection.labels().join(" | "))?;
            }
            writeln!(out, "Number of companies: {}", dash.company_count().get())?;
            writeln!(out, "State: {:?}", dash.state())?;
        }
        Command::Select(labels) => {
            dash.set_sectors(&labels)?;
            writeln!(out, "{}", fmt_dimensions(&dash.filtered()))?;
        }
        Command::SelectAll => {
            dash.select_all();
            writeln!(out, "{}", fmt_dimensions(&dash.filtered()))?;
        }
        Command::Count(n) => {
            dash.set_company_count(n)?;
            writeln!(out, "Number of companies: {n}")?;
        }
        Command::Show => {
            let filtered = dash.filtered();
            writeln!(out, "{}", fmt_dimensions(&filtered))?;
            writeln!(out, "{}", fmt_table(&filtered))?;
        }
        Command::Render => {
            let (width, height) = (dash.config().chart.width, dash.config().chart.height);
            let charts = dash.render().await;
            if charts.is_empty() {
                writeln!(out, "No charts to show.")?;
            }
            for chart in &charts {
                writeln!(out, "{}", to_text(&draw(chart, width, height)))?;
            }
        }
        Command::Export(dir) => {
            let dir = dir.unwrap_or_else(|| dash.config().export.dir.clone());
            let path = write_csv(&dash.filtered(), &dir)?;
            writeln!(out, "Wrote {}", path.display())?;
        }
        Command::Link => writeln!(out, "{}", dash.download_link()?.to_html())?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}
