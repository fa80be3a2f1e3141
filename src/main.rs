mod chart;
mod config;
mod dashboard;
mod error;
mod export;
mod filter;
mod market;
mod models;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::chart::terminal::{draw, to_text};
use crate::config::AppConfig;
use crate::dashboard::{Dashboard, DashboardContext};
use crate::export::{from_csv, write_csv};
use crate::filter::distinct_sectors;
use crate::market::YahooProvider;
use crate::models::{ColumnNames, TimeWindow};
use crate::scraper::WikipediaSource;

#[derive(Parser)]
#[command(name = "nifty50", about = "NIFTY 50 constituents and closing prices", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// List sectors and how many constituents each has
    Sectors,

    /// Print the constituents of the selected sectors
    Show {
        /// Sector to include; repeat for several (default: all)
        #[arg(short, long = "sector")]
        sectors: Vec<String>,
    },

    /// Write the selected constituents to Nifty50.csv
    Export {
        #[arg(short, long = "sector")]
        sectors: Vec<String>,

        /// Output directory (default from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Also print an HTML download link with the CSV as a data URI
        #[arg(long)]
        link: bool,
    },

    /// Plot year-to-date closing prices of the first N selected companies
    Plot {
        #[arg(short, long = "sector")]
        sectors: Vec<String>,

        /// Number of companies (1-5)
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u8,

        /// First day of a custom window (default: year to date)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day of a custom window
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Print a previously exported CSV without touching the network
    Inspect {
        #[arg(default_value = "Nifty50.csv")]
        path: PathBuf,
    },

    /// Interactive session reading commands from stdin
    Interactive,
}

type LiveDashboard = Dashboard<WikipediaSource, YahooProvider>;

async fn open(config: AppConfig, window: TimeWindow) -> Result<LiveDashboard> {
    let source = WikipediaSource::new(&config.source, &config.http)
        .context("Failed to build index source")?;
    let provider = YahooProvider::new(&config.market, &config.http)
        .context("Failed to build price provider")?;

    let context = DashboardContext::new(source, provider, config).with_window(window);
    let dash = Dashboard::open(context)
        .await
        .context("Failed to load index constituents")?;
    Ok(dash)
}

fn apply_sectors(dash: &mut LiveDashboard, sectors: &[String]) -> Result<()> {
    if !sectors.is_empty() {
        dash.set_sectors(sectors)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "nifty50=info,warn",
        1 => "nifty50=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load()?;

    if let Command::Inspect { path } = &cli.command {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let table = from_csv(&bytes, &ColumnNames::from(&config.source))?;
        println!("{}", utils::fmt_dimensions(&table));
        println!("{}", utils::fmt_table(&table));
        return Ok(());
    }

    let window = match &cli.command {
        Command::Plot { from: Some(start), to: Some(end), .. } => TimeWindow::Range {
            start: *start,
            end: *end,
        },
        _ => TimeWindow::YearToDate,
    };

    let _t = utils::Timer::start("nifty50");
    let mut dash = open(config, window).await?;

    match cli.command {
        Command::Sectors => {
            let table = dash.table();
            for sector in distinct_sectors(table) {
                let n = table.rows().iter().filter(|r| r.sector == sector).count();
                println!("{:>3}  {}", n, sector);
            }
        }

        Command::Show { sectors } => {
            apply_sectors(&mut dash, &sectors)?;
            let filtered = dash.filtered();
            println!("{}", utils::fmt_dimensions(&filtered));
            println!("{}", utils::fmt_table(&filtered));
        }

        Command::Export { sectors, dir, link } => {
            apply_sectors(&mut dash, &sectors)?;
            let dir = dir.unwrap_or_else(|| dash.config().export.dir.clone());
            let path = write_csv(&dash.filtered(), &dir)?;
            println!("Wrote {}", path.display());
            if link {
                println!("{}", dash.download_link()?.to_html());
            }
        }

        Command::Plot { sectors, count, .. } => {
            apply_sectors(&mut dash, &sectors)?;
            dash.set_company_count(count)?;
            let (width, height) = (dash.config().chart.width, dash.config().chart.height);

            let charts = dash.render().await;
            info!("Stock Closing Price: {} chart(s)", charts.len());
            for chart in &charts {
                println!("{}", to_text(&draw(chart, width, height)));
            }
        }

        Command::Inspect { .. } => {}

        Command::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            dashboard::session::run(&mut dash, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
