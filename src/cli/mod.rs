use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "degiro-audit")]
#[command(
    version,
    about = "DeGiro broker export auditor with dividend reconciliation"
)]
#[command(
    long_about = "Parse the latest DeGiro portfolio and account exports, reconcile dividend payouts with their withholding tax and currency conversion transactions, and keep an append-only change log of portfolio value snapshots."
)]
pub struct Cli {
    /// Output filename for the portfolio report
    #[arg(short, long, default_value = "out.csv")]
    pub output: PathBuf,

    /// Only count dividends booked in this year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Directory holding the broker exports (default: $HOME/Downloads)
    #[arg(long)]
    pub downloads_dir: Option<PathBuf>,

    /// Append-only change log of portfolio value snapshots
    #[arg(long, default_value = "portfolio.log")]
    pub log_file: PathBuf,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Output the dividend report in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

/// Resolved runtime configuration, passed explicitly into each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub downloads_dir: PathBuf,
    pub output: PathBuf,
    pub log_file: PathBuf,
    pub year: Option<i32>,
    pub json: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let downloads_dir = match &cli.downloads_dir {
            Some(dir) => dir.clone(),
            None => default_downloads_dir()?,
        };
        Ok(Self {
            downloads_dir,
            output: cli.output.clone(),
            log_file: cli.log_file.clone(),
            year: cli.year,
            json: cli.json,
        })
    }
}

fn default_downloads_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join("Downloads"))
}
