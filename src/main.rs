use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::info;

use degiro_audit::cli::{Cli, Config};
use degiro_audit::importers::{self, ACCOUNT_EXPORT_BASE, PORTFOLIO_EXPORT_BASE};
use degiro_audit::snapshot::{self, HoldingSnapshot};
use degiro_audit::{dividends, reports};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let config = Config::from_cli(&cli)?;

    let holdings = run_portfolio(&config)?;
    run_dividends(&config, &holdings)?;
    Ok(())
}

/// Read the latest portfolio export, write the value report and record the
/// snapshot in the change log when it differs from the previous run.
fn run_portfolio(config: &Config) -> Result<HoldingSnapshot> {
    let path = importers::latest_export(&config.downloads_dir, PORTFOLIO_EXPORT_BASE)?;
    let holdings = importers::portfolio_csv::parse_portfolio_csv(&path)?;

    snapshot::write_report(&holdings, &config.output)?;

    let lines = holdings.render_lines();
    if snapshot::changelog::append_if_changed(&config.log_file, &lines)? {
        info!("portfolio change recorded in {:?}", config.log_file);
    } else {
        info!("portfolio unchanged since last run");
    }

    Ok(holdings)
}

/// Read the latest account export, reconcile dividends and print the
/// per-product report.
fn run_dividends(config: &Config, holdings: &HoldingSnapshot) -> Result<()> {
    let path = importers::latest_export(&config.downloads_dir, ACCOUNT_EXPORT_BASE)?;
    let ledger = importers::account_csv::load_account_csv(&path)?;

    let records = dividends::collect_dividends(&ledger, config.year)?;
    let report = dividends::summarize(&records, holdings, Local::now().date_naive())?;
    reports::print_dividend_report(&report, config.json)
}
