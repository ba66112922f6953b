//! Terminal and JSON rendering of the dividend report
//!
//! Keeps presentation separate from the aggregation in [`crate::dividends`].

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::dividends::DividendReport;

#[derive(Tabled)]
struct DividendRow {
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Total dividend")]
    total: String,
    #[tabled(rename = "Avg/month")]
    avg_per_month: String,
    #[tabled(rename = "% of value")]
    percentage: String,
}

/// Print the dividend report as a table (or JSON with `--json`), followed
/// by the grand total across all products.
pub fn print_dividend_report(report: &DividendReport, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", format_dividend_json(report)?);
        return Ok(());
    }

    if report.products.is_empty() {
        println!(
            "\n{} No dividends found for the selected period.\n",
            "ℹ".blue().bold()
        );
    } else {
        let rows: Vec<DividendRow> = report
            .products
            .iter()
            .map(|p| DividendRow {
                product: p.product.clone(),
                value: format!("{:.2}", p.holding_value),
                total: format!("{:.2}", p.total_eur),
                avg_per_month: format!("{:.2}", p.avg_per_month),
                percentage: format!("{:.2}", p.percentage),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("\n{}", table);
    }

    println!(
        "\n{} Total dividend received: {}",
        "✓".green().bold(),
        format!("{:.2}", report.grand_total).bold()
    );
    Ok(())
}

/// Serialize the report for `--json` output; amounts are rendered as
/// strings to keep their decimal scale intact.
fn format_dividend_json(report: &DividendReport) -> Result<String> {
    #[derive(Serialize)]
    struct JsonProduct {
        product: String,
        holding_value: String,
        total_dividend: String,
        avg_per_month: String,
        percentage: String,
    }

    #[derive(Serialize)]
    struct JsonReport {
        products: Vec<JsonProduct>,
        grand_total: String,
    }

    let products = report
        .products
        .iter()
        .map(|p| JsonProduct {
            product: p.product.clone(),
            holding_value: p.holding_value.to_string(),
            total_dividend: p.total_eur.to_string(),
            avg_per_month: p.avg_per_month.round_dp(2).to_string(),
            percentage: p.percentage.round_dp(2).to_string(),
        })
        .collect();

    let json_report = JsonReport {
        products,
        grand_total: report.grand_total.to_string(),
    };
    Ok(serde_json::to_string_pretty(&json_report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dividends::ProductSummary;
    use rust_decimal_macros::dec;

    #[test]
    fn test_json_report_round_trips() {
        let report = DividendReport {
            products: vec![ProductSummary {
                product: "ACME CORP".to_string(),
                holding_value: dec!(300),
                total_eur: dec!(30),
                avg_per_month: dec!(2.5),
                percentage: dec!(10),
            }],
            grand_total: dec!(30),
        };

        let json = format_dividend_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["grand_total"], "30");
        assert_eq!(value["products"][0]["product"], "ACME CORP");
        assert_eq!(value["products"][0]["percentage"], "10");
    }
}
