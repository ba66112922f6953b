//! Dividend reconciliation and aggregation
//!
//! Walks the account ledger, pairs every dividend payout with its
//! withholding tax row and, for foreign-currency payouts, with the currency
//! conversion debit that settled it, then rolls the EUR amounts up per
//! product.

pub mod matcher;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::AuditError;
use crate::importers::LedgerRecord;
use crate::snapshot::HoldingSnapshot;
use crate::utils::strip_dots;

/// Ledger description of a dividend payout, matched exactly.
const DIVIDEND_DESCRIPTION: &str = "Dividend";

/// Description substring of a withholding tax row.
const WITHHOLDING_TAX_DESCRIPTION: &str = "Dividendbelasting";

/// Number of characters of the product name used to join dividend totals
/// against the holding snapshot. The ledger truncates long product names,
/// so the join key is a fixed prefix; two long names sharing a prefix
/// would collide.
pub const HOLDING_JOIN_PREFIX_LEN: usize = 32;

/// A reconciled, EUR-normalized dividend payout.
#[derive(Debug, Clone)]
pub struct DividendRecord {
    pub product: String,
    pub date: NaiveDate,
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    pub eur: Decimal,
}

/// Per-product dividend totals with holding metrics.
#[derive(Debug)]
pub struct ProductSummary {
    pub product: String,
    pub holding_value: Decimal,
    pub total_eur: Decimal,
    pub avg_per_month: Decimal,
    pub percentage: Decimal,
}

/// The full dividend report, products sorted by total EUR descending.
#[derive(Debug)]
pub struct DividendReport {
    pub products: Vec<ProductSummary>,
    pub grand_total: Decimal,
}

/// Reconcile every dividend row of the ledger into a [`DividendRecord`].
///
/// With a year filter, only dates strictly between Jan 1 and Dec 31 of
/// that year qualify; payouts booked exactly on either boundary date are
/// excluded. That mirrors the historical filter behavior and is kept
/// as-is.
///
/// A missing tax row downgrades to zero tax withheld; a missing currency
/// conversion drops the payout from the report entirely (with a stdout
/// diagnostic). The asymmetry is deliberate: without a conversion there is
/// no defensible EUR amount to aggregate.
pub fn collect_dividends(
    ledger: &[LedgerRecord],
    year: Option<i32>,
) -> Result<Vec<DividendRecord>> {
    let bounds = year.map(year_bounds).transpose()?;
    // The first physical row is the export's header text; tax searches
    // skip it.
    let searchable = ledger.get(1..).unwrap_or(&[]);

    let mut records = Vec::new();
    for row in ledger {
        if row.description != DIVIDEND_DESCRIPTION {
            continue;
        }
        let date = row.booking_date().ok_or_else(|| {
            anyhow!("dividend row for {:?} has unparseable date {:?}", row.product, row.date)
        })?;
        if let Some((begin, end)) = bounds {
            if !(date > begin && date < end) {
                continue;
            }
        }

        let gross = row.amount().ok_or_else(|| {
            anyhow!("dividend row for {:?} on {} has unparseable amount {:?}",
                row.product, row.date, row.amount)
        })?;
        let tax = matcher::find_withholding_tax(
            searchable,
            date,
            &row.product,
            WITHHOLDING_TAX_DESCRIPTION,
        )?;
        let net = gross - tax.abs();

        let eur = if row.currency != "EUR" {
            match matcher::find_currency_conversion(ledger, date, net) {
                Ok(eur) => eur,
                Err(e) => {
                    println!("Dropping dividend for \"{}\" on {}: {}", row.product, row.date, e);
                    continue;
                }
            }
        } else {
            net
        };

        debug!("dividend {} on {}: net {} eur {}", row.product, row.date, net, eur);
        records.push(DividendRecord {
            product: strip_dots(&row.product),
            date,
            gross,
            tax,
            net,
            eur,
        });
    }

    info!("Reconciled {} dividend payouts", records.len());
    Ok(records)
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let begin = NaiveDate::from_ymd_opt(year, 1, 1)
        .with_context(|| format!("invalid year {}", year))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .with_context(|| format!("invalid year {}", year))?;
    Ok((begin, end))
}

/// Roll dividend records up per product and derive the holding metrics.
///
/// Products are looked up in the snapshot by the first
/// [`HOLDING_JOIN_PREFIX_LEN`] characters of their name; a dividend with no
/// matching holding is fatal. `today` is injected so the per-month average
/// is testable.
pub fn summarize(
    records: &[DividendRecord],
    holdings: &HoldingSnapshot,
    today: NaiveDate,
) -> Result<DividendReport> {
    // Accumulate in first-seen order so equal totals sort stably.
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for record in records {
        match totals.iter_mut().find(|(name, _)| *name == record.product) {
            Some(entry) => entry.1 += record.eur,
            None => totals.push((record.product.clone(), record.eur)),
        }
    }

    let mut products = Vec::new();
    for (product, total_eur) in totals
        .iter()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .map(|(name, total)| (name.clone(), *total))
    {
        let first_date = records
            .iter()
            .filter(|r| r.product == product)
            .map(|r| r.date)
            .min()
            .ok_or_else(|| anyhow!("no dividend records for product {:?}", product))?;
        // A payout booked today would otherwise divide by zero days.
        let days = (today - first_date).num_days().max(1);
        let avg_per_month = total_eur / Decimal::from(days) * Decimal::from(30);

        let key: String = product.chars().take(HOLDING_JOIN_PREFIX_LEN).collect();
        let holding_value = holdings.get(&key).ok_or_else(|| AuditError::MissingHolding {
            product: product.clone(),
            key: key.clone(),
        })?;
        let percentage = if holding_value.is_zero() {
            Decimal::ZERO
        } else {
            total_eur / holding_value * Decimal::from(100)
        };

        products.push(ProductSummary {
            product,
            holding_value,
            total_eur,
            avg_per_month,
            percentage,
        });
    }

    let grand_total = records.iter().map(|r| r.eur).sum();
    Ok(DividendReport {
        products,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%d-%m-%Y").unwrap()
    }

    fn header_row() -> LedgerRecord {
        LedgerRecord {
            date: "Datum".to_string(),
            product: "Product".to_string(),
            description: "Omschrijving".to_string(),
            ..LedgerRecord::default()
        }
    }

    fn dividend_row(date: &str, product: &str, currency: &str, amount: &str) -> LedgerRecord {
        LedgerRecord {
            date: date.to_string(),
            product: product.to_string(),
            description: "Dividend".to_string(),
            currency: currency.to_string(),
            amount: amount.to_string(),
            ..LedgerRecord::default()
        }
    }

    fn tax_row(date: &str, product: &str, amount: &str) -> LedgerRecord {
        LedgerRecord {
            date: date.to_string(),
            product: product.to_string(),
            description: "Dividendbelasting".to_string(),
            currency: "EUR".to_string(),
            amount: amount.to_string(),
            ..LedgerRecord::default()
        }
    }

    fn conversion_row(date: &str, amount: &str, fx: &str) -> LedgerRecord {
        LedgerRecord {
            date: date.to_string(),
            description: "Valuta Debitering".to_string(),
            amount: amount.to_string(),
            fx: fx.to_string(),
            ..LedgerRecord::default()
        }
    }

    #[test]
    fn test_eur_dividend_nets_out_withholding_tax() {
        let ledger = vec![
            header_row(),
            dividend_row("03-01-2024", "ACME", "EUR", "10.00"),
            tax_row("05-01-2024", "ACME", "-1.50"),
        ];
        let records = collect_dividends(&ledger, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].net, dec!(8.50));
        assert_eq!(records[0].eur, dec!(8.50));
        assert_eq!(records[0].tax, dec!(-1.50));
    }

    #[test]
    fn test_foreign_dividend_normalizes_through_conversion_row() {
        let ledger = vec![
            header_row(),
            dividend_row("03-01-2024", "ACME", "USD", "10.00"),
            tax_row("05-01-2024", "ACME", "-1.50"),
            conversion_row("04-01-2024", "-8.50", "1.10"),
        ];
        let records = collect_dividends(&ledger, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].net, dec!(8.50));
        assert_eq!(records[0].eur.round_dp(3), dec!(7.727));
    }

    #[test]
    fn test_foreign_dividend_without_conversion_is_dropped() {
        let ledger = vec![
            header_row(),
            dividend_row("03-01-2024", "ACME", "USD", "10.00"),
            tax_row("05-01-2024", "ACME", "-1.50"),
            dividend_row("10-02-2024", "OTHER", "EUR", "5.00"),
        ];
        let records = collect_dividends(&ledger, None).unwrap();
        // ACME is gone entirely; the EUR dividend is unaffected.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, "OTHER");
        let total: Decimal = records.iter().map(|r| r.eur).sum();
        assert_eq!(total, dec!(5.00));
    }

    #[test]
    fn test_missing_tax_row_defaults_to_zero() {
        let ledger = vec![
            header_row(),
            dividend_row("03-01-2024", "ACME", "EUR", "10.00"),
        ];
        let records = collect_dividends(&ledger, None).unwrap();
        assert_eq!(records[0].tax, Decimal::ZERO);
        assert_eq!(records[0].net, dec!(10.00));
    }

    #[test]
    fn test_year_filter_bounds_are_strict() {
        let ledger = vec![
            header_row(),
            dividend_row("01-01-2023", "ACME", "EUR", "1.00"),
            dividend_row("02-01-2023", "ACME", "EUR", "2.00"),
            dividend_row("31-12-2023", "ACME", "EUR", "4.00"),
            dividend_row("15-06-2024", "ACME", "EUR", "8.00"),
        ];
        let records = collect_dividends(&ledger, Some(2023)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gross, dec!(2.00));
    }

    #[test]
    fn test_product_name_dots_are_stripped() {
        let ledger = vec![
            header_row(),
            dividend_row("03-01-2024", "3.M CO", "EUR", "10.00"),
        ];
        let records = collect_dividends(&ledger, None).unwrap();
        assert_eq!(records[0].product, "3M CO");
    }

    fn record(product: &str, date_str: &str, eur: Decimal) -> DividendRecord {
        DividendRecord {
            product: product.to_string(),
            date: date(date_str),
            gross: eur,
            tax: Decimal::ZERO,
            net: eur,
            eur,
        }
    }

    #[test]
    fn test_summarize_sorts_by_total_and_computes_metrics() {
        let mut holdings = HoldingSnapshot::new();
        holdings.insert("ACME".to_string(), dec!(300));
        holdings.insert("OTHER".to_string(), dec!(500));

        let records = vec![
            record("OTHER", "15-03-2024", dec!(5)),
            record("ACME", "15-02-2024", dec!(20)),
            record("ACME", "16-03-2024", dec!(10)),
        ];
        let today = date("16-03-2024"); // 30 days after ACME's first payout

        let report = summarize(&records, &holdings, today).unwrap();
        assert_eq!(report.products.len(), 2);
        assert_eq!(report.products[0].product, "ACME");
        assert_eq!(report.products[0].total_eur, dec!(30));
        assert_eq!(report.products[0].avg_per_month, dec!(30));
        assert_eq!(report.products[0].percentage, dec!(10));
        assert_eq!(report.products[1].product, "OTHER");
        assert_eq!(report.products[1].percentage, dec!(1));
        assert_eq!(report.grand_total, dec!(35));
    }

    #[test]
    fn test_summarize_joins_holdings_by_32_char_prefix() {
        let product = "EXTREMELY LONG PRODUCT NAME THAT OVERFLOWS THE KEY";
        let key: String = product.chars().take(HOLDING_JOIN_PREFIX_LEN).collect();

        let mut holdings = HoldingSnapshot::new();
        holdings.insert(key, dec!(100));

        let records = vec![record(product, "15-02-2024", dec!(10))];
        let report = summarize(&records, &holdings, date("16-03-2024")).unwrap();
        assert_eq!(report.products[0].holding_value, dec!(100));
        assert_eq!(report.products[0].percentage, dec!(10));
    }

    #[test]
    fn test_summarize_missing_holding_is_fatal() {
        let holdings = HoldingSnapshot::new();
        let records = vec![record("GHOST", "15-02-2024", dec!(10))];
        let err = summarize(&records, &holdings, date("16-03-2024")).unwrap_err();
        assert!(err.to_string().contains("GHOST"));
    }

    #[test]
    fn test_summarize_same_day_payout_does_not_divide_by_zero() {
        let mut holdings = HoldingSnapshot::new();
        holdings.insert("ACME".to_string(), dec!(100));
        let today = date("15-02-2024");
        let records = vec![record("ACME", "15-02-2024", dec!(1))];
        let report = summarize(&records, &holdings, today).unwrap();
        assert_eq!(report.products[0].avg_per_month, dec!(30));
    }
}
