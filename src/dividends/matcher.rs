//! Fuzzy transaction matching
//!
//! The ledger carries no transaction IDs, so a dividend's withholding tax
//! and currency conversion are found by date windows and amount tolerance.
//! Both searches are first-hit-in-ledger-order; there is no best-match
//! scoring.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::AuditError;
use crate::importers::{LedgerRecord, EXPORT_DATE_FORMAT};

/// A withholding tax row must book within this many days of the dividend.
pub const TAX_WINDOW_DAYS: i64 = 5;

/// A conversion row may settle considerably later than the dividend.
pub const CONVERSION_WINDOW_DAYS: i64 = 15;

/// Description marker of a currency conversion debit, matched
/// case-insensitively anywhere in the description.
const CONVERSION_MARKER: &str = "valuta debitering";

fn amount_tolerance() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

/// Find the amount of the first ledger row within [`TAX_WINDOW_DAYS`] of
/// `target_date` whose product matches exactly and whose description
/// contains `needle`.
///
/// Rows with an unparseable date are skipped silently. Absence is not an
/// error: a diagnostic goes to stdout and the amount defaults to zero,
/// meaning no tax was withheld. Callers pass the ledger minus its first
/// row, which is the export's header text.
pub fn find_withholding_tax(
    ledger: &[LedgerRecord],
    target_date: NaiveDate,
    product: &str,
    needle: &str,
) -> Result<Decimal> {
    for row in ledger {
        let Some(date) = row.booking_date() else {
            continue;
        };
        if (date - target_date).num_days().abs() < TAX_WINDOW_DAYS
            && row.product == product
            && row.description.contains(needle)
        {
            debug!("matched tax row dated {} for {}", row.date, product);
            return row.amount().ok_or_else(|| {
                anyhow!(
                    "tax row for {:?} on {} has unparseable amount {:?}",
                    product,
                    row.date,
                    row.amount
                )
            });
        }
    }

    println!(
        "No {} found for \"{}\" on {}",
        needle.to_lowercase(),
        product,
        target_date.format(EXPORT_DATE_FORMAT)
    );
    Ok(Decimal::ZERO)
}

/// Find the EUR value of the currency conversion matching a foreign
/// dividend: the first `valuta debitering` row whose absolute amount is
/// within 0.0001 of `amount` and whose date is within
/// [`CONVERSION_WINDOW_DAYS`] of `target_date`.
///
/// Returns `(1 / fx) * |amount|` of the matched row. Unlike the tax
/// search, absence here is a hard failure: a foreign dividend without a
/// conversion cannot be normalized to EUR. Rows whose date, amount or FX
/// rate do not parse are never candidates.
pub fn find_currency_conversion(
    ledger: &[LedgerRecord],
    target_date: NaiveDate,
    amount: Decimal,
) -> Result<Decimal, AuditError> {
    for row in ledger {
        if !row.description.to_lowercase().contains(CONVERSION_MARKER) {
            continue;
        }
        let (Some(date), Some(row_amount), Some(fx)) =
            (row.booking_date(), row.amount(), row.fx_rate())
        else {
            continue;
        };
        if fx.is_zero() {
            continue;
        }
        if (row_amount.abs() - amount).abs() < amount_tolerance()
            && (date - target_date).num_days().abs() < CONVERSION_WINDOW_DAYS
        {
            debug!("matched conversion row dated {} (fx {})", row.date, fx);
            return Ok(Decimal::ONE / fx * row_amount.abs());
        }
    }

    Err(AuditError::NoConversionMatch {
        date: target_date,
        amount,
        window: CONVERSION_WINDOW_DAYS,
    })
}
