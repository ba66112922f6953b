use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use super::EXPORT_DATE_FORMAT;

/// One row of the account ledger export.
///
/// The export carries a header line but the columns are fixed, so the file
/// is read headerless and the header text becomes the first record; the
/// dividend pass relies on that when it hands searches the ledger minus its
/// first row. Fields stay raw strings: one search path must skip rows whose
/// date does not parse while another treats the same condition as fatal, so
/// parsing happens at the call site, not at load time.
#[derive(Debug, Clone, Default)]
pub struct LedgerRecord {
    pub date: String,
    pub time: String,
    pub value_date: String,
    pub product: String,
    pub isin: String,
    pub description: String,
    pub fx: String,
    pub currency: String,
    pub amount: String,
    pub balance_currency: String,
    pub balance: String,
    pub order_id: String,
}

impl LedgerRecord {
    fn from_record(record: &csv::StringRecord) -> Self {
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        Self {
            date: field(0),
            time: field(1),
            value_date: field(2),
            product: field(3),
            isin: field(4),
            description: field(5),
            fx: field(6),
            currency: field(7),
            amount: field(8),
            balance_currency: field(9),
            balance: field(10),
            order_id: field(11),
        }
    }

    /// Booking date in the export's `%d-%m-%Y` format, None when malformed.
    pub fn booking_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, EXPORT_DATE_FORMAT).ok()
    }

    /// Transaction amount in the transaction currency, None when malformed
    /// or empty. Ledger amounts use a plain dot decimal separator.
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.trim()).ok()
    }

    /// Exchange rate of a currency conversion row, None when absent.
    pub fn fx_rate(&self) -> Option<Decimal> {
        Decimal::from_str(self.fx.trim()).ok()
    }
}

/// Load the full account ledger, preserving file order.
pub fn load_account_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<LedgerRecord>> {
    let path = file_path.as_ref();
    info!("Loading account ledger: {:?}", path);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // short rows read as empty trailing fields
        .from_path(path)
        .with_context(|| format!("failed to open account export {:?}", path))?;

    let mut ledger = Vec::new();
    for result in reader.records() {
        let record = result.context("failed to read account ledger record")?;
        ledger.push(LedgerRecord::from_record(&record));
    }

    info!("Loaded {} ledger records", ledger.len());
    Ok(ledger)
}
