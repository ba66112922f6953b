//! Utility functions for locale-formatted numbers and product names
//!
//! DeGiro exports render decimals with a comma separator ("110,50") and use
//! literal dots inside product names as thousands separators. These helpers
//! centralize the conversions so parsing and re-rendering stay symmetric.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a comma-decimal number ("1234,56") into a Decimal.
///
/// Only the decimal separator is translated; the portfolio export does not
/// carry thousands separators in numeric columns.
pub fn parse_locale_decimal(text: &str) -> Result<Decimal> {
    let cleaned = text.trim().replace(',', ".");
    Decimal::from_str(&cleaned)
        .with_context(|| format!("failed to parse decimal from {:?}", text))
}

/// Render a Decimal back into the comma-decimal form used by the report
/// file and the change log ("110.5" -> "110,5").
pub fn format_locale_decimal(value: Decimal) -> String {
    value.to_string().replace('.', ",")
}

/// Strip the literal dots DeGiro uses as thousands separators in product
/// names ("3.M CO" -> "3M CO").
pub fn strip_dots(product: &str) -> String {
    product.replace('.', "")
}
