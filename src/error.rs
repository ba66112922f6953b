//! Error handling for degiro-audit
//!
//! Defines the typed failure conditions of the reconciliation passes and
//! establishes a unified Result type using anyhow for context chaining.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Typed failure conditions for audit operations.
///
/// The two lookup failures are deliberately distinct: a missing withholding
/// tax row is recovered as a zero amount by the caller, while a missing
/// currency conversion makes the surrounding dividend unreportable.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("no export matching \"{base} (<n>)\" found in {dir}")]
    NoExportFound { base: String, dir: String },

    #[error("no currency conversion within {window} days of {date} matching amount {amount}")]
    NoConversionMatch {
        date: NaiveDate,
        amount: Decimal,
        window: i64,
    },

    #[error("no holding matches dividend product \"{product}\" (join key \"{key}\")")]
    MissingHolding { product: String, key: String },

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for audit operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = AuditError::NoExportFound {
            base: "Portfolio".to_string(),
            dir: "/tmp/downloads".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no export matching \"Portfolio (<n>)\" found in /tmp/downloads"
        );
    }

    #[test]
    fn test_conversion_error_names_the_window() {
        let err = AuditError::NoConversionMatch {
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            amount: dec!(8.50),
            window: 15,
        };
        let msg = err.to_string();
        assert!(msg.contains("15 days"));
        assert!(msg.contains("2024-01-03"));
        assert!(msg.contains("8.50"));
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(anyhow::anyhow!("original error"))
            .context("failed to reconcile dividend");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to reconcile dividend"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
