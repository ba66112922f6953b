// Import module - DeGiro portfolio and account export readers

pub mod account_csv;
mod exports;
pub mod portfolio_csv;

pub use account_csv::LedgerRecord;
pub use exports::latest_export;

/// Base name of the portfolio snapshot export ("Portfolio (N).csv")
pub const PORTFOLIO_EXPORT_BASE: &str = "Portfolio";

/// Base name of the account ledger export ("Account (N).csv")
pub const ACCOUNT_EXPORT_BASE: &str = "Account";

/// Date format used throughout DeGiro exports
pub const EXPORT_DATE_FORMAT: &str = "%d-%m-%Y";
