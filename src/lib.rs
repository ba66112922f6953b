//! Degiro Audit - DeGiro broker export auditor
//!
//! This library reads a DeGiro portfolio snapshot and account ledger export,
//! reconciles dividend payouts with their withholding tax and currency
//! conversion transactions, and maintains an append-only change log of
//! portfolio value snapshots.

pub mod cli;
pub mod dividends;
pub mod error;
pub mod importers;
pub mod reports;
pub mod snapshot;
pub mod utils;
