use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::snapshot::HoldingSnapshot;
use crate::utils::{parse_locale_decimal, strip_dots};

/// Products whose name starts with this marker are the broker's internal
/// cash funds, not holdings.
const CASH_FUND_MARKER: &str = "CASH & CASH FUND & FTX CASH";

#[derive(Debug, Deserialize)]
struct PortfolioRow {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Waarde in EUR")]
    value_eur: String,
}

/// Parse a DeGiro portfolio export into a holding snapshot.
///
/// Rows are processed in file order; a product name appearing twice keeps
/// its last value. Malformed values are fatal, a broken snapshot must not
/// end up in the change log.
pub fn parse_portfolio_csv<P: AsRef<Path>>(file_path: P) -> Result<HoldingSnapshot> {
    let path = file_path.as_ref();
    info!("Parsing portfolio export: {:?}", path);

    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to open portfolio export {:?}", path))?;

    let mut snapshot = HoldingSnapshot::new();
    for (idx, result) in reader.deserialize::<PortfolioRow>().enumerate() {
        let row = result.with_context(|| format!("failed to read portfolio row {}", idx + 2))?;
        if row.product.starts_with(CASH_FUND_MARKER) {
            continue;
        }
        let value = parse_locale_decimal(&row.value_eur).with_context(|| {
            format!("bad value for product {:?} at row {}", row.product, idx + 2)
        })?;
        snapshot.insert(strip_dots(&row.product), value);
    }

    if snapshot.is_empty() {
        warn!("portfolio export {:?} contains no holdings", path);
    }
    info!("Parsed {} holdings", snapshot.len());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_parses_comma_decimals_and_strips_dots() {
        let file = write_csv(
            "Product,Symbool/ISIN,Aantal,Waarde in EUR\n\
             ACME. CORP,US0001,10,\"110,50\"\n",
        );
        let snapshot = parse_portfolio_csv(file.path()).unwrap();
        assert_eq!(snapshot.get("ACME CORP"), Some(dec!(110.50)));
    }

    #[test]
    fn test_skips_cash_fund_rows() {
        let file = write_csv(
            "Product,Symbool/ISIN,Aantal,Waarde in EUR\n\
             CASH & CASH FUND & FTX CASH (EUR),,,\"12,34\"\n\
             ACME CORP,US0001,10,\"110,50\"\n",
        );
        let snapshot = parse_portfolio_csv(file.path()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("ACME CORP").is_some());
    }

    #[test]
    fn test_duplicate_product_last_write_wins() {
        let file = write_csv(
            "Product,Symbool/ISIN,Aantal,Waarde in EUR\n\
             ACME CORP,US0001,10,\"100,00\"\n\
             ACME CORP,US0001,10,\"200,00\"\n",
        );
        let snapshot = parse_portfolio_csv(file.path()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("ACME CORP"), Some(dec!(200.00)));
    }

    #[test]
    fn test_malformed_value_is_fatal() {
        let file = write_csv(
            "Product,Symbool/ISIN,Aantal,Waarde in EUR\n\
             ACME CORP,US0001,10,oops\n",
        );
        assert!(parse_portfolio_csv(file.path()).is_err());
    }
}
