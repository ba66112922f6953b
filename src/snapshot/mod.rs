//! Portfolio snapshot - holdings keyed by product name
//!
//! A snapshot is rebuilt from scratch on every run and only survives the
//! process as the hashed block the change log keeps.

pub mod changelog;

use anyhow::{Context, Result};
use itertools::Itertools;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::utils::format_locale_decimal;

/// Holdings in file order, mapping product name (dots stripped) to EUR value.
///
/// Insertion order is preserved so that equal-valued holdings sort stably,
/// keeping the rendered report and its content hash deterministic. A
/// re-inserted product keeps its original position but takes the new value.
#[derive(Debug, Default)]
pub struct HoldingSnapshot {
    entries: Vec<(String, Decimal)>,
}

impl HoldingSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a holding; a duplicate product name overwrites in place.
    pub fn insert(&mut self, product: String, value: Decimal) {
        match self.entries.iter_mut().find(|(name, _)| *name == product) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((product, value)),
        }
    }

    /// Exact-name lookup. Dividend reporting calls this with the 32-char
    /// join key, so a holding is only found when its full name equals it.
    pub fn get(&self, product: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == product)
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Holdings sorted by value descending, ties in insertion order.
    pub fn sorted_by_value_desc(&self) -> Vec<(&str, Decimal)> {
        self.entries
            .iter()
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .map(|(name, value)| (name.as_str(), *value))
            .collect()
    }

    /// The `product;value` lines of the report, value rendered with a
    /// comma decimal separator. Same ordering as the written report; the
    /// change log hashes exactly these lines.
    pub fn render_lines(&self) -> Vec<String> {
        self.sorted_by_value_desc()
            .into_iter()
            .map(|(name, value)| format!("{};{}", name, format_locale_decimal(value)))
            .collect()
    }
}

/// Write the snapshot report: a `product;value` header followed by one
/// line per holding, sorted by value descending.
pub fn write_report(snapshot: &HoldingSnapshot, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create report file {:?}", path))?;
    writeln!(file, "product;value")?;
    for line in snapshot.render_lines() {
        writeln!(file, "{}", line)?;
    }
    info!("Wrote {} holdings to {:?}", snapshot.len(), path);
    Ok(())
}
