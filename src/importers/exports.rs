use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::AuditError;

/// Find the most recent numbered export in a directory.
///
/// The browser numbers repeated downloads as `"<base> (<n>)"`; the highest
/// `<n>` is the newest export. Only plain files are considered and the
/// directory is not scanned recursively.
pub fn latest_export(dir: &Path, base: &str) -> Result<PathBuf> {
    let pattern = Regex::new(&format!(r"{} \((\d+)\)", regex::escape(base)))
        .context("failed to build export filename pattern")?;

    let mut newest: Option<(u64, PathBuf)> = None;
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read export directory {:?}", dir))?;

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(caps) = pattern.captures(&name) else {
            continue;
        };
        // The pattern guarantees digits; very long runs simply never win.
        let Ok(number) = caps[1].parse::<u64>() else {
            continue;
        };
        debug!("export candidate {:?} (number {})", name, number);
        if newest.as_ref().map_or(true, |(best, _)| number > *best) {
            newest = Some((number, entry.path()));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| {
        AuditError::NoExportFound {
            base: base.to_string(),
            dir: dir.display().to_string(),
        }
        .into()
    })
}
