//! Append-only change log of portfolio value snapshots
//!
//! Each block is a timestamped header, the `product;value` lines and a
//! trailing content hash. The hash of the previous block is read back with
//! a tail-read so the no-change check stays O(1) in the size of the log.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

/// Hash of the rendered snapshot lines, concatenated without separators.
pub fn content_hash(lines: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for line in lines {
        hasher.update(line.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Read the last line of the log by scanning backward from EOF.
///
/// A missing or empty log reads as an empty string: the first run has
/// nothing to compare against and always appends.
pub fn last_log_line(path: &Path) -> Result<String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to open change log {:?}", path))
        }
    };

    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(String::new());
    }

    // Walk back from just before the trailing newline until the previous
    // newline; a file with a single line rewinds to the start.
    let mut pos = len.saturating_sub(2);
    let mut byte = [0u8; 1];
    loop {
        file.seek(SeekFrom::Start(pos))?;
        file.read_exact(&mut byte)?;
        if byte[0] == b'\n' {
            break;
        }
        if pos == 0 {
            file.seek(SeekFrom::Start(0))?;
            break;
        }
        pos -= 1;
    }

    let mut line = String::new();
    file.read_to_string(&mut line)?;
    Ok(line.trim().to_string())
}

/// Append a snapshot block unless the log already ends with its hash.
///
/// Returns true when a block was written.
pub fn append_if_changed(path: &Path, lines: &[String]) -> Result<bool> {
    let digest = content_hash(lines);
    let previous = last_log_line(path)?;
    if previous == digest {
        debug!("snapshot unchanged, hash {}", digest);
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open change log {:?} for append", path))?;

    writeln!(
        file,
        "-----{}----------------------------",
        Local::now().format("%y-%m-%d %H:%M:%S")
    )?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    writeln!(file, "{}", digest)?;

    info!("Appended snapshot block to {:?}", path);
    Ok(true)
}
