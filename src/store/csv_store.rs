//! CSV persistence for bar stores and returns views
//!
//! One bars file and one returns file per symbol, header row first,
//! fixed column order. Saves are full rewrites through a temp file with an
//! atomic rename, so a partially written store is never observed.

use super::{Bar, Return, StoreError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-symbol CSV bar store rooted at a data directory
#[derive(Debug, Clone)]
pub struct CsvBarStore {
    data_dir: PathBuf,
}

impl CsvBarStore {
    /// Create a store rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory of the store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to a symbol's bars file: `{data_dir}/{SYMBOL}_1Day.csv`
    pub fn bars_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_1Day.csv"))
    }

    /// Path to a symbol's returns file: `{data_dir}/{SYMBOL}_1Day_returns_only.csv`
    pub fn returns_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}_1Day_returns_only.csv"))
    }

    /// Whether a bars file exists for the symbol
    pub fn has_bars(&self, symbol: &str) -> bool {
        self.bars_path(symbol).exists()
    }

    /// Load all bars for a symbol, in file order
    pub fn load_bars(&self, symbol: &str) -> Result<Vec<Bar>, StoreError> {
        read_rows(&self.bars_path(symbol))
    }

    /// Timestamp of the newest stored bar, `None` when the file is absent
    /// or empty
    pub fn last_timestamp(&self, symbol: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        if !self.has_bars(symbol) {
            return Ok(None);
        }
        let bars = self.load_bars(symbol)?;
        Ok(bars.iter().map(|b| b.ts).max())
    }

    /// Persist the full bar store for a symbol, replacing any prior file
    pub fn save_bars(&self, symbol: &str, bars: &[Bar]) -> Result<(), StoreError> {
        write_rows(&self.bars_path(symbol), bars)
    }

    /// Load the returns view for a symbol
    pub fn load_returns(&self, symbol: &str) -> Result<Vec<Return>, StoreError> {
        read_rows(&self.returns_path(symbol))
    }

    /// Persist the full returns view for a symbol, replacing any prior file
    pub fn save_returns(&self, symbol: &str, returns: &[Return]) -> Result<(), StoreError> {
        write_rows(&self.returns_path(symbol), returns)
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Append rows to a shared log file, writing the header row only when the
/// file is new or empty. A no-op for an empty row set.
pub(crate) fn append_rows<'a, T: Serialize + 'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a T>,
) -> Result<(), StoreError> {
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = fs::OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write to .tmp, rename into place
    let tmp_path = path.with_extension("csv.tmp");
    let mut writer = csv::Writer::from_path(&tmp_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io(e)
    })
}
