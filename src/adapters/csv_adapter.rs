//! CSV file data adapter.
//!
//! One `<SYMBOL>.csv` per instrument with at least `date,high,low,close`
//! columns. Extra columns (`open`, `volume`, ...) are ignored on load.

use crate::domain::daily_bar::DailyBar;
use crate::domain::error::TurtleError;
use crate::domain::journal::JournalEntry;
use crate::ports::data_port::DataPort;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.csv", symbol.trim().to_uppercase()))
    }
}

fn csv_error(path: &Path, err: csv::Error) -> TurtleError {
    TurtleError::Data {
        reason: format!("{}: {}", path.display(), err),
    }
}

impl DataPort for CsvAdapter {
    fn load(&self, symbol: &str) -> Result<Vec<DailyBar>, TurtleError> {
        let path = self.csv_path(symbol);
        debug!(path = %path.display(), "loading bars");

        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TurtleError::NoData {
                symbol: symbol.to_uppercase(),
            },
            _ => TurtleError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = rdr
            .deserialize::<DailyBar>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| csv_error(&path, e))?;

        bars.sort_by_key(|b| b.date);
        DailyBar::validate_series(&bars)?;
        debug!(symbol, bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    fn save(&self, symbol: &str, bars: &[DailyBar]) -> Result<(), TurtleError> {
        DailyBar::validate_series(bars)?;
        fs::create_dir_all(&self.base_path)?;

        let path = self.csv_path(symbol);
        let mut wtr = csv::Writer::from_path(&path).map_err(|e| csv_error(&path, e))?;
        for bar in bars {
            wtr.serialize(bar).map_err(|e| csv_error(&path, e))?;
        }
        wtr.flush()?;
        debug!(path = %path.display(), bars = bars.len(), "saved bars");
        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TurtleError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TurtleError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Reads profit journal entries with columns
/// `symbol,buy_date,sell_date,buy_price,sell_price,shares,fee_rate,note`.
/// Empty `sell_date`/`sell_price` mark an open trade.
pub fn load_journal(path: &Path) -> Result<Vec<JournalEntry>, TurtleError> {
    debug!(path = %path.display(), "loading journal");
    let mut rdr = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    rdr.deserialize::<JournalEntry>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| csv_error(path, e))
}
