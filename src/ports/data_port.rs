//! Price history repository port.
//!
//! Retrieval and caching of daily bars live behind this trait so the
//! analysis core never touches storage or network.

use crate::domain::daily_bar::DailyBar;
use crate::domain::error::TurtleError;

pub trait DataPort {
    /// Bars for `symbol`, ascending by date. Unknown symbols are an error.
    fn load(&self, symbol: &str) -> Result<Vec<DailyBar>, TurtleError>;

    /// Replaces the stored history for `symbol`.
    fn save(&self, symbol: &str, bars: &[DailyBar]) -> Result<(), TurtleError>;

    fn list_symbols(&self) -> Result<Vec<String>, TurtleError>;
}
