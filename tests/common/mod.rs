#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::HashMap;
pub use turtletrader::domain::daily_bar::DailyBar;
use turtletrader::domain::error::TurtleError;
use turtletrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: RefCell<HashMap<String, Vec<DailyBar>>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.data.borrow_mut().insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load(&self, symbol: &str) -> Result<Vec<DailyBar>, TurtleError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TurtleError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .borrow()
            .get(symbol)
            .cloned()
            .ok_or_else(|| TurtleError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn save(&self, symbol: &str, bars: &[DailyBar]) -> Result<(), TurtleError> {
        DailyBar::validate_series(bars)?;
        self.data
            .borrow_mut()
            .insert(symbol.to_string(), bars.to_vec());
        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TurtleError> {
        let mut symbols: Vec<String> = self.data.borrow().keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar `offset` days after 2024-01-01.
pub fn make_bar(offset: usize, high: f64, low: f64, close: f64) -> DailyBar {
    DailyBar::new(
        date(2024, 1, 1) + Duration::days(offset as i64),
        high,
        low,
        close,
    )
}

/// `count` identical bars starting 2024-01-01.
pub fn flat_bars(count: usize, high: f64, low: f64, close: f64) -> Vec<DailyBar> {
    (0..count).map(|i| make_bar(i, high, low, close)).collect()
}

/// Twenty flat `10/8/9` days followed by one extra day.
pub fn breakout_series(high: f64, low: f64, close: f64) -> Vec<DailyBar> {
    let mut bars = flat_bars(20, 10.0, 8.0, 9.0);
    bars.push(make_bar(20, high, low, close));
    bars
}

/// A steadily rising series, one point per day, with a 2 point range.
pub fn rising_bars(count: usize, start_price: f64) -> Vec<DailyBar> {
    (0..count)
        .map(|i| {
            let close = start_price + i as f64;
            make_bar(i, close + 1.0, close - 1.0, close)
        })
        .collect()
}

pub fn bars_to_csv(bars: &[DailyBar]) -> String {
    let mut out = String::from("date,high,low,close\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{}\n",
            bar.date, bar.high, bar.low, bar.close
        ));
    }
    out
}
