//! Daily price bar representation.

use crate::domain::error::TurtleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            high,
            low,
            close,
        }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Checks the invariants every bar series must hold before analysis:
    /// strictly ascending dates and positive finite prices with `high >= low`.
    pub fn validate_series(bars: &[DailyBar]) -> Result<(), TurtleError> {
        for (index, bar) in bars.iter().enumerate() {
            for (name, value) in [("high", bar.high), ("low", bar.low), ("close", bar.close)] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(TurtleError::InvalidBar {
                        index,
                        reason: format!("{name} must be a positive finite number, got {value}"),
                    });
                }
            }
            if bar.high < bar.low {
                return Err(TurtleError::InvalidBar {
                    index,
                    reason: format!("high {} is below low {}", bar.high, bar.low),
                });
            }
            if index > 0 && bars[index - 1].date >= bar.date {
                return Err(TurtleError::InvalidBar {
                    index,
                    reason: format!(
                        "date {} does not follow {}",
                        bar.date,
                        bars[index - 1].date
                    ),
                });
            }
        }
        Ok(())
    }
}

impl AsRef<DailyBar> for DailyBar {
    fn as_ref(&self) -> &DailyBar {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_bar() -> DailyBar {
        DailyBar::new(day(15), 110.0, 90.0, 105.0)
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_accepts_ordered_series() {
        let bars = vec![
            DailyBar::new(day(1), 10.0, 8.0, 9.0),
            DailyBar::new(day(2), 11.0, 9.0, 10.0),
            DailyBar::new(day(3), 10.0, 10.0, 10.0),
        ];
        assert!(DailyBar::validate_series(&bars).is_ok());
    }

    #[test]
    fn validate_accepts_empty_series() {
        assert!(DailyBar::validate_series(&[]).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let bars = vec![
            DailyBar::new(day(1), 10.0, 8.0, 9.0),
            DailyBar::new(day(1), 11.0, 9.0, 10.0),
        ];
        match DailyBar::validate_series(&bars) {
            Err(TurtleError::InvalidBar { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidBar, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_descending_dates() {
        let bars = vec![
            DailyBar::new(day(2), 10.0, 8.0, 9.0),
            DailyBar::new(day(1), 11.0, 9.0, 10.0),
        ];
        assert!(DailyBar::validate_series(&bars).is_err());
    }

    #[test]
    fn validate_rejects_non_positive_and_nan() {
        let zero = vec![DailyBar::new(day(1), 10.0, 0.0, 9.0)];
        assert!(DailyBar::validate_series(&zero).is_err());

        let nan = vec![DailyBar::new(day(1), f64::NAN, 8.0, 9.0)];
        assert!(DailyBar::validate_series(&nan).is_err());

        let inf = vec![DailyBar::new(day(1), 10.0, 8.0, f64::INFINITY)];
        assert!(DailyBar::validate_series(&inf).is_err());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let bars = vec![DailyBar::new(day(1), 8.0, 10.0, 9.0)];
        match DailyBar::validate_series(&bars) {
            Err(TurtleError::InvalidBar { index, reason }) => {
                assert_eq!(index, 0);
                assert!(reason.contains("below low"));
            }
            other => panic!("expected InvalidBar, got {other:?}"),
        }
    }
}
