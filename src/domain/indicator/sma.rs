//! Simple Moving Average over closing prices.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars have no value.

use crate::domain::daily_bar::DailyBar;

pub const DEFAULT_MA_WINDOWS: [usize; 3] = [5, 20, 40];

pub fn compute_ma<B: AsRef<DailyBar>>(bars: &[B], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; bars.len()];
    }

    let mut values = Vec::with_capacity(bars.len());
    values.resize((window - 1).min(bars.len()), None);
    values.extend(bars.windows(window).map(|w| {
        let sum: f64 = w.iter().map(|b| b.as_ref().close).sum();
        Some(sum / window as f64)
    }));
    values
}
