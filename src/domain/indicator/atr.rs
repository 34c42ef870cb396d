//! True Range and Average True Range ("N").
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! Seed ATR[n-1] with the mean of the first n TR values, then
//! ATR[i] = (ATR[i-1]*(n-1) + TR[i]*2) / (n+1).
//! Warmup: first (n-1) bars have no ATR.

use crate::domain::daily_bar::DailyBar;
use serde::Serialize;

pub const DEFAULT_ATR_PERIOD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Volatility {
    pub tr: f64,
    pub atr: Option<f64>,
}

/// State carried from one bar to the next while folding over the series.
#[derive(Debug, Default)]
struct Carry {
    prev_close: Option<f64>,
    prev_atr: Option<f64>,
    tr_sum: f64,
}

impl Carry {
    fn step(&mut self, index: usize, bar: &DailyBar, period: usize) -> Volatility {
        let tr = match self.prev_close {
            None => bar.high - bar.low,
            Some(prev_close) => bar.true_range(prev_close),
        };

        let atr = if period == 0 || index + 1 < period {
            self.tr_sum += tr;
            None
        } else if index + 1 == period {
            self.tr_sum += tr;
            Some(self.tr_sum / period as f64)
        } else {
            self.prev_atr
                .map(|prev| (prev * (period - 1) as f64 + tr * 2.0) / (period + 1) as f64)
        };

        self.prev_close = Some(bar.close);
        self.prev_atr = atr;
        Volatility { tr, atr }
    }
}

/// Computes TR and ATR for every bar, aligned one-to-one with `bars`.
///
/// Fewer than `period` bars is not an error: every `atr` stays `None`, which
/// callers must read as "not enough history" rather than zero.
pub fn compute_volatility<B: AsRef<DailyBar>>(bars: &[B], period: usize) -> Vec<Volatility> {
    bars.iter()
        .enumerate()
        .scan(Carry::default(), |carry, (i, bar)| {
            Some(carry.step(i, bar.as_ref(), period))
        })
        .collect()
}

/// The most recent defined ATR, if the series is long enough to have one.
pub fn latest_atr(series: &[Volatility]) -> Option<f64> {
    series.last().and_then(|v| v.atr)
}
