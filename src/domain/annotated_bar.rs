//! A daily bar together with everything the analysis derives for that day.

use crate::domain::daily_bar::DailyBar;
use crate::domain::indicator::atr::Volatility;
use crate::domain::signal::Signal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedBar {
    #[serde(flatten)]
    pub bar: DailyBar,
    pub tr: f64,
    pub atr: Option<f64>,
    /// Close-to-close change in percent; undefined on the first bar.
    pub change_pct: Option<f64>,
    /// SMA of close keyed by window length.
    pub moving_averages: BTreeMap<usize, Option<f64>>,
    pub signal: Signal,
    /// Highest high over the breakout window, current day excluded.
    pub channel_high: Option<f64>,
    /// Lowest low over the breakout window, current day excluded.
    pub channel_low: Option<f64>,
    pub stop_loss: Option<f64>,
}

impl AnnotatedBar {
    /// Starts an annotation from the volatility pass. Signal fields begin at
    /// their warm-up values.
    pub fn new(bar: DailyBar, volatility: Volatility, prev_close: Option<f64>) -> Self {
        Self {
            bar,
            tr: volatility.tr,
            atr: volatility.atr,
            change_pct: prev_close.map(|prev| (bar.close - prev) / prev * 100.0),
            moving_averages: BTreeMap::new(),
            signal: Signal::Hold,
            channel_high: None,
            channel_low: None,
            stop_loss: None,
        }
    }

    /// SMA for `window`, `None` if not requested or still warming up.
    pub fn ma(&self, window: usize) -> Option<f64> {
        self.moving_averages.get(&window).copied().flatten()
    }

    pub fn tr_pct_of_close(&self) -> f64 {
        self.tr / self.bar.close * 100.0
    }

    pub fn atr_pct_of_close(&self) -> Option<f64> {
        self.atr.map(|atr| atr / self.bar.close * 100.0)
    }
}

impl AsRef<DailyBar> for AnnotatedBar {
    fn as_ref(&self) -> &DailyBar {
        &self.bar
    }
}
