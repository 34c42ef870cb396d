//! Analysis pipeline: volatility, moving averages, then breakout signals.

use crate::domain::annotated_bar::AnnotatedBar;
use crate::domain::daily_bar::DailyBar;
use crate::domain::error::TurtleError;
use crate::domain::indicator::atr::{DEFAULT_ATR_PERIOD, compute_volatility};
use crate::domain::indicator::sma::{DEFAULT_MA_WINDOWS, compute_ma};
use crate::domain::signal::{
    DEFAULT_BREAKOUT_WINDOW, DEFAULT_STOP_MULTIPLIER, Signal, compute_signals,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub period: usize,
    pub ma_windows: Vec<usize>,
    pub breakout_window: usize,
    pub stop_multiplier: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_ATR_PERIOD,
            ma_windows: DEFAULT_MA_WINDOWS.to_vec(),
            breakout_window: DEFAULT_BREAKOUT_WINDOW,
            stop_multiplier: DEFAULT_STOP_MULTIPLIER,
        }
    }
}

impl AnalysisConfig {
    /// Bars needed before both the ATR and the breakout channel are live on
    /// the latest day.
    pub fn min_history(&self) -> usize {
        self.period.max(self.breakout_window) + 1
    }
}

/// Runs the full pipeline. Short histories are not an error here: ATR, MA
/// and channel fields simply stay `None` and signals stay HOLD.
pub fn annotate(bars: &[DailyBar], config: &AnalysisConfig) -> Vec<AnnotatedBar> {
    let volatility = compute_volatility(bars, config.period);

    let mut annotated: Vec<AnnotatedBar> = bars
        .iter()
        .zip(volatility)
        .enumerate()
        .map(|(i, (bar, vol))| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            AnnotatedBar::new(*bar, vol, prev_close)
        })
        .collect();

    for &window in &config.ma_windows {
        for (row, value) in annotated.iter_mut().zip(compute_ma(bars, window)) {
            row.moving_averages.insert(window, value);
        }
    }

    let annotated = compute_signals(&annotated, config.breakout_window, config.stop_multiplier);
    debug!(
        bars = bars.len(),
        period = config.period,
        breakout_window = config.breakout_window,
        "annotated price history"
    );
    annotated
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

/// An annotated history for one symbol.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbol: String,
    pub bars: Vec<AnnotatedBar>,
}

impl Analysis {
    pub fn run(symbol: &str, bars: &[DailyBar], config: &AnalysisConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            bars: annotate(bars, config),
        }
    }

    /// Like [`Analysis::run`], but refuses histories shorter than
    /// [`AnalysisConfig::min_history`].
    pub fn require(
        symbol: &str,
        bars: &[DailyBar],
        config: &AnalysisConfig,
    ) -> Result<Self, TurtleError> {
        if bars.is_empty() {
            return Err(TurtleError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let minimum = config.min_history();
        if bars.len() < minimum {
            return Err(TurtleError::InsufficientData {
                symbol: symbol.to_string(),
                bars: bars.len(),
                minimum,
            });
        }
        Ok(Self::run(symbol, bars, config))
    }

    pub fn latest(&self) -> Option<&AnnotatedBar> {
        self.bars.last()
    }

    pub fn latest_atr(&self) -> Option<f64> {
        self.latest().and_then(|b| b.atr)
    }

    pub fn latest_signal(&self) -> Signal {
        self.latest().map_or(Signal::Hold, |b| b.signal)
    }

    /// The last `n` bars, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &AnnotatedBar> {
        self.bars.iter().rev().take(n)
    }

    pub fn signal_counts(&self) -> SignalCounts {
        self.bars
            .iter()
            .fold(SignalCounts::default(), |mut counts, bar| {
                match bar.signal {
                    Signal::Buy => counts.buy += 1,
                    Signal::Sell => counts.sell += 1,
                    Signal::Hold => counts.hold += 1,
                }
                counts
            })
    }
}
