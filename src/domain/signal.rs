//! Breakout signal classification.
//!
//! A close strictly above the highest high of the previous `lookback` days is
//! a BUY, strictly below the lowest low is a SELL, anything else is a HOLD.
//! The current day never takes part in its own channel.

use crate::domain::annotated_bar::AnnotatedBar;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_BREAKOUT_WINDOW: usize = 20;
pub const DEFAULT_STOP_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Classifies every bar and annotates channel bounds and the ATR stop.
///
/// Returns a new series; `bars` is left untouched. With `lookback == 0` there
/// is no channel to break, so every day is a HOLD.
pub fn compute_signals(
    bars: &[AnnotatedBar],
    lookback: usize,
    stop_multiplier: f64,
) -> Vec<AnnotatedBar> {
    bars.iter()
        .enumerate()
        .map(|(i, current)| {
            let mut next = current.clone();
            if lookback == 0 || i < lookback {
                next.signal = Signal::Hold;
                next.channel_high = None;
                next.channel_low = None;
                next.stop_loss = None;
                return next;
            }

            let window = &bars[i - lookback..i];
            let highest = window
                .iter()
                .map(|b| b.bar.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let lowest = window
                .iter()
                .map(|b| b.bar.low)
                .fold(f64::INFINITY, f64::min);

            let close = current.bar.close;
            next.signal = if close > highest {
                Signal::Buy
            } else if close < lowest {
                Signal::Sell
            } else {
                Signal::Hold
            };
            next.channel_high = Some(highest);
            next.channel_low = Some(lowest);
            next.stop_loss = current.atr.map(|atr| close - stop_multiplier * atr);
            next
        })
        .collect()
}
