//! Technical indicator implementations.
//!
//! - `atr`: True Range and the smoothed Average True Range ("N")
//! - `sma`: simple moving averages over closing prices
//! - `IndicatorType`: indicator identity + parameters, used for column labels

pub mod atr;
pub mod sma;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    TrueRange,
    Atr(usize),
    Sma(usize),
    ChannelHigh(usize),
    ChannelLow(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Sma(window) => write!(f, "SMA({})", window),
            IndicatorType::ChannelHigh(lookback) => write!(f, "HIGH({})", lookback),
            IndicatorType::ChannelLow(lookback) => write!(f, "LOW({})", lookback),
        }
    }
}
