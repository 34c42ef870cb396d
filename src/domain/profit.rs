//! Fee- and FX-adjusted profit for a completed buy/sell pair.

use crate::domain::error::TurtleError;
use serde::Serialize;

/// Broker fee charged on each leg, stored as a fraction of traded value.
///
/// `FeeRate::from_fraction(0.016)` and `FeeRate::from_percent(1.6)` are the
/// same 1.6% fee. Config files, journal rows and the CLI always take the
/// fraction form and go through [`FeeRate::try_from_fraction`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FeeRate(f64);

impl FeeRate {
    pub const ZERO: FeeRate = FeeRate(0.0);

    pub fn from_fraction(fraction: f64) -> Self {
        FeeRate(fraction)
    }

    /// Checked constructor for fee rates from outside the program. A value
    /// of 1 or more is almost always a percent typed where a fraction was
    /// expected, so it is rejected instead of charged.
    pub fn try_from_fraction(fraction: f64) -> Result<Self, TurtleError> {
        if fraction.is_finite() && (0.0..1.0).contains(&fraction) {
            Ok(FeeRate(fraction))
        } else {
            Err(TurtleError::invalid_input(
                "fee_rate",
                format!("{fraction} is not a fraction in [0, 1), e.g. 0.016 for 1.6%"),
            ))
        }
    }

    pub fn from_percent(percent: f64) -> Self {
        FeeRate(percent / 100.0)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeCalc {
    pub profit_rate_pct: f64,
    pub net_profit_base: f64,
    pub net_profit_converted: f64,
    pub total_investment: f64,
    pub buy_fee: f64,
    pub sell_fee: f64,
    pub total_fees: f64,
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<f64, TurtleError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TurtleError::invalid_input(field, format!("{value} is not a finite number")))
    }
}

pub fn calculate_trade(
    buy_price: f64,
    sell_price: f64,
    shares: f64,
    fee_rate: FeeRate,
    fx_rate: f64,
) -> Result<TradeCalc, TurtleError> {
    require_finite("buy_price", buy_price)?;
    require_finite("sell_price", sell_price)?;
    require_finite("shares", shares)?;
    let fee_rate = FeeRate::try_from_fraction(fee_rate.fraction())?;
    require_finite("fx_rate", fx_rate)?;

    let buy_total = buy_price * shares;
    let sell_total = sell_price * shares;
    if buy_total == 0.0 {
        return Err(TurtleError::DivisionByZero {
            what: "profit rate with a zero buy total".into(),
        });
    }

    let buy_fee = buy_total * fee_rate.fraction();
    let sell_fee = sell_total * fee_rate.fraction();
    let total_fees = buy_fee + sell_fee;
    let net_profit_base = sell_total - buy_total - total_fees;

    Ok(TradeCalc {
        profit_rate_pct: net_profit_base / buy_total * 100.0,
        net_profit_base,
        net_profit_converted: net_profit_base * fx_rate,
        total_investment: buy_total,
        buy_fee,
        sell_fee,
        total_fees,
    })
}

fn require_fx_rate(fx_rate: f64) -> Result<f64, TurtleError> {
    if fx_rate.is_finite() && fx_rate > 0.0 {
        Ok(fx_rate)
    } else {
        Err(TurtleError::invalid_input(
            "fx_rate",
            format!("{fx_rate} must be a positive finite number"),
        ))
    }
}

/// Base-currency amount expressed in the quote currency.
pub fn convert_to_quote(amount: f64, fx_rate: f64) -> Result<f64, TurtleError> {
    let fx_rate = require_fx_rate(fx_rate)?;
    Ok(require_finite("amount", amount)? * fx_rate)
}

/// Quote-currency amount expressed in the base currency.
pub fn convert_to_base(amount: f64, fx_rate: f64) -> Result<f64, TurtleError> {
    let fx_rate = require_fx_rate(fx_rate)?;
    Ok(require_finite("amount", amount)? / fx_rate)
}
