//! Risk-normalized position sizing and the pyramiding ladder.
//!
//! One unit risks `risk_percent` of capital if price moves
//! `risk_multiplier × ATR` against the entry. Further units are added every
//! `unit_step_atr × ATR` above the base price, up to `max_units`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingRules {
    /// Fraction of capital risked per unit (0.01 = 1%).
    pub risk_percent: f64,
    /// Stop distance in ATRs.
    pub risk_multiplier: f64,
    pub max_units: usize,
    /// Spacing between ladder entries in ATRs.
    pub unit_step_atr: f64,
}

impl Default for SizingRules {
    fn default() -> Self {
        Self {
            risk_percent: 0.01,
            risk_multiplier: 2.0,
            max_units: 4,
            unit_step_atr: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LadderEntry {
    /// 1-based unit number.
    pub unit_index: usize,
    pub entry_price: f64,
    pub stop_loss: f64,
}

impl LadderEntry {
    /// Loss at the stop as a percentage of the entry price (negative).
    pub fn loss_pct(&self) -> f64 {
        (self.stop_loss - self.entry_price) / self.entry_price * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionPlan {
    pub one_percent_of_capital: f64,
    pub risk_per_unit: f64,
    pub unit_count: u64,
    pub ladder: Vec<LadderEntry>,
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Sizes a position with the default turtle rules (1% risk, 2 ATR stop,
/// 4 units half an ATR apart).
///
/// Returns `None` when capital, price, ATR or a supplied base price is not a
/// positive finite number.
pub fn size_position(
    capital: f64,
    price: f64,
    atr: f64,
    base_price: Option<f64>,
) -> Option<PositionPlan> {
    size_position_with(&SizingRules::default(), capital, price, atr, base_price)
}

pub fn size_position_with(
    rules: &SizingRules,
    capital: f64,
    price: f64,
    atr: f64,
    base_price: Option<f64>,
) -> Option<PositionPlan> {
    if !positive_finite(capital) || !positive_finite(price) || !positive_finite(atr) {
        return None;
    }
    if base_price.is_some_and(|b| !positive_finite(b)) {
        return None;
    }

    let one_percent = capital * rules.risk_percent;
    let risk_per_unit = rules.risk_multiplier * atr;
    let unit_count = (one_percent / risk_per_unit).floor() as u64;
    let base = base_price.unwrap_or(price);

    let ladder = (0..rules.max_units)
        .map(|i| {
            let entry_price = base + i as f64 * rules.unit_step_atr * atr;
            LadderEntry {
                unit_index: i + 1,
                entry_price,
                stop_loss: entry_price - risk_per_unit,
            }
        })
        .collect();

    Some(PositionPlan {
        one_percent_of_capital: one_percent,
        risk_per_unit,
        unit_count,
        ladder,
    })
}
