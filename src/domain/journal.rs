//! Profit journal evaluation.
//!
//! Entries come from an external store. This module only derives fees,
//! realized profit and the per-day profit series from them.

use crate::domain::error::TurtleError;
use crate::domain::profit::{FeeRate, calculate_trade, require_finite};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JournalEntry {
    pub symbol: String,
    pub buy_date: NaiveDate,
    pub sell_date: Option<NaiveDate>,
    pub buy_price: f64,
    pub sell_price: Option<f64>,
    pub shares: f64,
    /// Fraction, e.g. 0.016 for 1.6%.
    pub fee_rate: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalOutcome {
    pub status: TradeStatus,
    pub buy_fee: f64,
    pub sell_fee: f64,
    pub total_fees: f64,
    pub net_profit: Option<f64>,
    pub profit_rate_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyProfit {
    pub date: NaiveDate,
    /// Sum of profit rates (percent) of trades closed that day.
    pub profit: f64,
    pub cumulative: f64,
}

impl JournalEntry {
    /// Closed once both the sell date and the sell price are known.
    pub fn status(&self) -> TradeStatus {
        match (self.sell_date, self.sell_price) {
            (Some(_), Some(_)) => TradeStatus::Closed,
            _ => TradeStatus::Open,
        }
    }

    pub fn evaluate(&self) -> Result<JournalOutcome, TurtleError> {
        let fee_rate = FeeRate::try_from_fraction(self.fee_rate)?;

        match (self.sell_date, self.sell_price) {
            (Some(sell_date), Some(sell_price)) => {
                if sell_date < self.buy_date {
                    return Err(TurtleError::invalid_input(
                        "sell_date",
                        format!("{sell_date} is before buy date {}", self.buy_date),
                    ));
                }
                let calc = calculate_trade(self.buy_price, sell_price, self.shares, fee_rate, 1.0)?;
                Ok(JournalOutcome {
                    status: TradeStatus::Closed,
                    buy_fee: calc.buy_fee,
                    sell_fee: calc.sell_fee,
                    total_fees: calc.total_fees,
                    net_profit: Some(calc.net_profit_base),
                    profit_rate_pct: Some(calc.profit_rate_pct),
                })
            }
            _ => {
                let buy_total =
                    require_finite("buy_price", self.buy_price)? * require_finite("shares", self.shares)?;
                if buy_total == 0.0 {
                    return Err(TurtleError::DivisionByZero {
                        what: format!("{} entry has a zero buy total", self.symbol),
                    });
                }
                let buy_fee = buy_total * fee_rate.fraction();
                Ok(JournalOutcome {
                    status: TradeStatus::Open,
                    buy_fee,
                    sell_fee: 0.0,
                    total_fees: buy_fee,
                    net_profit: None,
                    profit_rate_pct: None,
                })
            }
        }
    }
}

/// Realized profit rate per sell date, ascending, with a running total.
/// Open entries do not contribute.
pub fn daily_profits(entries: &[JournalEntry]) -> Result<Vec<DailyProfit>, TurtleError> {
    let outcomes = entries
        .iter()
        .map(JournalEntry::evaluate)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(daily_series(entries.iter().zip(&outcomes)))
}

/// Builds the daily series from entries that were already evaluated.
pub fn daily_series<'a>(
    evaluated: impl IntoIterator<Item = (&'a JournalEntry, &'a JournalOutcome)>,
) -> Vec<DailyProfit> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (entry, outcome) in evaluated {
        if let (Some(date), Some(rate)) = (entry.sell_date, outcome.profit_rate_pct) {
            *by_date.entry(date).or_insert(0.0) += rate;
        }
    }

    let mut cumulative = 0.0;
    by_date
        .into_iter()
        .map(|(date, profit)| {
            cumulative += profit;
            DailyProfit {
                date,
                profit,
                cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn closed(symbol: &str, sell: NaiveDate, buy_price: f64, sell_price: f64) -> JournalEntry {
        JournalEntry {
            symbol: symbol.into(),
            buy_date: date(1, 2),
            sell_date: Some(sell),
            buy_price,
            sell_price: Some(sell_price),
            shares: 10.0,
            fee_rate: 0.0,
            note: None,
        }
    }

    fn open(symbol: &str) -> JournalEntry {
        JournalEntry {
            symbol: symbol.into(),
            buy_date: date(1, 2),
            sell_date: None,
            buy_price: 100.0,
            sell_price: None,
            shares: 10.0,
            fee_rate: 0.016,
            note: Some("still holding".into()),
        }
    }

    #[test]
    fn closed_entry_matches_profit_calculator() {
        let mut entry = closed("NVDA", date(2, 1), 100.0, 110.0);
        entry.fee_rate = 0.016;
        let outcome = entry.evaluate().unwrap();

        assert_eq!(outcome.status, TradeStatus::Closed);
        assert_relative_eq!(outcome.buy_fee, 16.0);
        assert_relative_eq!(outcome.sell_fee, 17.6, epsilon = 1e-9);
        assert_relative_eq!(outcome.net_profit.unwrap(), 66.4, epsilon = 1e-9);
        assert_relative_eq!(outcome.profit_rate_pct.unwrap(), 6.64, epsilon = 1e-9);
    }

    #[test]
    fn open_entry_only_pays_buy_fee() {
        let outcome = open("TSLA").evaluate().unwrap();
        assert_eq!(outcome.status, TradeStatus::Open);
        assert_relative_eq!(outcome.buy_fee, 16.0);
        assert_eq!(outcome.sell_fee, 0.0);
        assert_relative_eq!(outcome.total_fees, 16.0);
        assert!(outcome.net_profit.is_none());
        assert!(outcome.profit_rate_pct.is_none());
    }

    #[test]
    fn sell_price_without_date_is_open() {
        let mut entry = open("AAPL");
        entry.sell_price = Some(120.0);
        assert_eq!(entry.status(), TradeStatus::Open);
        assert_eq!(entry.evaluate().unwrap().status, TradeStatus::Open);
    }

    #[test]
    fn sell_before_buy_is_rejected() {
        let mut entry = closed("AAPL", date(1, 1), 100.0, 110.0);
        entry.buy_date = date(1, 5);
        assert!(matches!(
            entry.evaluate(),
            Err(TurtleError::InvalidInput { .. })
        ));
    }

    #[test]
    fn zero_shares_is_division_error() {
        let mut entry = open("AAPL");
        entry.shares = 0.0;
        assert!(matches!(
            entry.evaluate(),
            Err(TurtleError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn daily_profits_group_sort_and_accumulate() {
        let entries = vec![
            closed("B", date(3, 5), 100.0, 90.0),  // -10%
            closed("A", date(3, 1), 100.0, 110.0), // +10%
            closed("C", date(3, 1), 100.0, 105.0), // +5%
            open("D"),
        ];
        let series = daily_profits(&entries).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date(3, 1));
        assert_relative_eq!(series[0].profit, 15.0, epsilon = 1e-9);
        assert_relative_eq!(series[0].cumulative, 15.0, epsilon = 1e-9);
        assert_eq!(series[1].date, date(3, 5));
        assert_relative_eq!(series[1].profit, -10.0, epsilon = 1e-9);
        assert_relative_eq!(series[1].cumulative, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn percent_style_fee_rate_is_rejected() {
        let mut entry = closed("NVDA", date(2, 1), 100.0, 110.0);
        entry.fee_rate = 1.6;
        match entry.evaluate() {
            Err(TurtleError::InvalidInput { field, .. }) => assert_eq!(field, "fee_rate"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let mut still_open = open("TSLA");
        still_open.fee_rate = 1.6;
        assert!(matches!(
            daily_profits(&[still_open]),
            Err(TurtleError::InvalidInput { .. })
        ));
    }

    #[test]
    fn daily_series_from_evaluated_entries() {
        let entries = vec![
            closed("A", date(3, 1), 100.0, 110.0),
            open("B"),
            closed("C", date(3, 2), 100.0, 95.0),
        ];
        let outcomes: Vec<JournalOutcome> =
            entries.iter().map(|e| e.evaluate().unwrap()).collect();

        let series = daily_series(entries.iter().zip(&outcomes));
        assert_eq!(series, daily_profits(&entries).unwrap());
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series[1].cumulative, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn daily_profits_empty_when_nothing_closed() {
        let series = daily_profits(&[open("A"), open("B")]).unwrap();
        assert!(series.is_empty());
    }
}
