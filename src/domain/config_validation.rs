//! Configuration validation.
//!
//! Every key is optional; these checks only reject values that are present
//! and out of range. Missing keys fall back to defaults when configs are built.

use crate::domain::error::TurtleError;
use crate::domain::profit::FeeRate;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    validate_analysis_config(config)?;
    validate_sizing_config(config)?;
    validate_costs_config(config)?;
    Ok(())
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    validate_period(config)?;
    validate_breakout_window(config)?;
    validate_ma_windows(config)?;
    validate_stop_multiplier(config)?;
    Ok(())
}

pub fn validate_sizing_config(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    validate_capital(config)?;
    validate_risk_percent(config)?;
    validate_risk_multiplier(config)?;
    validate_max_units(config)?;
    validate_unit_step(config)?;
    Ok(())
}

pub fn validate_costs_config(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    validate_fee_rate(config)?;
    validate_fx_rate(config)?;
    Ok(())
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(section: &str, key: &str, reason: &str) -> TurtleError {
    TurtleError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a comma separated list of window lengths, e.g. `5,20,40`.
pub fn parse_windows(value: &str) -> Result<Vec<usize>, TurtleError> {
    let mut windows = Vec::new();
    for part in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let window: usize = part.parse().map_err(|_| {
            invalid(
                "analysis",
                "ma_windows",
                &format!("'{part}' is not a window length"),
            )
        })?;
        if window == 0 {
            return Err(invalid(
                "analysis",
                "ma_windows",
                "window lengths must be at least 1",
            ));
        }
        if !windows.contains(&window) {
            windows.push(window);
        }
    }
    Ok(windows)
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if config.get_int("analysis", "period", 20) < 1 {
        return Err(invalid("analysis", "period", "period must be at least 1"));
    }
    Ok(())
}

fn validate_breakout_window(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if config.get_int("analysis", "breakout_window", 20) < 1 {
        return Err(invalid(
            "analysis",
            "breakout_window",
            "breakout_window must be at least 1",
        ));
    }
    Ok(())
}

fn validate_ma_windows(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if let Some(value) = config.get_string("analysis", "ma_windows") {
        parse_windows(&value)?;
    }
    Ok(())
}

fn validate_stop_multiplier(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if !positive_finite(config.get_double("analysis", "stop_multiplier", 2.0)) {
        return Err(invalid(
            "analysis",
            "stop_multiplier",
            "stop_multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_capital(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if config.get_string("sizing", "capital").is_none() {
        return Ok(());
    }
    match config.get_double_opt("sizing", "capital") {
        Some(value) if positive_finite(value) => Ok(()),
        _ => Err(invalid("sizing", "capital", "capital must be positive")),
    }
}

fn validate_risk_percent(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    let value = config.get_double("sizing", "risk_percent", 0.01);
    if !(value.is_finite() && value > 0.0 && value < 1.0) {
        return Err(invalid(
            "sizing",
            "risk_percent",
            "risk_percent must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_risk_multiplier(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if !positive_finite(config.get_double("sizing", "risk_multiplier", 2.0)) {
        return Err(invalid(
            "sizing",
            "risk_multiplier",
            "risk_multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_max_units(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if config.get_int("sizing", "max_units", 4) < 1 {
        return Err(invalid("sizing", "max_units", "max_units must be at least 1"));
    }
    Ok(())
}

fn validate_unit_step(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if !positive_finite(config.get_double("sizing", "unit_step_atr", 0.5)) {
        return Err(invalid(
            "sizing",
            "unit_step_atr",
            "unit_step_atr must be positive",
        ));
    }
    Ok(())
}

/// `[costs] fee_rate` (default 0) through the checked [`FeeRate`] constructor.
pub fn fee_rate_from_config(config: &dyn ConfigPort) -> Result<FeeRate, TurtleError> {
    FeeRate::try_from_fraction(config.get_double("costs", "fee_rate", 0.0)).map_err(|_| {
        invalid(
            "costs",
            "fee_rate",
            "fee_rate is a fraction and must be in [0, 1), e.g. 0.016 for 1.6%",
        )
    })
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    fee_rate_from_config(config).map(|_| ())
}

fn validate_fx_rate(config: &dyn ConfigPort) -> Result<(), TurtleError> {
    if !positive_finite(config.get_double("costs", "fx_rate", 1.0)) {
        return Err(invalid("costs", "fx_rate", "fx_rate must be positive"));
    }
    Ok(())
}
