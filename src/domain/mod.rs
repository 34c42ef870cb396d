//! Core domain types and logic.

pub mod daily_bar;
pub mod annotated_bar;
pub mod indicator;
pub mod signal;
pub mod analysis;
pub mod position;
pub mod profit;
pub mod journal;
pub mod config_validation;
pub mod error;
