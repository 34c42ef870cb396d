//! Domain error types.

/// Top-level error type for turtletrader.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("invalid input {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("division by zero: {what}")]
    DivisionByZero { what: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TurtleError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        TurtleError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TurtleError> for std::process::ExitCode {
    fn from(err: &TurtleError) -> Self {
        let code: u8 = match err {
            TurtleError::Io(_) => 1,
            TurtleError::ConfigParse { .. }
            | TurtleError::ConfigMissing { .. }
            | TurtleError::ConfigInvalid { .. } => 2,
            TurtleError::Data { .. } | TurtleError::InvalidBar { .. } => 3,
            TurtleError::InvalidInput { .. } | TurtleError::DivisionByZero { .. } => 4,
            TurtleError::NoData { .. } | TurtleError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
