//! Domain error types.
//!
//! Two tolerated conditions are deliberately *not* errors: an unknown function
//! name evaluates to `0`, and `get` of an unbound symbol evaluates to `0`.
//! Everything in [`EvalError`] aborts the current evaluation pass and surfaces
//! to the caller; nothing is retried internally.

/// A parse error with a JSON path pointing at the offending node in a
/// strategy document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at {path}: {message}")]
pub struct ParseError {
    pub path: String,
    pub message: String,
}

impl ParseError {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        ParseError {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// An error raised while evaluating an expression tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvalError {
    #[error("failed to construct feed {spec}: {reason}")]
    FeedConstruct { spec: String, reason: String },

    #[error("failed to construct indicator {spec}: {reason}")]
    IndicatorConstruct { spec: String, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("index {index} out of range for {what} ({len} steps available)")]
    IndexOutOfRange {
        what: String,
        index: i64,
        len: usize,
    },

    #[error("missing or malformed parameter '{param}' for {function}")]
    MissingParam { function: String, param: String },

    #[error("invalid key '{key}' for {function}")]
    InvalidKey { function: String, key: String },

    #[error("order rejected: {reason}")]
    OrderRejected { reason: String },
}

/// Top-level error type for quantdsl.
#[derive(Debug, thiserror::Error)]
pub enum QuantDslError {
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

    #[error(transparent)]
    StrategyParse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantDslError> for std::process::ExitCode {
    fn from(err: &QuantDslError) -> Self {
        let code: u8 = match err {
            QuantDslError::Io(_) => 1,
            QuantDslError::ConfigParse { .. }
            | QuantDslError::ConfigMissing { .. }
            | QuantDslError::ConfigInvalid { .. } => 2,
            QuantDslError::StrategyParse(_) => 4,
            QuantDslError::Eval(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_path() {
        let err = ParseError::new("strategy.then[0]", "expected expression");
        assert_eq!(
            err.to_string(),
            "parse error at strategy.then[0]: expected expression"
        );
    }

    #[test]
    fn eval_error_arity_display() {
        let err = EvalError::Arity {
            function: ">".into(),
            expected: "exactly 2".into(),
            got: 3,
        };
        assert_eq!(err.to_string(), "> expects exactly 2 argument(s), got 3");
    }

    #[test]
    fn index_out_of_range_display() {
        let err = EvalError::IndexOutOfRange {
            what: "capital history".into(),
            index: -5,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "index -5 out of range for capital history (2 steps available)"
        );
    }
}
