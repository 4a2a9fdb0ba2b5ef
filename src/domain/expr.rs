//! Expression node model.
//!
//! One strategy is a tree of [`Expr`] nodes: numeric literals, the three
//! special forms (`ifthen`, `set`, `get`) and generic calls. A call carries
//! named parameters; parameter values that are themselves expressions are
//! evaluated before the call and overwritten in place with their numeric
//! results ("collapse"), while configuration parameters (strings, instruments,
//! candle times) are consumed as-is and never evaluated.
//!
//! Collapse is idempotent: re-evaluating a collapsed node treats the
//! already-numeric parameters as literals.

use crate::domain::error::EvalError;
use crate::domain::market::{CandleTime, Exchange, Instrument};
use std::collections::BTreeMap;
use std::fmt;

/// One node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal (or a collapsed sub-expression).
    Num(f64),
    /// Conditional branch lists; `otherwise` is empty when `else` was absent.
    IfThen {
        cond: Box<Expr>,
        then: Vec<Expr>,
        otherwise: Vec<Expr>,
    },
    /// Bind a symbol to an expression without evaluating it.
    Set { symbol: String, value: Box<Expr> },
    /// Re-evaluate whatever the symbol is currently bound to.
    Get { symbol: String },
    /// A named operation with named parameters.
    Call(Call),
}

impl Expr {
    /// Numeric value of an already-evaluated node, if it is one.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Expr::Num(_))
    }
}

/// A generic call node: function name plus named parameters.
///
/// `BTreeMap` keeps parameter iteration deterministic regardless of the order
/// the strategy document wrote them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: String,
    pub params: BTreeMap<String, Param>,
}

/// A named parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Evaluated before the call; becomes `Expr::Num` once collapsed.
    Expr(Expr),
    /// Configuration string (`key`, `currency`, ...), never evaluated.
    Str(String),
    /// Instrument configuration object.
    Instrument(Instrument),
    /// Candle interval configuration.
    Time(CandleTime),
    /// Exchange configuration.
    Exchange(Exchange),
    /// The ordered variadic `args` sequence.
    List(Vec<Expr>),
}

impl Call {
    pub fn new(function: impl Into<String>) -> Self {
        Call {
            function: function.into(),
            params: BTreeMap::new(),
        }
    }

    fn missing(&self, param: &str) -> EvalError {
        EvalError::MissingParam {
            function: self.function.clone(),
            param: param.to_string(),
        }
    }

    /// Collapsed numeric parameter; absent or not-yet-numeric is an error.
    pub fn number(&self, param: &str) -> Result<f64, EvalError> {
        match self.params.get(param) {
            Some(Param::Expr(e)) => e.as_num().ok_or_else(|| self.missing(param)),
            _ => Err(self.missing(param)),
        }
    }

    /// Historical offset parameter: 0 = current step, -1 = previous, and so
    /// on. Absent means the current step.
    pub fn index(&self) -> Result<i64, EvalError> {
        match self.params.get("index") {
            None => Ok(0),
            Some(Param::Expr(e)) => e
                .as_num()
                .map(|v| v as i64)
                .ok_or_else(|| self.missing("index")),
            Some(_) => Err(self.missing("index")),
        }
    }

    /// The `key` parameter selecting an output line or named field.
    pub fn key(&self) -> Option<&str> {
        match self.params.get("key") {
            Some(Param::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// The `key` parameter when the function requires one.
    pub fn required_key(&self) -> Result<&str, EvalError> {
        self.key().ok_or_else(|| self.missing("key"))
    }

    pub fn instrument(&self) -> Result<&Instrument, EvalError> {
        match self.params.get("instrument") {
            Some(Param::Instrument(inst)) => Ok(inst),
            _ => Err(self.missing("instrument")),
        }
    }

    pub fn candletime(&self) -> Result<CandleTime, EvalError> {
        match self.params.get("candletime") {
            Some(Param::Time(t)) => Ok(*t),
            _ => Err(self.missing("candletime")),
        }
    }

    /// Collapsed values of the variadic `args` sequence, in order.
    pub fn arg_values(&self) -> Result<Vec<f64>, EvalError> {
        match self.params.get("args") {
            Some(Param::List(entries)) => entries
                .iter()
                .map(|e| e.as_num().ok_or_else(|| self.missing("args")))
                .collect(),
            _ => Err(self.missing("args")),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => write!(f, "{}", v),
            Expr::IfThen {
                cond,
                then,
                otherwise,
            } => {
                write!(f, "ifthen(if={}, then=[{}]", cond, join(then))?;
                if !otherwise.is_empty() {
                    write!(f, ", else=[{}]", join(otherwise))?;
                }
                write!(f, ")")
            }
            Expr::Set { symbol, value } => write!(f, "set {} = {}", symbol, value),
            Expr::Get { symbol } => write!(f, "get {}", symbol),
            Expr::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        let mut first = true;
        for (name, value) in &self.params {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={}", name, value)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Expr(e) => write!(f, "{}", e),
            Param::Str(s) => write!(f, "{}", s),
            Param::Instrument(inst) => write!(f, "{}", inst),
            Param::Time(t) => write!(f, "{}", t),
            Param::Exchange(e) => write!(f, "{}", e),
            Param::List(entries) => write!(f, "[{}]", join(entries)),
        }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
