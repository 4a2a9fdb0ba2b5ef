//! Domain logic: expression model, parser, evaluator, context, built-ins.

pub mod builtins;
pub mod context;
pub mod error;
pub mod eval;
pub mod expr;
pub mod market;
pub mod parser;
pub mod strategy;
