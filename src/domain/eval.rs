//! Expression evaluation engine: the single entry point the runner calls
//! once per strategy time step.
//!
//! # Evaluation Semantics
//!
//! - Already-numeric nodes evaluate to themselves (idempotent base case)
//! - `ifthen`: non-zero condition selects `then`, otherwise `else`; the
//!   selected branch list is evaluated in order (side effects included) and
//!   yields its last value, or `0` when empty; the unselected branch is
//!   never evaluated
//! - `set`: binds the symbol to the *unevaluated* value node, silently
//!   overwriting, and returns the fixed sentinel `1`
//! - `get`: re-evaluates the bound node on every access (a clone of it, so
//!   the stored binding never collapses); an unbound symbol reads as `0`
//! - any other call: every expression parameter is collapsed in place to its
//!   numeric value, depth-first and left-to-right in parameter order, then
//!   the built-in dispatches; unknown function names evaluate to `0` after
//!   their parameters (and any side effects therein) have been collapsed
//!
//! Evaluation is strictly single-threaded and depth-first; sibling order is
//! load-bearing because a `set` may feed a later `get` in the same branch.

use crate::domain::builtins::Builtin;
use crate::domain::context::EvalContext;
use crate::domain::error::EvalError;
use crate::domain::expr::{Expr, Param};

/// Return value of a `set`: the act of binding, not a computed value.
pub const SET_SENTINEL: f64 = 1.0;

pub fn evaluate(ctx: &mut EvalContext, node: &mut Expr) -> Result<f64, EvalError> {
    match node {
        Expr::Num(v) => Ok(*v),

        Expr::IfThen {
            cond,
            then,
            otherwise,
        } => {
            let branch = if evaluate(ctx, cond)? != 0.0 {
                then
            } else {
                otherwise
            };
            let mut last = 0.0;
            for expr in branch.iter_mut() {
                last = evaluate(ctx, expr)?;
            }
            Ok(last)
        }

        Expr::Set { symbol, value } => {
            ctx.environment.insert(symbol.clone(), (**value).clone());
            Ok(SET_SENTINEL)
        }

        Expr::Get { symbol } => {
            let mut bound = ctx
                .environment
                .get(symbol)
                .cloned()
                .unwrap_or(Expr::Num(0.0));
            evaluate(ctx, &mut bound)
        }

        Expr::Call(call) => {
            for param in call.params.values_mut() {
                match param {
                    Param::Expr(e) => {
                        let v = evaluate(ctx, e)?;
                        *e = Expr::Num(v);
                    }
                    Param::List(entries) => {
                        for e in entries.iter_mut() {
                            let v = evaluate(ctx, e)?;
                            *e = Expr::Num(v);
                        }
                    }
                    Param::Str(_) | Param::Instrument(_) | Param::Time(_) | Param::Exchange(_) => {}
                }
            }
            match Builtin::from_name(&call.function) {
                Some(builtin) => builtin.apply(ctx, call),
                None => Ok(0.0),
            }
        }
    }
}
