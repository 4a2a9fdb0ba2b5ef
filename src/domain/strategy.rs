//! Strategy document: the parsed form of one JSON strategy file.

use crate::domain::error::ParseError;
use crate::domain::expr::Expr;
use crate::domain::parser;

/// A named strategy whose logic is the root `ifthen` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub author: String,
    pub root: Expr,
}

impl Strategy {
    pub fn from_json(input: &str) -> Result<Self, ParseError> {
        parser::parse_strategy(input)
    }

    /// Sorted, de-duplicated function names referenced anywhere in the tree.
    /// Used by the CLI to report what a strategy depends on before a run.
    pub fn referenced_functions(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_functions(&self.root, &mut names);
        names.sort();
        names.dedup();
        names
    }
}

fn collect_functions(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Num(_) | Expr::Get { .. } => {}
        Expr::Set { value, .. } => collect_functions(value, out),
        Expr::IfThen {
            cond,
            then,
            otherwise,
        } => {
            collect_functions(cond, out);
            for e in then.iter().chain(otherwise) {
                collect_functions(e, out);
            }
        }
        Expr::Call(call) => {
            out.push(call.function.clone());
            for param in call.params.values() {
                match param {
                    crate::domain::expr::Param::Expr(e) => collect_functions(e, out),
                    crate::domain::expr::Param::List(entries) => {
                        for e in entries {
                            collect_functions(e, out);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
