//! Strategy document parser.
//!
//! Converts a JSON strategy document into the typed [`Expr`] tree. Errors
//! carry the JSON path of the offending node plus expected/found wording, so
//! a strategy author can locate the problem in their document.
//!
//! Unknown *function names* are accepted here (they evaluate to `0`, which
//! lets partially-specified strategies run); malformed *structure*, such as a
//! missing `function` field, a non-array `then`, or a misspelled candle time,
//! is rejected at parse time.

use crate::domain::error::ParseError;
use crate::domain::expr::{Call, Expr, Param};
use crate::domain::market::{CandleTime, Exchange, Instrument};
use crate::domain::strategy::Strategy;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parse a full strategy document: `{ name, author, strategy }` where
/// `strategy` must be an `ifthen` expression.
pub fn parse_strategy(input: &str) -> Result<Strategy, ParseError> {
    let doc: Value = serde_json::from_str(input)
        .map_err(|e| ParseError::new("$", format!("invalid JSON: {}", e)))?;
    let obj = doc
        .as_object()
        .ok_or_else(|| ParseError::new("$", "expected a strategy object"))?;

    let name = require_string(obj, "name", "$")?;
    let author = require_string(obj, "author", "$")?;

    let root_value = obj
        .get("strategy")
        .ok_or_else(|| ParseError::new("$", "missing field 'strategy'"))?;
    let root = parse_expr(root_value, "strategy")?;
    if !matches!(root, Expr::IfThen { .. }) {
        return Err(ParseError::new(
            "strategy",
            "root expression must be an ifthen",
        ));
    }

    Ok(Strategy { name, author, root })
}

/// Parse one expression node at `path`.
pub fn parse_expr(value: &Value, path: &str) -> Result<Expr, ParseError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(Expr::Num)
            .ok_or_else(|| ParseError::new(path, "number is not representable as f64")),
        Value::Object(obj) => {
            let function = obj
                .get("function")
                .and_then(Value::as_str)
                .ok_or_else(|| ParseError::new(path, "expected a string 'function' field"))?;
            match function {
                "ifthen" => parse_ifthen(obj, path),
                "set" => parse_set(obj, path),
                "get" => Ok(Expr::Get {
                    symbol: require_string(obj, "symbol", path)?,
                }),
                _ => parse_call(function, obj, path),
            }
        }
        _ => Err(ParseError::new(
            path,
            "expected a number or an expression object",
        )),
    }
}

fn parse_ifthen(obj: &Map<String, Value>, path: &str) -> Result<Expr, ParseError> {
    let cond_value = obj
        .get("if")
        .ok_or_else(|| ParseError::new(path, "ifthen is missing its 'if' field"))?;
    let cond = parse_expr(cond_value, &format!("{}.if", path))?;

    let then = parse_branch(obj, "then", path)?
        .ok_or_else(|| ParseError::new(path, "ifthen is missing its 'then' list"))?;
    let otherwise = parse_branch(obj, "else", path)?.unwrap_or_default();

    Ok(Expr::IfThen {
        cond: Box::new(cond),
        then,
        otherwise,
    })
}

fn parse_branch(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<Option<Vec<Expr>>, ParseError> {
    let Some(value) = obj.get(field) else {
        return Ok(None);
    };
    let entries = value.as_array().ok_or_else(|| {
        ParseError::new(&format!("{}.{}", path, field), "expected a list of expressions")
    })?;
    let mut branch = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        branch.push(parse_expr(entry, &format!("{}.{}[{}]", path, field, i))?);
    }
    Ok(Some(branch))
}

fn parse_set(obj: &Map<String, Value>, path: &str) -> Result<Expr, ParseError> {
    let symbol = require_string(obj, "symbol", path)?;
    let value = obj
        .get("value")
        .ok_or_else(|| ParseError::new(path, "set is missing its 'value' field"))?;
    let value = parse_expr(value, &format!("{}.value", path))?;
    Ok(Expr::Set {
        symbol,
        value: Box::new(value),
    })
}

fn parse_call(function: &str, obj: &Map<String, Value>, path: &str) -> Result<Expr, ParseError> {
    let mut params = BTreeMap::new();
    for (name, value) in obj {
        if name == "function" {
            continue;
        }
        let param_path = format!("{}.{}", path, name);
        let param = parse_param(name, value, &param_path)?;
        params.insert(name.clone(), param);
    }
    Ok(Expr::Call(Call {
        function: function.to_string(),
        params,
    }))
}

fn parse_param(name: &str, value: &Value, path: &str) -> Result<Param, ParseError> {
    match name {
        "args" => {
            let entries = value
                .as_array()
                .ok_or_else(|| ParseError::new(path, "expected a list of expressions"))?;
            let mut args = Vec::with_capacity(entries.len());
            for (i, entry) in entries.iter().enumerate() {
                args.push(parse_expr(entry, &format!("{}[{}]", path, i))?);
            }
            Ok(Param::List(args))
        }
        "instrument" => {
            let inst: Instrument = serde_json::from_value(value.clone())
                .map_err(|e| ParseError::new(path, format!("invalid instrument: {}", e)))?;
            Ok(Param::Instrument(inst))
        }
        "candletime" => {
            let time: CandleTime = serde_json::from_value(value.clone())
                .map_err(|_| ParseError::new(path, "invalid candle time"))?;
            Ok(Param::Time(time))
        }
        "exchange" => {
            let exchange: Exchange = serde_json::from_value(value.clone())
                .map_err(|_| ParseError::new(path, "invalid exchange"))?;
            Ok(Param::Exchange(exchange))
        }
        _ => match value {
            Value::String(s) => Ok(Param::Str(s.clone())),
            Value::Number(_) | Value::Object(_) => Ok(Param::Expr(parse_expr(value, path)?)),
            _ => Err(ParseError::new(
                path,
                "expected a number, string or expression object",
            )),
        },
    }
}

fn require_string(obj: &Map<String, Value>, field: &str, path: &str) -> Result<String, ParseError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ParseError::new(path, format!("missing string field '{}'", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::AssetKind;

    fn parse(json: &str) -> Expr {
        parse_expr(&serde_json::from_str(json).unwrap(), "strategy").unwrap()
    }

    fn parse_err(json: &str) -> ParseError {
        parse_expr(&serde_json::from_str(json).unwrap(), "strategy").unwrap_err()
    }

    #[test]
    fn number_parses_to_literal() {
        assert_eq!(parse("42.5"), Expr::Num(42.5));
        assert_eq!(parse("-3"), Expr::Num(-3.0));
    }

    #[test]
    fn call_with_nested_args() {
        let expr = parse(
            r#"{"function": ">", "args": [{"function": "+", "args": [1, 2]}, 100]}"#,
        );
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        assert_eq!(call.function, ">");
        let Some(Param::List(args)) = call.params.get("args") else {
            panic!("expected args list");
        };
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], Expr::Call(_)));
        assert_eq!(args[1], Expr::Num(100.0));
    }

    #[test]
    fn get_candle_parses_typed_params() {
        let expr = parse(
            r#"{
                "function": "Get Candle",
                "instrument": {"name": "Reliance", "type": "equity", "ticker": "RELIANCE"},
                "candletime": "1day",
                "index": 0,
                "key": "close"
            }"#,
        );
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        assert_eq!(call.instrument().unwrap().kind, AssetKind::Equity);
        assert_eq!(call.candletime().unwrap(), CandleTime::Day1);
        assert_eq!(call.key(), Some("close"));
    }

    #[test]
    fn ifthen_with_optional_else() {
        let expr = parse(r#"{"function": "ifthen", "if": 1, "then": [5]}"#);
        let Expr::IfThen { otherwise, .. } = expr else {
            panic!("expected ifthen");
        };
        assert!(otherwise.is_empty());

        let expr = parse(r#"{"function": "ifthen", "if": 0, "then": [5], "else": [7, 8]}"#);
        let Expr::IfThen { otherwise, .. } = expr else {
            panic!("expected ifthen");
        };
        assert_eq!(otherwise, vec![Expr::Num(7.0), Expr::Num(8.0)]);
    }

    #[test]
    fn set_stores_value_unparsed_shape() {
        let expr = parse(
            r#"{"function": "set", "symbol": "x", "value": {"function": "get", "symbol": "y"}}"#,
        );
        assert_eq!(
            expr,
            Expr::Set {
                symbol: "x".into(),
                value: Box::new(Expr::Get { symbol: "y".into() }),
            }
        );
    }

    #[test]
    fn unknown_function_names_are_accepted() {
        let expr = parse(r#"{"function": "Quantum Flux", "period": 3}"#);
        assert!(matches!(expr, Expr::Call(c) if c.function == "Quantum Flux"));
    }

    #[test]
    fn error_paths_point_at_offending_node() {
        let err = parse_err(r#"{"function": "ifthen", "if": 1, "then": [true]}"#);
        assert_eq!(err.path, "strategy.then[0]");

        let err = parse_err(
            r#"{"function": "ifthen", "if": {"function": "AND", "args": 5}, "then": []}"#,
        );
        assert_eq!(err.path, "strategy.if.args");
    }

    #[test]
    fn bad_candletime_is_a_parse_error() {
        let err = parse_err(
            r#"{
                "function": "SMA",
                "instrument": {"name": "R", "type": "equity", "ticker": "R"},
                "candletime": "2day",
                "period": 14
            }"#,
        );
        assert_eq!(err.path, "strategy.candletime");
    }

    #[test]
    fn missing_function_field_is_a_parse_error() {
        let err = parse_err(r#"{"if": 1, "then": []}"#);
        assert!(err.message.contains("function"));
    }

    #[test]
    fn strategy_document_round_trip() {
        let strategy = parse_strategy(
            r#"{
                "name": "Breakout",
                "author": "test",
                "strategy": {"function": "ifthen", "if": 1, "then": [42]}
            }"#,
        )
        .unwrap();
        assert_eq!(strategy.name, "Breakout");
        assert_eq!(strategy.author, "test");
        assert!(matches!(strategy.root, Expr::IfThen { .. }));
    }

    #[test]
    fn strategy_root_must_be_ifthen() {
        let err = parse_strategy(
            r#"{"name": "n", "author": "a", "strategy": {"function": "+", "args": [1]}}"#,
        )
        .unwrap_err();
        assert_eq!(err.path, "strategy");
        assert!(err.message.contains("ifthen"));
    }

    #[test]
    fn strategy_document_requires_name_and_author() {
        let err = parse_strategy(
            r#"{"author": "a", "strategy": {"function": "ifthen", "if": 1, "then": []}}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("'name'"));
    }
}
