//! End-to-end evaluation through the context with in-memory collaborators.

mod common;

use common::{eval_json, harness, INSTRUMENT};
use quantdsl::adapters::sim_broker_adapter::Side;
use quantdsl::domain::context::FeedSpec;
use quantdsl::domain::error::EvalError;
use quantdsl::domain::eval::evaluate;
use quantdsl::domain::market::{AssetKind, CandleTime, Instrument};
use quantdsl::domain::strategy::Strategy;
use std::rc::Rc;

fn get_candle(index: i64, key: &str) -> String {
    format!(
        r#"{{"function": "Get Candle", "instrument": {INSTRUMENT}, "candletime": "1day", "index": {index}, "key": "{key}"}}"#
    )
}

#[test]
fn one_feed_serves_every_index_and_key() {
    let mut h = harness(vec![100.0, 101.0, 102.0]);
    h.clock.set(1);

    let json = format!(
        r#"{{"function": "+", "args": [{}, {}]}}"#,
        get_candle(0, "close"),
        get_candle(-1, "open"),
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 201.0);
    assert_eq!(h.supplier.constructed.get(), 1);
    assert_eq!(h.ctx.feed_count(), 1);
}

#[test]
fn distinct_candletimes_are_distinct_feeds() {
    let mut h = harness(vec![100.0]);

    let json = format!(
        r#"{{"function": "+", "args": [
            {},
            {{"function": "Get Candle", "instrument": {INSTRUMENT}, "candletime": "5min", "index": 0, "key": "close"}}
        ]}}"#,
        get_candle(0, "close"),
    );
    eval_json(&mut h.ctx, &json).unwrap();
    assert_eq!(h.supplier.constructed.get(), 2);
    assert_eq!(h.ctx.feed_count(), 2);
}

#[test]
fn indicator_lines_share_one_computation() {
    let mut h = harness(vec![100.0; 30]);

    let json = format!(
        r#"{{"function": "-", "args": [
            {{"function": "DMI", "instrument": {INSTRUMENT}, "candletime": "1day", "period": 14, "key": "plus"}},
            {{"function": "DMI", "instrument": {INSTRUMENT}, "candletime": "1day", "period": 14, "key": "minus"}}
        ]}}"#
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 0.0);

    let keys = h.engine.constructed_keys.borrow();
    assert_eq!(keys.as_slice(), ["DMI(period=14) on RELIANCE:equity@1day"]);
    assert_eq!(h.ctx.indicator_count(), 1);
    assert_eq!(h.supplier.constructed.get(), 1);
}

#[test]
fn different_parameters_are_different_indicators() {
    let mut h = harness(vec![100.0; 30]);

    let json = format!(
        r#"{{"function": "-", "args": [
            {{"function": "SMA", "instrument": {INSTRUMENT}, "candletime": "1day", "period": 10}},
            {{"function": "SMA", "instrument": {INSTRUMENT}, "candletime": "1day", "period": 20}}
        ]}}"#
    );
    eval_json(&mut h.ctx, &json).unwrap();
    assert_eq!(h.engine.constructed_keys.borrow().len(), 2);
    assert_eq!(h.ctx.indicator_count(), 2);
}

#[test]
fn indicator_value_flows_into_comparison() {
    let mut h = harness(vec![100.0; 30]);
    h.engine.value.set(42.0);

    let json = format!(
        r#"{{"function": ">", "args": [
            {{"function": "SMA", "instrument": {INSTRUMENT}, "candletime": "1day", "period": 5}},
            40
        ]}}"#
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 1.0);
}

#[test]
fn false_condition_never_reaches_the_broker() {
    let mut h = harness(vec![100.0]);

    let json = format!(
        r#"{{
            "function": "ifthen",
            "if": {{"function": ">", "args": [{}, 1000]}},
            "then": [{{"function": "Place Market Order", "instrument": {INSTRUMENT}, "quantity": 10}}]
        }}"#,
        get_candle(0, "close"),
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 0.0);
    assert!(h.broker.borrow().orders().is_empty());
}

#[test]
fn breakout_strategy_buys_once() {
    let mut h = harness(vec![95.0, 105.0]);

    let doc = format!(
        r#"{{
            "name": "Breakout",
            "author": "test",
            "strategy": {{
                "function": "ifthen",
                "if": {{"function": ">", "args": [{}, 100]}},
                "then": [{{"function": "Place Market Order", "instrument": {INSTRUMENT}, "quantity": 10}}]
            }}
        }}"#,
        get_candle(0, "close"),
    );
    let strategy = Strategy::from_json(&doc).unwrap();

    for step in 0..2 {
        h.clock.set(step);
        if step > 0 {
            h.account.record_step();
        }
        let mut root = strategy.root.clone();
        evaluate(&mut h.ctx, &mut root).unwrap();
    }

    let broker = h.broker.borrow();
    let orders = broker.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].side, Side::Buy);
    assert_eq!(orders[0].size, 10.0);
    assert_eq!(orders[0].limit_price, None);
    assert_eq!(orders[0].feed.label(), "RELIANCE:equity@1day");

    // the order trades against the same feed handle the condition read
    drop(broker);
    let spec = FeedSpec {
        instrument: Instrument {
            name: "Reliance".into(),
            kind: AssetKind::Equity,
            ticker: "RELIANCE".into(),
        },
        candletime: CandleTime::Day1,
    };
    let feed = h.ctx.resolve_feed(&spec).unwrap();
    assert!(Rc::ptr_eq(&h.broker.borrow().orders()[0].feed, &feed));
    assert_eq!(h.supplier.constructed.get(), 1);
}

#[test]
fn negative_quantity_sells_with_a_limit() {
    let mut h = harness(vec![100.0]);

    let json = format!(
        r#"{{"function": "Place Limit Order", "instrument": {INSTRUMENT}, "quantity": -3, "limit_price": 98}}"#
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 1.0);

    let broker = h.broker.borrow();
    let orders = broker.orders();
    assert_eq!(orders[0].side, Side::Sell);
    assert_eq!(orders[0].size, 3.0);
    assert_eq!(orders[0].limit_price, Some(98.0));
}

#[test]
fn bound_expression_tracks_live_account_state() {
    let mut h = harness(vec![100.0, 100.0]);

    let set = r#"{"function": "set", "symbol": "budget", "value": {"function": "/", "args": [{"function": "Get Capital"}, 10]}}"#;
    let get = r#"{"function": "get", "symbol": "budget"}"#;

    assert_eq!(eval_json(&mut h.ctx, set).unwrap(), 1.0);
    assert_eq!(eval_json(&mut h.ctx, get).unwrap(), 10_000.0);

    h.account.set_capital(50_000.0);
    h.clock.set(1);
    h.account.record_step();
    assert_eq!(eval_json(&mut h.ctx, get).unwrap(), 5_000.0);
}

#[test]
fn division_by_zero_aborts_the_pass() {
    let mut h = harness(vec![100.0]);

    let json = r#"{
        "function": "ifthen",
        "if": 1,
        "then": [{"function": "/", "args": [10, 0]}]
    }"#;
    assert!(matches!(
        eval_json(&mut h.ctx, json),
        Err(EvalError::DivisionByZero)
    ));
}

#[test]
fn unknown_function_reads_zero_after_running_its_arguments() {
    let mut h = harness(vec![100.0]);

    let json = format!(
        r#"{{"function": "Quantum Flux", "args": [
            {{"function": "Place Market Order", "instrument": {INSTRUMENT}, "quantity": 5}}
        ]}}"#
    );
    assert_eq!(eval_json(&mut h.ctx, &json).unwrap(), 0.0);
    assert_eq!(h.broker.borrow().orders().len(), 1);
}

#[test]
fn unknown_instrument_is_a_feed_error() {
    let mut h = harness(vec![100.0]);

    let json = r#"{
        "function": "Get Candle",
        "instrument": {"name": "Tcs", "type": "equity", "ticker": "TCS"},
        "candletime": "1day",
        "key": "close"
    }"#;
    assert!(matches!(
        eval_json(&mut h.ctx, json),
        Err(EvalError::FeedConstruct { .. })
    ));
}

#[test]
fn reading_before_the_first_step_is_out_of_range() {
    let mut h = harness(vec![100.0, 101.0]);

    assert!(matches!(
        eval_json(&mut h.ctx, &get_candle(-1, "close")),
        Err(EvalError::IndexOutOfRange { .. })
    ));

    h.clock.set(1);
    assert_eq!(eval_json(&mut h.ctx, &get_candle(-1, "close")).unwrap(), 100.0);
}
