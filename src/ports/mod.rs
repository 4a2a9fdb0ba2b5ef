//! Port traits for the external collaborators.
//!
//! The evaluator core addresses four stateful, time-stepped subsystems by
//! stable identity: the feed supplier, the indicator engine, the broker
//! gateway and the account-state provider. All calls are synchronous and
//! return a value or fail immediately; latency belongs to the adapters.

pub mod account_port;
pub mod broker_port;
pub mod config_port;
pub mod feed_port;
pub mod indicator_port;
