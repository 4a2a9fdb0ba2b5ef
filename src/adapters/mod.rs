//! Concrete adapter implementations for the collaborator ports.

pub mod csv_feed_adapter;
pub mod file_config_adapter;
pub mod indicator;
pub mod sim_account_adapter;
pub mod sim_broker_adapter;

use crate::domain::error::EvalError;

/// Translate a historical offset (`0` = current step, `-1` = previous) into
/// a position in a series whose cursor is the shared run clock. Future reads
/// and reads past the start of history are range errors.
pub(crate) fn series_position(
    cursor: usize,
    index: i64,
    len: usize,
    what: &str,
) -> Result<usize, EvalError> {
    let out_of_range = || EvalError::IndexOutOfRange {
        what: what.to_string(),
        index,
        len,
    };

    if index > 0 {
        return Err(out_of_range());
    }
    let position = cursor as i64 + index;
    if position < 0 || position as usize >= len {
        return Err(out_of_range());
    }
    Ok(position as usize)
}
