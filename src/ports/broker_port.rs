//! Broker gateway port: the one externally observable side effect.

use crate::domain::error::EvalError;
use crate::ports::feed_port::FeedHandle;

pub type OrderId = u64;

/// Order placement against the instrument a feed tracks. `size` is always
/// positive; direction is carried by the method. A `limit_price` switches
/// the order type from market to limit.
pub trait BrokerGateway {
    fn buy(
        &mut self,
        feed: &FeedHandle,
        size: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderId, EvalError>;

    fn sell(
        &mut self,
        feed: &FeedHandle,
        size: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderId, EvalError>;
}
