//! Recording broker gateway for the simulated runner and tests.
//!
//! Orders are accepted unconditionally (no fills, no margin checks) and
//! logged in placement order. Negative sizes are rejected: direction is
//! carried by the method, size is a magnitude.

use crate::domain::error::EvalError;
use crate::ports::broker_port::{BrokerGateway, OrderId};
use crate::ports::feed_port::FeedHandle;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

pub struct OrderRecord {
    pub id: OrderId,
    pub side: Side,
    pub size: f64,
    pub limit_price: Option<f64>,
    pub feed: FeedHandle,
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {} x {}", self.id, self.side, self.feed.label(), self.size)?;
        match self.limit_price {
            Some(price) => write!(f, " limit {}", price),
            None => write!(f, " market"),
        }
    }
}

#[derive(Default)]
pub struct SimBroker {
    orders: Vec<OrderRecord>,
}

impl SimBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    fn place(
        &mut self,
        side: Side,
        feed: &FeedHandle,
        size: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderId, EvalError> {
        if size < 0.0 {
            return Err(EvalError::OrderRejected {
                reason: format!("negative {} size {}", side, size),
            });
        }
        let id = self.orders.len() as OrderId + 1;
        self.orders.push(OrderRecord {
            id,
            side,
            size,
            limit_price,
            feed: Rc::clone(feed),
        });
        Ok(id)
    }
}

impl BrokerGateway for SimBroker {
    fn buy(
        &mut self,
        feed: &FeedHandle,
        size: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderId, EvalError> {
        self.place(Side::Buy, feed, size, limit_price)
    }

    fn sell(
        &mut self,
        feed: &FeedHandle,
        size: f64,
        limit_price: Option<f64>,
    ) -> Result<OrderId, EvalError> {
        self.place(Side::Sell, feed, size, limit_price)
    }
}
