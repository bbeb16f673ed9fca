//! Order-status polling

pub mod error;
pub mod helpers;
pub mod http;

pub use error::PollError;
pub use http::{HttpPoller, DEFAULT_API_BASE_URL};

use crate::domain::{OrderId, OrderSnapshot};
use async_trait::async_trait;

/// Anything that can fetch the current state of an order
#[async_trait]
pub trait OrderStatusSource: Send + Sync {
    async fn poll(&self, access_token: &str, order_id: OrderId) -> Result<OrderSnapshot, PollError>;
}
