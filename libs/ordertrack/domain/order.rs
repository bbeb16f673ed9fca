//! Order domain model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque order identifier assigned by the store
pub type OrderId = i64;

/// Lifecycle status of a payment order
///
/// `Done` and `Canceled` are terminal. Anything the server sends that is not
/// one of the known strings is kept as `Unknown` and treated as "keep waiting".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Paid,
    Done,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Map a raw status string; never fails
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => OrderStatus::New,
            "paid" => OrderStatus::Paid,
            "done" => OrderStatus::Done,
            "canceled" => OrderStatus::Canceled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Paid => "paid",
            OrderStatus::Done => "done",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of an order as returned by the status endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// Order contents exactly as the server sent them
    pub content: serde_json::Value,
}
