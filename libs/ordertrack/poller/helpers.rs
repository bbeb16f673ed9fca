//! Response classification for the order-status endpoint
//!
//! Kept free of I/O so every branch can be tested without a server.

use super::error::PollError;
use crate::domain::{OrderId, OrderSnapshot, OrderStatus};
use serde::Deserialize;

pub const DESERIALIZE_FAILED: &str = "Can't deserialize server response";

/// Error body the store API returns on failures
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommerceError {
    status_code: Option<u16>,
    error_code: Option<i32>,
    error_message: Option<String>,
}

/// Build the status URL for one order
pub fn order_url(base_url: &str, project_id: u64, order_id: OrderId) -> String {
    format!(
        "{}/api/v2/project/{}/order/{}",
        base_url.trim_end_matches('/'),
        project_id,
        order_id
    )
}

/// Turn an HTTP status and body into a snapshot or a poll error
pub fn classify_response(
    status: u16,
    body: &str,
    order_id: OrderId,
) -> Result<OrderSnapshot, PollError> {
    if (200..300).contains(&status) {
        parse_snapshot(status, body, order_id)
    } else {
        Err(extract_api_error(status, body))
    }
}

fn parse_snapshot(status: u16, body: &str, order_id: OrderId) -> Result<OrderSnapshot, PollError> {
    let content: serde_json::Value =
        serde_json::from_str(body).map_err(|_| PollError::new(status, 0, DESERIALIZE_FAILED))?;

    let raw_status = content
        .get("status")
        .and_then(|s| s.as_str())
        .ok_or_else(|| PollError::new(status, 0, DESERIALIZE_FAILED))?;

    let order_id = content
        .get("order_id")
        .and_then(|id| id.as_i64())
        .unwrap_or(order_id);

    Ok(OrderSnapshot {
        order_id,
        status: OrderStatus::parse(raw_status),
        content,
    })
}

fn extract_api_error(status: u16, body: &str) -> PollError {
    match serde_json::from_str::<CommerceError>(body) {
        Ok(CommerceError {
            status_code,
            error_code,
            error_message: Some(message),
        }) => PollError::new(status_code.unwrap_or(status), error_code.unwrap_or(0), message),
        _ => PollError::new(
            status,
            0,
            format!("Invalid response. code={} error={}", status, body),
        ),
    }
}
