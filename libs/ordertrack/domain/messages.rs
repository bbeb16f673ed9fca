//! Wire messages exchanged with the push service

use super::order::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};

/// First frame sent on every new connection
///
/// Serializes as
/// `{"connect":{"data":{"auth":"<token>","project_id":<int>},"id":<corr>}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionHandshake {
    pub connect: ConnectRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectRequest {
    pub data: ConnectData,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectData {
    pub auth: String,
    pub project_id: u64,
}

impl ConnectionHandshake {
    pub fn new(auth_token: impl Into<String>, project_id: u64, correlation_id: u32) -> Self {
        Self {
            connect: ConnectRequest {
                data: ConnectData {
                    auth: auth_token.into(),
                    project_id,
                },
                id: correlation_id,
            },
        }
    }

    /// Build a handshake with a fresh random correlation id
    pub fn with_random_id(auth_token: impl Into<String>, project_id: u64) -> Self {
        Self::new(auth_token, project_id, rand::random::<u32>())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// `{"push": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct PushFrame {
    pub push: PushBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushBody {
    #[serde(rename = "pub")]
    pub publication: Publication,
    #[serde(default)]
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Publication {
    pub data: PushData,
    #[serde(default)]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushData {
    pub order_id: OrderId,
    pub status: String,
}

/// A decoded order-status push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEnvelope {
    pub order_id: OrderId,
    /// Status string as received
    pub raw_status: String,
    pub channel: String,
}

impl PushEnvelope {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse(&self.raw_status)
    }
}

impl From<PushFrame> for PushEnvelope {
    fn from(frame: PushFrame) -> Self {
        Self {
            order_id: frame.push.publication.data.order_id,
            raw_status: frame.push.publication.data.status,
            channel: frame.push.channel,
        }
    }
}
