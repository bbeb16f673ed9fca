//! Inbound frame classification

use crate::domain::{PushEnvelope, PushFrame};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Malformed push frame: {0}")]
    MalformedPush(String),
}

/// What an inbound text frame turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    /// An order-status publication
    Push(PushEnvelope),
    /// The server's reply to our handshake
    ConnectAck,
    /// Valid JSON the tracker protocol has no use for
    Unrecognized,
}

pub fn decode_frame(raw: &str) -> Result<DecodedFrame, FrameError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| FrameError::InvalidJson(e.to_string()))?;

    if value.get("push").map_or(false, |p| p.is_object()) {
        let frame: PushFrame =
            serde_json::from_value(value).map_err(|e| FrameError::MalformedPush(e.to_string()))?;
        return Ok(DecodedFrame::Push(frame.into()));
    }

    if value.get("connect").map_or(false, |c| c.is_object()) {
        return Ok(DecodedFrame::ConnectAck);
    }

    Ok(DecodedFrame::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_push() {
        let raw = r#"{"push":{"pub":{"data":{"order_id":9,"status":"done"},"offset":1},"channel":"c"}}"#;
        match decode_frame(raw).unwrap() {
            DecodedFrame::Push(envelope) => {
                assert_eq!(envelope.order_id, 9);
                assert_eq!(envelope.raw_status, "done");
            }
            other => panic!("expected push, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_connect_ack() {
        let raw = r#"{"id":12,"connect":{"client":"f00","version":"5.0.0","ping":25,"pong":true}}"#;
        assert_eq!(decode_frame(raw).unwrap(), DecodedFrame::ConnectAck);
    }

    #[test]
    fn test_decode_other_json_is_unrecognized() {
        assert_eq!(decode_frame(r#"{"error":{"code":101}}"#).unwrap(), DecodedFrame::Unrecognized);
        assert_eq!(decode_frame("[]").unwrap(), DecodedFrame::Unrecognized);
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(decode_frame("not json"), Err(FrameError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_push_missing_order_id() {
        let raw = r#"{"push":{"pub":{"data":{"status":"done"}},"channel":"c"}}"#;
        assert!(matches!(decode_frame(raw), Err(FrameError::MalformedPush(_))));
    }
}
