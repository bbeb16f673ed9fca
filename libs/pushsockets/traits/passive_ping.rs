/// Trait for detecting and responding to passive ping messages
///
/// Some push servers send heartbeat probes as regular text frames (not
/// WebSocket PING frames) and expect a text reply. The transport checks every
/// inbound text frame with `is_ping` and, on a match, writes the response
/// immediately and swallows the frame.
///
/// # Flow
/// ```text
/// Server ──["{}"]──> Transport
///                      │
///                      ├─> is_ping() -> true
///                      ├─> pong_response() -> "{}"
///                      │
/// Server <─["{}"]───── Transport (frame never reaches the event sink)
/// ```
pub trait PassivePingDetector: Send + Sync {
    /// Check if an inbound text frame is a heartbeat probe
    fn is_ping(&self, frame: &str) -> bool;

    /// The text frame to send back when `is_ping` matched
    fn pong_response(&self) -> String;
}

/// A detector that never matches
pub struct NoOpPassivePing;

impl PassivePingDetector for NoOpPassivePing {
    fn is_ping(&self, _frame: &str) -> bool {
        false
    }

    fn pong_response(&self) -> String {
        String::new()
    }
}

/// Exact-text passive ping detector
///
/// # Example
/// ```ignore
/// // Answer "{}" probes with "{}"
/// let detector = TextPassivePing::new("{}", "{}");
/// ```
pub struct TextPassivePing {
    ping_text: String,
    pong_response: String,
}

impl TextPassivePing {
    pub fn new(ping_text: impl Into<String>, pong_response: impl Into<String>) -> Self {
        Self {
            ping_text: ping_text.into(),
            pong_response: pong_response.into(),
        }
    }
}

impl PassivePingDetector for TextPassivePing {
    fn is_ping(&self, frame: &str) -> bool {
        frame.trim() == self.ping_text
    }

    fn pong_response(&self) -> String {
        self.pong_response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_ping_matches_empty_object() {
        let detector = TextPassivePing::new("{}", "{}");
        assert!(detector.is_ping("{}"));
        assert!(detector.is_ping(" {}\n"));
        assert!(!detector.is_ping(r#"{"connect":{}}"#));
        assert_eq!(detector.pong_response(), "{}");
    }

    #[test]
    fn test_noop_never_matches() {
        assert!(!NoOpPassivePing.is_ping("{}"));
    }
}
