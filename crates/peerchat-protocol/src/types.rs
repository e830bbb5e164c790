//! Core protocol types for PeerChat's wire format.
//!
//! Every value that travels over a link is an [`Envelope`]: a tagged
//! [`Payload`] plus the sender stamp (who, under which display name, when).
//! The JSON shape is fixed and is what browsers and other peers speak:
//!
//! ```text
//! {
//!   "event": "chat" | "status" | "name" | "all-history",
//!   "payload": { ...variant fields... },
//!   "timestamp": 1700000000000,
//!   "sender": "<peer id>",
//!   "senderName": "Alice"
//! }
//! ```

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use peerchat_transport::PeerId;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which side of the hub-and-spoke topology a participant is on.
///
/// The host keeps the authoritative history and relays chat between
/// clients. A client only ever links to one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Client => f.write_str("client"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionStatus
// ---------------------------------------------------------------------------

/// Whether a peer link is up. Also the body of a `status` history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

// ---------------------------------------------------------------------------
// Event — the bare tag
// ---------------------------------------------------------------------------

/// The tag of a message, without its payload.
///
/// UI code names the kind of message it wants to send with an `Event` and
/// supplies the matching [`Payload`]; [`Envelope::build`] checks the two
/// agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Event {
    Chat,
    Status,
    Name,
    AllHistory,
}

impl Event {
    /// The wire spelling of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Status => "status",
            Self::Name => "name",
            Self::AllHistory => "all-history",
        }
    }

    /// `true` for the kinds that are kept in chat history.
    ///
    /// `Name` and `AllHistory` are control messages and never stored.
    pub fn is_history(self) -> bool {
        matches!(self, Self::Chat | Self::Status)
    }

    /// Whether a participant in `role` may originate this kind.
    ///
    /// Join/leave lines and history replays come from the host only.
    pub fn permitted_for(self, role: Role) -> bool {
        match self {
            Self::Chat | Self::Name => true,
            Self::Status | Self::AllHistory => role == Role::Host,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload — what's inside an envelope
// ---------------------------------------------------------------------------

/// The variant-specific content of a message.
///
/// `#[serde(tag = "event", content = "payload")]` makes this "adjacently
/// tagged": the variant name goes in `event` and its fields in `payload`.
/// Flattened into [`Envelope`], that yields the top-level wire shape above.
/// An unknown `event` value fails to decode instead of being guessed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Payload {
    /// User-authored text.
    Chat { content: String },

    /// Host announcement that a client joined or left.
    #[serde(rename_all = "camelCase")]
    Status {
        status: ConnectionStatus,
        client_id: PeerId,
        client_name: String,
    },

    /// The sender's current display name.
    Name { name: String },

    /// The host's retained history, replayed once per new link.
    AllHistory { messages: Vec<Envelope> },
}

impl Payload {
    /// Shorthand for a chat payload.
    pub fn chat(content: impl Into<String>) -> Self {
        Self::Chat {
            content: content.into(),
        }
    }

    /// Shorthand for a name payload.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name { name: name.into() }
    }

    /// Shorthand for a status payload.
    pub fn status(
        status: ConnectionStatus,
        client_id: PeerId,
        client_name: impl Into<String>,
    ) -> Self {
        Self::Status {
            status,
            client_id,
            client_name: client_name.into(),
        }
    }

    /// The tag this payload travels under.
    pub fn event(&self) -> Event {
        match self {
            Self::Chat { .. } => Event::Chat,
            Self::Status { .. } => Event::Status,
            Self::Name { .. } => Event::Name,
            Self::AllHistory { .. } => Event::AllHistory,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope — the top-level wire format
// ---------------------------------------------------------------------------

/// One immutable, timestamped message.
///
/// ```text
/// ┌──────────────────────────────────┐
/// │ timestamp: 1700000000000         │  ← epoch milliseconds
/// │ sender: "9f2c…"                  │  ← peer identity
/// │ senderName: "Alice"              │  ← display name at send time
/// │ ┌──────────────────────────────┐ │
/// │ │ event + payload              │ │  ← the actual content
/// │ └──────────────────────────────┘ │
/// └──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(flatten)]
    pub payload: Payload,
    pub timestamp: u64,
    pub sender: PeerId,
    pub sender_name: String,
}

impl Envelope {
    /// Stamps a payload. Performs no role or tag checks.
    pub fn new(
        payload: Payload,
        sender: PeerId,
        sender_name: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            payload,
            timestamp,
            sender,
            sender_name: sender_name.into(),
        }
    }

    /// Builds an envelope for an outgoing intent.
    ///
    /// # Errors
    /// - [`ProtocolError::EventMismatch`] if `payload` is not of kind `event`
    /// - [`ProtocolError::NotPermitted`] if `role` may not originate `event`
    pub fn build(
        event: Event,
        payload: Payload,
        role: Role,
        sender: PeerId,
        sender_name: impl Into<String>,
        timestamp: u64,
    ) -> Result<Self, ProtocolError> {
        let found = payload.event();
        if found != event {
            return Err(ProtocolError::EventMismatch {
                expected: event,
                found,
            });
        }
        if !event.permitted_for(role) {
            return Err(ProtocolError::NotPermitted { event, role });
        }
        Ok(Self::new(payload, sender, sender_name, timestamp))
    }

    /// The tag of this envelope.
    pub fn event(&self) -> Event {
        self.payload.event()
    }

    /// `true` if this message belongs in chat history.
    pub fn is_history(&self) -> bool {
        self.event().is_history()
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// A clock set before 1970 reads as 0 rather than failing.
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn pid(id: &str) -> PeerId {
        PeerId::new(id)
    }

    fn chat(content: &str) -> Envelope {
        Envelope::new(Payload::chat(content), pid("c1"), "Alice", 1_000)
    }

    #[test]
    fn test_chat_envelope_wire_shape() {
        let value = serde_json::to_value(chat("hi")).unwrap();

        assert_eq!(
            value,
            json!({
                "event": "chat",
                "payload": { "content": "hi" },
                "timestamp": 1000,
                "sender": "c1",
                "senderName": "Alice",
            })
        );
    }

    #[test]
    fn test_status_payload_uses_camel_case_fields() {
        let env = Envelope::new(
            Payload::status(ConnectionStatus::Disconnected, pid("c2"), "Bob"),
            pid("h"),
            "Host",
            5,
        );

        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["event"], "status");
        assert_eq!(
            value["payload"],
            json!({ "status": "disconnected", "clientId": "c2", "clientName": "Bob" })
        );
    }

    #[test]
    fn test_all_history_nests_full_envelopes() {
        let env = Envelope::new(
            Payload::AllHistory {
                messages: vec![chat("a"), chat("b")],
            },
            pid("h"),
            "Host",
            9,
        );

        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["event"], "all-history");
        let nested = value["payload"]["messages"].as_array().unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[1]["payload"]["content"], "b");
        assert_eq!(nested[1]["senderName"], "Alice");
    }

    #[test]
    fn test_decode_foreign_json_name_message() {
        // Field order differs from ours; only the names matter.
        let raw = r#"{"sender":"c9","senderName":"Zed","timestamp":42,
                      "payload":{"name":"Zed"},"event":"name"}"#;

        let env: Envelope = serde_json::from_str(raw).unwrap();

        assert_eq!(env.payload, Payload::name("Zed"));
        assert_eq!(env.sender, pid("c9"));
        assert_eq!(env.timestamp, 42);
    }

    #[test]
    fn test_decode_all_history_restores_nested_messages() {
        let original = Envelope::new(
            Payload::AllHistory {
                messages: vec![chat("x")],
            },
            pid("h"),
            "Host",
            3,
        );
        let text = serde_json::to_string(&original).unwrap();

        let decoded: Envelope = serde_json::from_str(&text).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_unknown_event_fails() {
        let raw = json!({
            "event": "typing",
            "payload": {},
            "timestamp": 1,
            "sender": "c1",
            "senderName": "Alice",
        });

        let result: Result<Envelope, _> = serde_json::from_value::<Envelope>(raw);

        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_sender_fails() {
        let raw: Value = json!({ "event": "chat", "payload": { "content": "x" }, "timestamp": 1 });

        assert!(serde_json::from_value::<Envelope>(raw).is_err());
    }

    #[test]
    fn test_build_matching_event_succeeds() {
        let env = Envelope::build(
            Event::Chat,
            Payload::chat("hello"),
            Role::Client,
            pid("c1"),
            "Alice",
            7,
        )
        .unwrap();

        assert_eq!(env.event(), Event::Chat);
        assert_eq!(env.sender_name, "Alice");
    }

    #[test]
    fn test_build_mismatched_event_rejected() {
        let result = Envelope::build(
            Event::Name,
            Payload::chat("oops"),
            Role::Host,
            pid("h"),
            "Host",
            7,
        );

        assert!(matches!(
            result,
            Err(ProtocolError::EventMismatch { expected: Event::Name, found: Event::Chat })
        ));
    }

    #[test]
    fn test_build_client_status_not_permitted() {
        let result = Envelope::build(
            Event::Status,
            Payload::status(ConnectionStatus::Connected, pid("c1"), "Alice"),
            Role::Client,
            pid("c1"),
            "Alice",
            7,
        );

        assert!(matches!(
            result,
            Err(ProtocolError::NotPermitted { event: Event::Status, role: Role::Client })
        ));
    }

    #[test]
    fn test_only_chat_and_status_are_history() {
        assert!(Event::Chat.is_history());
        assert!(Event::Status.is_history());
        assert!(!Event::Name.is_history());
        assert!(!Event::AllHistory.is_history());
    }

    #[test]
    fn test_event_as_str_matches_serde() {
        for event in [Event::Chat, Event::Status, Event::Name, Event::AllHistory] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_timestamp_now_is_after_2020() {
        assert!(timestamp_now() > 1_577_836_800_000);
    }
}
