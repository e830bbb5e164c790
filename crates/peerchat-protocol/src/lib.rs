//! Wire protocol for PeerChat.
//!
//! This crate defines the "language" peers speak over a link:
//!
//! - **Types** ([`Envelope`], [`Payload`], [`Event`], [`Role`]) — the
//!   tagged message structure and who may send what.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes become bytes.
//! - **Errors** ([`ProtocolError`]) — encode/decode failures and envelopes
//!   that break the rules.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session (routing, history)
//! ```
//!
//! The protocol layer sits between the transport, which moves opaque bytes
//! over a link, and the session, which decides who hears what. It knows
//! nothing about links, hosts or history. It only knows how an envelope
//! looks on the wire and which role may send which event.
//!
//! There is no version field: the envelope shape is the contract.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

// Each submodule is a single file next to this one (`src/codec.rs` and so
// on). None of them is `pub`: callers go through the re-exports below.

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// Everything public lives at the crate root, so callers write
// `peerchat_protocol::Envelope` and the file layout stays private.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ConnectionStatus, Envelope, Event, Payload, PeerId, Role, timestamp_now,
};
