//! Sync channel: shape broadcast over the room's duplex connection.
//!
//! DESIGN
//! ======
//! The wire carries JSON text messages tagged by `type`. Local shapes go out
//! as `{"type":"chat","message":"<shape json>","roomId":n}`; the same message
//! arriving from a peer is decoded back into a shape. Every other type is
//! somebody else's concern and is ignored here.
//!
//! The transport is a trait so the engine can run against a browser
//! WebSocket, an in-memory channel in tests, or anything else that can send
//! a text frame. Merge policy is last write observed wins per shape id: an
//! inbound shape replaces the local shape with the same id, and shapes with a
//! new id are appended in arrival order.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use futures::channel::mpsc::UnboundedSender;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::shape::Shape;

/// Numeric room identifier assigned by the room service.
pub type RoomId = i64;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The message was not valid JSON or did not match the expected shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The embedded shape parsed but its geometry is unusable.
    #[error("invalid shape {id}: non-finite or empty geometry")]
    InvalidShape { id: String },
    /// The transport is closed and can no longer send.
    #[error("transport closed")]
    Closed,
    /// The transport refused the frame.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound wire messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessage {
    #[serde(rename = "join_room")]
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    #[serde(rename = "chat")]
    Chat {
        /// JSON-encoded [`Shape`].
        message: String,
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
}

/// Anything that can carry a text frame to the room.
pub trait Transport {
    /// Send one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the frame cannot be handed to the transport.
    fn send_text(&self, text: &str) -> Result<(), SyncError>;
}

impl Transport for UnboundedSender<String> {
    fn send_text(&self, text: &str) -> Result<(), SyncError> {
        self.unbounded_send(text.to_owned()).map_err(|_| SyncError::Closed)
    }
}

/// An inbound message after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A peer's shape, already backfilled.
    Shape(Shape),
    /// A message of another type, carrying its `type` tag.
    Ignored(String),
}

/// Loose envelope so unknown types and extra fields parse.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns [`SyncError::Malformed`] if the frame or the embedded shape fails
/// to parse, and [`SyncError::InvalidShape`] if the shape is structurally
/// invalid (for example a negative radius).
pub fn decode_inbound(text: &str) -> Result<Inbound, SyncError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.kind != "chat" {
        return Ok(Inbound::Ignored(envelope.kind));
    }
    let message = envelope.message.unwrap_or_default();
    let mut shape: Shape = serde_json::from_str(&message)?;
    if !shape.is_valid() {
        return Err(SyncError::InvalidShape { id: shape.id });
    }
    shape.backfill();
    Ok(Inbound::Shape(shape))
}

/// Room-scoped sender with an idempotent join guard.
pub struct SyncChannel {
    room_id: RoomId,
    transport: Box<dyn Transport>,
    joined: bool,
}

impl SyncChannel {
    #[must_use]
    pub fn new(room_id: RoomId, transport: Box<dyn Transport>) -> Self {
        Self { room_id, transport, joined: false }
    }

    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    #[must_use]
    pub fn has_joined(&self) -> bool {
        self.joined
    }

    /// Announce this client to the room once the socket is ready.
    ///
    /// Sends at most one `join_room` per channel. Returns `true` only for the
    /// call that actually sent it.
    pub fn join(&mut self, ready: bool) -> bool {
        if !ready || self.joined {
            return false;
        }
        if self.send(&WireMessage::JoinRoom { room_id: self.room_id }) {
            self.joined = true;
            info!(room_id = self.room_id, "sync: joined room");
        }
        self.joined
    }

    /// Send one committed shape to the room.
    pub fn broadcast_shape(&self, shape: &Shape) -> bool {
        match serde_json::to_string(shape) {
            Ok(message) => self.send(&WireMessage::Chat { message, room_id: self.room_id }),
            Err(e) => {
                warn!(error = %e, id = %shape.id, "sync: failed to encode shape");
                false
            }
        }
    }

    /// Re-send every shape individually so peers converge on the same list.
    ///
    /// Returns the number of shapes sent.
    pub fn broadcast_shapes(&self, shapes: &[Shape]) -> usize {
        shapes.iter().filter(|s| self.broadcast_shape(s)).count()
    }

    fn send(&self, msg: &WireMessage) -> bool {
        let text = match serde_json::to_string(msg) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "sync: failed to encode message");
                return false;
            }
        };
        match self.transport.send_text(&text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, room_id = self.room_id, "sync: send failed");
                false
            }
        }
    }
}
