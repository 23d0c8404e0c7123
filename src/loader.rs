//! Persisted-shapes loader.
//!
//! The room service stores every broadcast shape as a chat record and serves
//! them back as `{"chats":[{"message":"<shape json>"}, ...]}` from
//! `GET {http_url}/chats/{roomId}`. Records that fail to parse or carry
//! invalid geometry are skipped so one bad row never blocks the session.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use serde::Deserialize;
use tracing::warn;

use crate::shape::Shape;
use crate::sync::RoomId;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("room service returned status {0}")]
    Status(u16),
}

/// One stored record.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRecord {
    pub message: String,
}

/// Body of the persisted-shapes response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatsResponse {
    #[serde(default)]
    pub chats: Vec<ChatRecord>,
}

/// Parse stored records into shapes, in order, backfilling id and color.
/// Invalid shapes are dropped.
#[must_use]
pub fn shapes_from_records(records: &[ChatRecord]) -> Vec<Shape> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_str::<Shape>(&record.message) {
            Ok(shape) if !shape.is_valid() => {
                warn!(index, id = %shape.id, "loader: skipping record with invalid geometry");
                None
            }
            Ok(mut shape) => {
                shape.backfill();
                Some(shape)
            }
            Err(e) => {
                warn!(error = %e, index, "loader: skipping unparseable record");
                None
            }
        })
        .collect()
}

/// Build the persisted-shapes URL for a room.
#[must_use]
pub fn chats_url(http_url: &str, room_id: RoomId) -> String {
    format!("{}/chats/{room_id}", http_url.trim_end_matches('/'))
}

/// Fetch and parse the persisted shapes for a room.
///
/// # Errors
///
/// Returns [`LoadError`] if the request fails, the service answers with a
/// non-success status, or the body is not a chats response.
pub async fn fetch_room_shapes(
    client: &reqwest::Client,
    http_url: &str,
    room_id: RoomId,
) -> Result<Vec<Shape>, LoadError> {
    let response = client.get(chats_url(http_url, room_id)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    let body: ChatsResponse = response.json().await?;
    Ok(shapes_from_records(&body.chats))
}

/// Fetch persisted shapes, degrading to an empty canvas on any failure.
pub async fn load_room_shapes(client: &reqwest::Client, http_url: &str, room_id: RoomId) -> Vec<Shape> {
    match fetch_room_shapes(client, http_url, room_id).await {
        Ok(shapes) => shapes,
        Err(e) => {
            warn!(error = %e, room_id, "loader: falling back to empty canvas");
            Vec::new()
        }
    }
}
