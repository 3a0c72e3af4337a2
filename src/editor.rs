//! Typed messages exchanged with an embedded image editor
//!
//! The editor is a black box reached only through messages. The host sends
//! [`HostMessage`]s and receives [`EditorMessage`]s; both serialize as
//! `{"type": ..., "message": ...}` objects. Nothing here drives the editor,
//! it only gives the messages a shape.

use crate::context::ProjectContext;
use crate::record::AssetRecord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Image payload carried by editor messages: a base64 f4 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorPayload(pub String);

impl EditorPayload {
    pub fn from_record(record: &AssetRecord) -> Self {
        Self(record.binary_data.clone())
    }

    /// Build an anonymous record from the payload.
    pub fn to_record(&self, ctx: &ProjectContext) -> AssetRecord {
        AssetRecord::from_data_string(&self.0, ctx, None, false, None)
    }
}

/// Host → editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum HostMessage {
    /// Load an image into the editor
    Initialize(EditorPayload),
    /// Ask the editor to report its current image
    Update,
}

/// Editor → host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum EditorMessage {
    /// The editor finished loading and can be initialized
    Ready,
    /// The editor's current image
    Update(EditorPayload),
}

/// One direction of a message channel.
///
/// Messages come out in the order they went in; the channel does not look
/// at them.
#[derive(Debug, Clone)]
pub struct EditorChannel<M> {
    queue: VecDeque<M>,
}

impl<M> Default for EditorChannel<M> {
    fn default() -> Self {
        Self { queue: VecDeque::new() }
    }
}

impl<M> EditorChannel<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, message: M) {
        self.queue.push_back(message);
    }

    pub fn recv(&mut self) -> Option<M> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every pending message in send order.
    pub fn drain(&mut self) -> impl Iterator<Item = M> + '_ {
        self.queue.drain(..)
    }
}

impl<M: Serialize> EditorChannel<M> {
    /// Pop the next message as JSON text.
    pub fn recv_json(&mut self) -> Option<Result<String, serde_json::Error>> {
        self.recv().map(|message| serde_json::to_string(&message))
    }
}

impl<M: for<'de> Deserialize<'de>> EditorChannel<M> {
    /// Parse JSON text and queue the message.
    pub fn send_json(&mut self, text: &str) -> Result<(), serde_json::Error> {
        self.send(serde_json::from_str(text)?);
        Ok(())
    }
}
