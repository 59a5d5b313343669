//! Wire frames exchanged over the real-time stream transport.
//!
//! Frames travel as single-line JSON objects tagged by a `frame` field.
//! Subscriptions are topic-scoped per channel; outgoing sends all go to one
//! well-known destination.

use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Frames sent from the client to the stream server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Begin receiving events published on `topic`.
    Subscribe { topic: String },
    /// Stop receiving events published on `topic`.
    Unsubscribe { topic: String },
    /// Publish a chat message to the well-known send destination.
    Publish {
        destination: String,
        message: Message,
    },
}

/// Frames sent from the stream server to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum ServerFrame {
    /// An event on a topic the client is subscribed to.
    Event { topic: String, message: Message },
}

impl ClientFrame {
    /// Encode as a single JSON line (no trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerFrame {
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
