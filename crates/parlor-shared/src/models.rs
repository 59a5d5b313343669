//! Domain model structs mirrored from the server's JSON representation.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names so it can be decoded straight out of an API envelope or a stream
//! event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChannelId, ChannelKind, MessageId, Presence, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The authenticated user's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Resolved avatar URL.
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub status: Presence,
}

/// Sender identity carried on every message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub status: Presence,
}

impl From<UserProfile> for Sender {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            status: user.status,
        }
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A conversation as it appears in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Unique channel identifier.
    pub id: ChannelId,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub name: String,
    /// Resolved avatar URL.
    #[serde(default)]
    pub avatar: String,
    /// Presence of the counterpart (personal channels only).
    #[serde(default)]
    pub status: Presence,
    /// Member count (group channels only).
    #[serde(default)]
    pub members: Option<u32>,
    /// Unread message count, never negative.
    #[serde(default)]
    pub unread: u32,
    /// Preview of the most recent message, if any.
    #[serde(default)]
    pub last_message: Option<LastMessage>,
}

/// Last-message preview shown under a channel name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique within its channel; client-generated ids are canonical.
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
}
