use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::TOPIC_PREFIX;

// Server-assigned numeric user identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ChannelId(pub Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Stream topic this channel's events are published on.
    pub fn to_topic(&self) -> String {
        format!("{TOPIC_PREFIX}{}", self.0)
    }

    /// Inverse of [`ChannelId::to_topic`].
    pub fn from_topic(topic: &str) -> Option<Self> {
        let raw = topic.strip_prefix(TOPIC_PREFIX)?;
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a channel is a 1:1 conversation or a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Personal,
    Group,
}

/// Presence status as reported by the server.  The empty string means the
/// server has no presence information (group channels, stale profiles).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Presence {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "offline")]
    Offline,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_roundtrip() {
        let id = ChannelId::new();
        let topic = id.to_topic();
        assert!(topic.starts_with("channel."));
        assert_eq!(ChannelId::from_topic(&topic), Some(id));
    }

    #[test]
    fn test_from_topic_rejects_foreign_topics() {
        assert_eq!(ChannelId::from_topic("presence.42"), None);
        assert_eq!(ChannelId::from_topic("channel.not-a-uuid"), None);
    }

    #[test]
    fn test_presence_serde_names() {
        assert_eq!(serde_json::to_string(&Presence::Online).unwrap(), "\"online\"");
        assert_eq!(
            serde_json::from_str::<Presence>("\"\"").unwrap(),
            Presence::Unknown
        );
    }
}
