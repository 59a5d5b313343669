//! Chat endpoints: sidebar fetch, search, channel creation and membership,
//! and per-channel message history.

use serde_json::json;
use tracing::debug;

use parlor_shared::{Channel, ChannelId, Message};

use crate::error::Result;
use crate::gateway::{ApiClient, Envelope};

impl ApiClient {
    /// `GET /chat/sidebar` — the user's full channel list.
    pub async fn sidebar(&self) -> Result<Vec<Channel>> {
        let envelope: Envelope<Vec<Channel>> = self.get("/chat/sidebar").await?;
        let channels = envelope.details.unwrap_or_default();
        debug!(count = channels.len(), "Fetched sidebar channels");
        Ok(channels)
    }

    /// `GET /chat/messages/{channel}` — full history for one channel.
    pub async fn channel_messages(&self, channel_id: ChannelId) -> Result<Vec<Message>> {
        let envelope: Envelope<Vec<Message>> =
            self.get(&format!("/chat/messages/{}", channel_id.0)).await?;
        let messages = envelope.details.unwrap_or_default();
        debug!(
            channel_id = %channel_id,
            count = messages.len(),
            "Fetched message history"
        );
        Ok(messages)
    }

    /// `GET /chat/search?keyword=` — transient result set, never merged into
    /// the sidebar cache by this layer.
    pub async fn search_channels(&self, keyword: &str) -> Result<Vec<Channel>> {
        let envelope: Envelope<Vec<Channel>> = self
            .get(&format!("/chat/search?keyword={}", urlencode(keyword)))
            .await?;
        Ok(envelope.details.unwrap_or_default())
    }

    /// `POST /chat/create`.
    pub async fn create_channel(&self, name: &str) -> Result<Channel> {
        let envelope: Envelope<Channel> =
            self.post("/chat/create", json!({ "name": name })).await?;
        envelope.into_details()
    }

    /// `POST /chat/join/{channel}`.
    pub async fn join_channel(&self, channel_id: ChannelId) -> Result<()> {
        let _: Envelope<serde_json::Value> = self
            .post_empty(&format!("/chat/join/{}", channel_id.0))
            .await?;
        Ok(())
    }
}

/// Minimal query-string escaping for the search keyword.
fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::urlencode;

    #[test]
    fn test_urlencode_passthrough_and_escape() {
        assert_eq!(urlencode("alice"), "alice");
        assert_eq!(urlencode("a b&c"), "a%20b%26c");
    }
}
