//! The channel registry: the client's cached sidebar plus the active
//! channel selection.
//!
//! Search results are deliberately kept out of the cache; only channels the
//! user belongs to live here.  Mutations flow through the embedded
//! [`Store`] so sidebar views can subscribe to changes.

use tracing::{debug, info};

use parlor_api::{ApiClient, Result};
use parlor_shared::{Channel, ChannelId, LastMessage, Presence};

use crate::store::Store;

/// Partial update applied to a cached channel.  `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ChannelPatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<Presence>,
    pub members: Option<u32>,
    pub unread: Option<u32>,
    pub last_message: Option<LastMessage>,
}

pub struct ChannelRegistry {
    api: ApiClient,
    channels: Store<Vec<Channel>>,
    active: Option<ChannelId>,
}

impl ChannelRegistry {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            channels: Store::new(Vec::new()),
            active: None,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        self.channels.get()
    }

    /// The channel store, for subscribing to sidebar changes.
    pub fn store(&mut self) -> &mut Store<Vec<Channel>> {
        &mut self.channels
    }

    /// Replace the cache with the server's sidebar.  Local entries not in
    /// the response are dropped.
    pub async fn load(&mut self) -> Result<usize> {
        let channels = self.api.sidebar().await?;
        let count = channels.len();
        self.channels.set(channels);
        info!(count, "Channel registry loaded");
        Ok(count)
    }

    /// Search public channels by keyword.  An empty or whitespace-only
    /// keyword short-circuits to no results without a network round-trip.
    /// Results are transient and never merged into the cache.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Channel>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        self.api.search_channels(keyword).await
    }

    /// Create a channel server-side and cache it.
    pub async fn create(&mut self, name: &str) -> Result<Channel> {
        let channel = self.api.create_channel(name).await?;
        self.upsert(channel.clone());
        Ok(channel)
    }

    /// Join a channel found via search, then cache it.
    pub async fn join(&mut self, channel: Channel) -> Result<()> {
        self.api.join_channel(channel.id).await?;
        self.upsert(channel);
        Ok(())
    }

    pub fn set_active(&mut self, channel_id: Option<ChannelId>) {
        self.active = channel_id;
    }

    pub fn active_id(&self) -> Option<ChannelId> {
        self.active
    }

    /// The active channel's cached entry.  `None` when nothing is selected
    /// or the selected id is no longer cached.
    pub fn active(&self) -> Option<&Channel> {
        let id = self.active?;
        self.channels.get().iter().find(|c| c.id == id)
    }

    /// Insert a channel unless one with the same id is already cached; an
    /// existing entry wins so locally accumulated state (unread counts) is
    /// not clobbered.
    pub fn upsert(&mut self, channel: Channel) {
        if self.channels.get().iter().any(|c| c.id == channel.id) {
            debug!(channel_id = %channel.id, "Channel already cached, keeping existing entry");
            return;
        }
        self.channels.update(|channels| channels.push(channel));
    }

    /// Apply a partial update to a cached channel.  Returns false when the
    /// id is not cached.
    pub fn update(&mut self, channel_id: ChannelId, patch: ChannelPatch) -> bool {
        let exists = self.channels.get().iter().any(|c| c.id == channel_id);
        if !exists {
            return false;
        }
        self.channels.update(|channels| {
            if let Some(channel) = channels.iter_mut().find(|c| c.id == channel_id) {
                if let Some(name) = patch.name {
                    channel.name = name;
                }
                if let Some(avatar) = patch.avatar {
                    channel.avatar = avatar;
                }
                if let Some(status) = patch.status {
                    channel.status = status;
                }
                if let Some(members) = patch.members {
                    channel.members = Some(members);
                }
                if let Some(unread) = patch.unread {
                    channel.unread = unread;
                }
                if let Some(last_message) = patch.last_message {
                    channel.last_message = Some(last_message);
                }
            }
        });
        true
    }

    /// Drop a channel from the cache.  Returns false when the id is not
    /// cached.  The active selection is left alone; `active()` simply
    /// resolves to `None` afterwards.
    pub fn remove(&mut self, channel_id: ChannelId) -> bool {
        let before = self.channels.get().len();
        self.channels.update(|channels| {
            channels.retain(|c| c.id != channel_id);
        });
        self.channels.get().len() != before
    }

    /// Reset to the signed-out state.
    pub fn clear(&mut self) {
        self.active = None;
        self.channels.set(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_shared::ChannelKind;

    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:1").unwrap()
    }

    fn channel(name: &str, unread: u32) -> Channel {
        Channel {
            id: ChannelId::new(),
            kind: ChannelKind::Group,
            name: name.into(),
            avatar: String::new(),
            status: Presence::Unknown,
            members: Some(2),
            unread,
            last_message: None,
        }
    }

    #[test]
    fn test_upsert_keeps_existing_entry() {
        let mut registry = ChannelRegistry::new(api());
        let mut original = channel("general", 5);
        let id = original.id;
        registry.upsert(original.clone());

        original.unread = 0;
        original.name = "renamed".into();
        registry.upsert(original);

        let cached = &registry.channels()[0];
        assert_eq!(cached.id, id);
        assert_eq!(cached.unread, 5);
        assert_eq!(cached.name, "general");
    }

    #[test]
    fn test_update_patches_only_named_fields() {
        let mut registry = ChannelRegistry::new(api());
        let original = channel("general", 5);
        let id = original.id;
        registry.upsert(original);

        let applied = registry.update(
            id,
            ChannelPatch {
                unread: Some(0),
                ..Default::default()
            },
        );
        assert!(applied);
        assert_eq!(registry.channels()[0].unread, 0);
        assert_eq!(registry.channels()[0].name, "general");

        assert!(!registry.update(ChannelId::new(), ChannelPatch::default()));
    }

    #[test]
    fn test_active_resolves_none_after_remove() {
        let mut registry = ChannelRegistry::new(api());
        let cached = channel("general", 0);
        let id = cached.id;
        registry.upsert(cached);

        registry.set_active(Some(id));
        assert_eq!(registry.active().map(|c| c.id), Some(id));

        assert!(registry.remove(id));
        assert_eq!(registry.active_id(), Some(id));
        assert!(registry.active().is_none());
    }

    #[tokio::test]
    async fn test_search_short_circuits_on_blank_keyword() {
        // The api points at a closed port; reaching the network would error.
        let registry = ChannelRegistry::new(api());
        assert!(registry.search("").await.unwrap().is_empty());
        assert!(registry.search("   ").await.unwrap().is_empty());
    }

    #[test]
    fn test_clear_resets_selection_and_cache() {
        let mut registry = ChannelRegistry::new(api());
        let cached = channel("general", 0);
        registry.set_active(Some(cached.id));
        registry.upsert(cached);

        registry.clear();
        assert!(registry.channels().is_empty());
        assert_eq!(registry.active_id(), None);
    }
}
