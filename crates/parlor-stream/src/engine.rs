//! The message stream engine: one active channel subscription at a time,
//! plus the ordered local message cache for that channel.
//!
//! The engine owns the cache and is the only code that mutates it.  The
//! transport task owns the socket; the engine only signals attach/detach
//! and reacts to [`TransportEvent`]s.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use parlor_api::ApiClient;
use parlor_shared::constants::SEND_DESTINATION;
use parlor_shared::{ChannelId, Message, MessageId, Sender};

use crate::error::{Result, StreamError};
use crate::transport::{TransportCommand, TransportEvent};

/// Transport connection state as observed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Connected with no channel subscription.
    Connected,
    /// Connected and subscribed to one channel topic.
    Subscribed(ChannelId),
}

/// Manages the active channel subscription and its message cache.
///
/// Invariants:
/// - at most one channel is attached at a time; `attach` tears down the
///   previous subscription first;
/// - `messages()` is always ascending by timestamp, whatever the arrival
///   order of receive/send events.
pub struct MessageStreamEngine {
    cmd_tx: mpsc::Sender<TransportCommand>,
    state: ConnectionState,
    active: Option<ChannelId>,
    cache: Vec<Message>,
}

impl MessageStreamEngine {
    pub fn new(cmd_tx: mpsc::Sender<TransportCommand>) -> Self {
        Self {
            cmd_tx,
            state: ConnectionState::Disconnected,
            active: None,
            cache: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn active(&self) -> Option<ChannelId> {
        self.active
    }

    /// The cached messages for the attached channel, ascending by timestamp.
    pub fn messages(&self) -> &[Message] {
        &self.cache
    }

    /// Attach to a channel: tear down any existing subscription, clear the
    /// cache, and subscribe to the channel topic.  History is fetched
    /// separately (see [`MessageStreamEngine::apply_history`]) so that an
    /// in-flight fetch for a channel that is no longer active can be
    /// discarded.
    pub async fn attach(&mut self, channel_id: ChannelId) -> Result<()> {
        if let Some(previous) = self.active.take() {
            if previous == channel_id {
                self.active = Some(previous);
                return Ok(());
            }
            self.send_command(TransportCommand::Unsubscribe(previous.to_topic()))
                .await?;
        }

        self.cache.clear();
        self.active = Some(channel_id);
        self.send_command(TransportCommand::Subscribe(channel_id.to_topic()))
            .await?;

        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Subscribed(_)
        ) {
            self.state = ConnectionState::Subscribed(channel_id);
        }

        info!(channel_id = %channel_id, "Attached to channel");
        Ok(())
    }

    /// Unsubscribe from the active channel.  The underlying transport
    /// connection is kept warm; `attach` after `detach` behaves exactly like
    /// a first attach.
    pub async fn detach(&mut self) -> Result<()> {
        if let Some(previous) = self.active.take() {
            self.cache.clear();
            self.send_command(TransportCommand::Unsubscribe(previous.to_topic()))
                .await?;
            if self.state == ConnectionState::Subscribed(previous) {
                self.state = ConnectionState::Connected;
            }
            info!(channel_id = %previous, "Detached from channel");
        }
        Ok(())
    }

    /// Fetch message history for the attached channel via the gateway, then
    /// apply it.  Equivalent to `apply_history(channel, fetch(channel))`.
    pub async fn load_history(&mut self, api: &ApiClient, channel_id: ChannelId) -> Result<()> {
        let history = api.channel_messages(channel_id).await?;
        self.apply_history(channel_id, history);
        Ok(())
    }

    /// Apply a fetched history to the cache.
    ///
    /// The fetch may have been started for a channel that is no longer
    /// active; such stale results are discarded silently so they cannot
    /// overwrite a newer channel's cache.
    pub fn apply_history(&mut self, channel_id: ChannelId, mut history: Vec<Message>) {
        if self.active != Some(channel_id) {
            debug!(channel_id = %channel_id, "Discarding stale history fetch");
            return;
        }

        history.sort_by_key(|m| m.timestamp);
        debug!(
            channel_id = %channel_id,
            count = history.len(),
            "Applied message history"
        );
        self.cache = history;
    }

    /// Optimistically append a message and publish it.
    ///
    /// The client-generated id and local timestamp are canonical; the server
    /// echoes the message back to subscribers and [`receive`] deduplicates
    /// on id, so the cache ends up with exactly one entry per logical
    /// message.
    ///
    /// [`receive`]: MessageStreamEngine::receive
    pub async fn send(&mut self, content: &str, sender: Sender) -> Result<MessageId> {
        if content.trim().is_empty() {
            return Err(StreamError::EmptyMessage);
        }
        let channel_id = self.active.ok_or(StreamError::NotAttached)?;
        if !matches!(self.state, ConnectionState::Subscribed(_)) {
            return Err(StreamError::TransportUnavailable);
        }

        let message = Message {
            id: MessageId::new(),
            channel_id,
            content: content.to_string(),
            timestamp: Utc::now(),
            sender,
        };
        let id = message.id;

        self.insert_ordered(message.clone());
        self.send_command(TransportCommand::Publish {
            destination: SEND_DESTINATION.to_string(),
            message,
        })
        .await?;

        debug!(channel_id = %channel_id, message_id = %id, "Message published");
        Ok(id)
    }

    /// Handle one inbound message from the transport.
    ///
    /// Messages tagged for another channel are dropped: during a rapid
    /// channel switch, events from the old subscription can still be in
    /// flight.  Messages whose id is already cached (our own publish echo)
    /// are dropped too.
    pub fn receive(&mut self, message: Message) {
        let Some(active) = self.active else {
            debug!(message_id = %message.id, "Dropping message, no channel attached");
            return;
        };
        if message.channel_id != active {
            debug!(
                message_channel = %message.channel_id,
                active_channel = %active,
                "Dropping cross-channel message"
            );
            return;
        }
        if self.cache.iter().any(|m| m.id == message.id) {
            debug!(message_id = %message.id, "Dropping duplicate message");
            return;
        }

        self.insert_ordered(message);
    }

    /// Edit a cached message in place.  Identity (id, channel) is preserved.
    /// Local-only; persistence is a separate concern.
    pub fn edit(&mut self, id: MessageId, new_content: &str) -> Result<()> {
        let message = self
            .cache
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StreamError::UnknownMessage(id))?;
        message.content = new_content.to_string();
        Ok(())
    }

    /// Remove a cached message outright.  No tombstone is kept.
    pub fn delete(&mut self, id: MessageId) -> Result<()> {
        let before = self.cache.len();
        self.cache.retain(|m| m.id != id);
        if self.cache.len() == before {
            return Err(StreamError::UnknownMessage(id));
        }
        Ok(())
    }

    /// React to a transport lifecycle or message event.
    ///
    /// The cache is preserved across disconnects; the transport replays the
    /// subscription on reconnect.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connecting => {
                self.state = ConnectionState::Connecting;
            }
            TransportEvent::Connected => {
                self.state = match self.active {
                    Some(channel_id) => ConnectionState::Subscribed(channel_id),
                    None => ConnectionState::Connected,
                };
            }
            TransportEvent::Disconnected | TransportEvent::Failed => {
                self.state = ConnectionState::Disconnected;
            }
            TransportEvent::Event { topic, message } => {
                // Topic guard first, channel-id guard inside receive: two
                // lines of defense against switch races.
                match self.active {
                    Some(active) if topic == active.to_topic() => self.receive(message),
                    _ => debug!(topic = %topic, "Dropping event on inactive topic"),
                }
            }
        }
    }

    fn insert_ordered(&mut self, message: Message) {
        let idx = self
            .cache
            .partition_point(|m| m.timestamp <= message.timestamp);
        self.cache.insert(idx, message);
    }

    async fn send_command(&self, command: TransportCommand) -> Result<()> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| StreamError::TransportUnavailable)
    }
}
