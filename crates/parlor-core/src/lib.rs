//! Client core: wires the API gateway, session machine, channel registry,
//! and message stream engine into one facade the UI layer drives.

pub mod config;
pub mod grouping;
pub mod guard;
pub mod registry;
pub mod session;
pub mod store;

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use parlor_api::ApiClient;
use parlor_shared::ChannelId;
use parlor_stream::{spawn_transport, MessageStreamEngine, StreamError, TransportEvent};

pub use crate::config::ClientConfig;
pub use crate::guard::{check_navigation, is_public_path, RouteDecision};
pub use crate::registry::{ChannelPatch, ChannelRegistry};
pub use crate::session::{AuthError, OAuthCallbackParams, Session, SessionManager};
pub use crate::store::Store;

/// Install the global tracing subscriber.  `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("parlor_core=debug,parlor_stream=debug,parlor_api=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Everything a frontend needs, built from one [`ClientConfig`].
///
/// The transport task is spawned immediately and reconnects on its own; the
/// caller's event loop feeds [`ClientCore::pump_events`] to apply pending
/// transport events to the engine.
pub struct ClientCore {
    pub api: ApiClient,
    pub session: SessionManager,
    pub registry: ChannelRegistry,
    pub engine: MessageStreamEngine,
    events: mpsc::Receiver<TransportEvent>,
}

impl ClientCore {
    pub fn new(config: &ClientConfig) -> Result<Self, parlor_api::GatewayError> {
        let api = ApiClient::new(&config.api_base_url)?;
        let (cmd_tx, events) = spawn_transport(config.transport());

        info!(api = %config.api_base_url, stream = %config.stream_addr, "Client core starting");
        Ok(Self {
            session: SessionManager::new(api.clone()),
            registry: ChannelRegistry::new(api.clone()),
            engine: MessageStreamEngine::new(cmd_tx),
            api,
            events,
        })
    }

    /// Sign in with primary credentials.  When the session is established
    /// outright (no second factor), the channel registry is populated; when
    /// a second factor is pending, the registry stays empty until
    /// [`ClientCore::complete_second_factor`].
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.session.submit_credentials(email, password).await?;
        if self.session.current().is_authenticated() {
            self.registry.load().await?;
        }
        Ok(())
    }

    /// Complete a pending second-factor challenge, then populate the
    /// registry.
    pub async fn complete_second_factor(
        &mut self,
        code: &str,
        is_recovery: bool,
    ) -> Result<(), AuthError> {
        self.session.submit_second_factor(code, is_recovery).await?;
        self.registry.load().await?;
        Ok(())
    }

    /// Select a channel: mark it active in the registry, attach the stream
    /// engine, and load history.
    pub async fn open_channel(&mut self, channel_id: ChannelId) -> Result<(), StreamError> {
        self.registry.set_active(Some(channel_id));
        self.engine.attach(channel_id).await?;
        self.engine.load_history(&self.api, channel_id).await
    }

    /// Deselect the active channel.  The transport stays connected.
    pub async fn close_channel(&mut self) -> Result<(), StreamError> {
        self.registry.set_active(None);
        self.engine.detach().await
    }

    /// Sign out and reset all client state.
    pub async fn sign_out(&mut self) -> Result<(), StreamError> {
        self.session.logout().await;
        self.registry.clear();
        self.engine.detach().await
    }

    /// Apply all transport events queued since the last call.  Non-blocking.
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.engine.handle_event(event);
        }
    }

    /// Guard a navigation to `path` against the current session.
    pub async fn check_navigation(&self, path: &str) -> RouteDecision {
        guard::check_navigation(&self.api, path).await
    }
}
