//! Stream transport task with tokio mpsc command/event pattern.
//!
//! The connection loop runs in a dedicated tokio task.  External code
//! communicates with it through typed command and event channels, keeping
//! the socket layer fully asynchronous and decoupled from the engine.
//!
//! Frames are newline-delimited JSON (see `parlor_shared::protocol`).  The
//! task owns reconnection: on disconnect it retries with a fixed,
//! server-friendly delay and replays the tracked topic set, so the
//! last-active channel subscription survives every reconnect.

use std::collections::HashSet;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use parlor_shared::constants::DEFAULT_RECONNECT_DELAY_MS;
use parlor_shared::protocol::{ClientFrame, ServerFrame};
use parlor_shared::Message;

// ---------------------------------------------------------------------------
// Command / event types
// ---------------------------------------------------------------------------

/// Commands sent *into* the transport task.
#[derive(Debug)]
pub enum TransportCommand {
    /// Subscribe to a topic (tracked; replayed after reconnect).
    Subscribe(String),
    /// Unsubscribe from a topic.
    Unsubscribe(String),
    /// Publish a message to the well-known send destination.
    Publish {
        destination: String,
        message: Message,
    },
    /// Gracefully shut the transport down.
    Shutdown,
}

/// Events sent *from* the transport task to the application.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A connection attempt is starting.
    Connecting,
    /// The connection is up and tracked topics are re-subscribed.
    Connected,
    /// The connection dropped; a reconnect attempt will follow.
    Disconnected,
    /// An inbound event on a subscribed topic.
    Event { topic: String, message: Message },
    /// The retry budget is exhausted; the task has terminated.
    Failed,
}

/// Configuration for spawning the transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// `host:port` of the stream endpoint.
    pub addr: String,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Maximum consecutive failed connect attempts before giving up.
    /// `None` retries indefinitely.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9300".to_string(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: None,
        }
    }
}

/// Spawn the stream transport in a background tokio task.
///
/// Returns channels for sending commands and receiving events.  Dropping
/// the command sender shuts the task down.
pub fn spawn_transport(
    config: TransportConfig,
) -> (mpsc::Sender<TransportCommand>, mpsc::Receiver<TransportEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<TransportCommand>(256);
    let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(256);

    tokio::spawn(run_transport(config, cmd_rx, event_tx));

    (cmd_tx, event_rx)
}

async fn run_transport(
    config: TransportConfig,
    mut cmd_rx: mpsc::Receiver<TransportCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    // Topics the application wants to be subscribed to.  Mutated by
    // commands even while offline, replayed on every (re)connect.
    let mut topics: HashSet<String> = HashSet::new();
    let mut failures: u32 = 0;

    'outer: loop {
        let _ = event_tx.send(TransportEvent::Connecting).await;

        let stream = match TcpStream::connect(&config.addr).await {
            Ok(stream) => stream,
            Err(e) => {
                failures += 1;
                warn!(
                    addr = %config.addr,
                    attempt = failures,
                    error = %e,
                    "Stream connect failed"
                );

                if let Some(cap) = config.max_reconnect_attempts {
                    if failures >= cap {
                        error!(attempts = failures, "Stream retry budget exhausted");
                        let _ = event_tx.send(TransportEvent::Failed).await;
                        break 'outer;
                    }
                }

                // Keep draining commands while waiting, so topic changes
                // made offline are not lost.
                let sleep = tokio::time::sleep(config.reconnect_delay);
                tokio::pin!(sleep);
                loop {
                    tokio::select! {
                        _ = &mut sleep => continue 'outer,
                        cmd = cmd_rx.recv() => match cmd {
                            Some(TransportCommand::Shutdown) | None => break 'outer,
                            Some(cmd) => handle_offline_command(cmd, &mut topics),
                        }
                    }
                }
            }
        };

        failures = 0;
        let mut framed = Framed::new(stream, LinesCodec::new());

        // Replay subscriptions so the last-active channel survives reconnects.
        let mut replay_ok = true;
        for topic in &topics {
            debug!(topic = %topic, "Replaying subscription");
            let frame = ClientFrame::Subscribe {
                topic: topic.clone(),
            };
            if !send_frame(&mut framed, &frame).await {
                replay_ok = false;
                break;
            }
        }

        if !replay_ok {
            let _ = event_tx.send(TransportEvent::Disconnected).await;
            tokio::time::sleep(config.reconnect_delay).await;
            continue 'outer;
        }

        info!(addr = %config.addr, "Stream transport connected");
        let _ = event_tx.send(TransportEvent::Connected).await;

        loop {
            tokio::select! {
                // --- Outgoing commands ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(TransportCommand::Subscribe(topic)) => {
                            topics.insert(topic.clone());
                            let frame = ClientFrame::Subscribe { topic };
                            if !send_frame(&mut framed, &frame).await {
                                break;
                            }
                        }
                        Some(TransportCommand::Unsubscribe(topic)) => {
                            topics.remove(&topic);
                            let frame = ClientFrame::Unsubscribe { topic };
                            if !send_frame(&mut framed, &frame).await {
                                break;
                            }
                        }
                        Some(TransportCommand::Publish { destination, message }) => {
                            let frame = ClientFrame::Publish { destination, message };
                            if !send_frame(&mut framed, &frame).await {
                                break;
                            }
                        }
                        Some(TransportCommand::Shutdown) => {
                            info!("Stream transport shutdown requested");
                            break 'outer;
                        }
                        None => {
                            // All senders dropped
                            info!("Command channel closed, shutting down transport");
                            break 'outer;
                        }
                    }
                }

                // --- Inbound frames ---
                frame = framed.next() => {
                    match frame {
                        Some(Ok(line)) => match ServerFrame::from_line(&line) {
                            Ok(ServerFrame::Event { topic, message }) => {
                                debug!(topic = %topic, message_id = %message.id, "Stream event received");
                                let _ = event_tx
                                    .send(TransportEvent::Event { topic, message })
                                    .await;
                            }
                            Err(e) => {
                                warn!(error = %e, "Undecodable stream frame");
                            }
                        },
                        Some(Err(e)) => {
                            warn!(error = %e, "Stream read error");
                            break;
                        }
                        None => {
                            info!("Stream closed by server");
                            break;
                        }
                    }
                }
            }
        }

        let _ = event_tx.send(TransportEvent::Disconnected).await;
        tokio::time::sleep(config.reconnect_delay).await;
    }

    info!("Stream transport task terminated");
}

/// Apply a command received while no connection is up.  Subscriptions are
/// tracked for replay; publishes cannot be delivered and are dropped.
fn handle_offline_command(cmd: TransportCommand, topics: &mut HashSet<String>) {
    match cmd {
        TransportCommand::Subscribe(topic) => {
            topics.insert(topic);
        }
        TransportCommand::Unsubscribe(topic) => {
            topics.remove(&topic);
        }
        TransportCommand::Publish { destination, .. } => {
            warn!(destination = %destination, "Dropping publish while disconnected");
        }
        TransportCommand::Shutdown => {}
    }
}

/// Send one frame, logging on failure.  Returns `false` when the connection
/// should be considered lost.
async fn send_frame(framed: &mut Framed<TcpStream, LinesCodec>, frame: &ClientFrame) -> bool {
    let line = match frame.to_line() {
        Ok(line) => line,
        Err(e) => {
            error!(error = %e, "Frame serialization failed");
            return true;
        }
    };

    if let Err(e) = framed.send(line).await {
        warn!(error = %e, "Stream write failed");
        return false;
    }
    true
}
