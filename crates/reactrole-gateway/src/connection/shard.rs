//! Gateway shard
//!
//! One websocket connection to the chat platform's gateway. Runs the
//! Hello/Identify handshake, heartbeats, resumes dropped sessions, and
//! reconnects with backoff. Decoded dispatches go out on a channel.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::error::ConnectionError;
use super::session::SessionState;
use crate::events::DispatchEvent;
use crate::protocol::{GatewayIntents, GatewayMessage, HelloPayload, IdentifyPayload, OpCode};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// How long to wait for Hello after connecting
const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for the reconnect delay
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Shard configuration
#[derive(Clone)]
pub struct ShardConfig {
    /// Gateway URL, including version and encoding query
    pub url: String,
    pub token: String,
    pub intents: GatewayIntents,
}

impl std::fmt::Debug for ShardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("intents", &self.intents)
            .finish()
    }
}

/// Why a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Reconnect,
}

/// A single gateway connection and its resume state
pub struct Shard {
    config: ShardConfig,
    session: SessionState,
    events: mpsc::Sender<DispatchEvent>,
    shutdown: watch::Receiver<bool>,
    /// Whether the current connection got as far as READY or RESUMED
    established: bool,
}

impl Shard {
    pub fn new(
        config: ShardConfig,
        events: mpsc::Sender<DispatchEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            session: SessionState::new(),
            events,
            shutdown,
            established: false,
        }
    }

    /// Keep a session open until shutdown or a fatal close code
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        let mut failures: u32 = 0;

        loop {
            if *self.shutdown.borrow() {
                return Ok(());
            }

            self.established = false;
            match self.run_session().await {
                Ok(SessionEnd::Shutdown) | Err(ConnectionError::ChannelClosed) => {
                    info!("Gateway shard stopped");
                    return Ok(());
                }
                Ok(SessionEnd::Reconnect) => failures = 0,
                Err(e) if !e.should_reconnect() => {
                    error!(error = %e, "Gateway closed the connection for good");
                    return Err(e);
                }
                Err(e) => {
                    if !e.allows_resume() {
                        self.session.reset();
                    }
                    if self.established {
                        failures = 0;
                    }
                    failures = failures.saturating_add(1);

                    let delay = backoff(failures);
                    warn!(
                        error = %e,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        "Gateway connection lost, reconnecting"
                    );

                    tokio::select! {
                        () = sleep(delay) => {}
                        _ = self.shutdown.changed() => return Ok(()),
                    }
                }
            }
        }
    }

    async fn run_session(&mut self) -> Result<SessionEnd, ConnectionError> {
        let url = self.session.connect_url(&self.config.url);
        debug!(url = %url, resume = self.session.can_resume(), "Connecting to gateway");

        let (socket, _) = connect_async(url.as_str()).await?;
        let (mut sink, mut source) = socket.split();

        let hello = timeout(HELLO_TIMEOUT, read_hello(&mut source))
            .await
            .map_err(|_| ConnectionError::Protocol("no Hello from gateway".to_string()))??;
        let interval = Duration::from_millis(hello.heartbeat_interval);

        let greeting = match self.session.resume_payload(&self.config.token) {
            Some(resume) => {
                info!(session_id = %resume.session_id, seq = resume.seq, "Resuming gateway session");
                GatewayMessage::resume(&resume)
            }
            None => {
                info!(intents = self.config.intents.bits(), "Identifying with gateway");
                GatewayMessage::identify(&IdentifyPayload::new(&self.config.token, self.config.intents))
            }
        };
        send(&mut sink, &greeting).await?;

        // First beat lands at a random point within the first interval
        let jitter = interval.mul_f64(rand::thread_rng().gen::<f64>());
        let mut heartbeat = interval_at(Instant::now() + jitter, interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        return Err(ConnectionError::HeartbeatTimeout);
                    }
                    send(&mut sink, &GatewayMessage::heartbeat(self.session.sequence())).await?;
                    awaiting_ack = true;
                    trace!(seq = ?self.session.sequence(), "Heartbeat sent");
                }
                frame = source.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(frame))) => return Err(closed(frame)),
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                        None => {
                            return Err(ConnectionError::Closed {
                                code: None,
                                reason: "stream ended".to_string(),
                            })
                        }
                    };

                    let message = GatewayMessage::from_json(&text)?;
                    match message.op {
                        OpCode::Dispatch => self.dispatch(message).await?,
                        OpCode::Heartbeat => {
                            send(&mut sink, &GatewayMessage::heartbeat(self.session.sequence())).await?;
                        }
                        OpCode::HeartbeatAck => awaiting_ack = false,
                        OpCode::Reconnect => {
                            info!("Gateway requested reconnect");
                            return Ok(SessionEnd::Reconnect);
                        }
                        OpCode::InvalidSession => {
                            let resumable = message.as_invalid_session().unwrap_or(false);
                            warn!(resumable, "Gateway session invalidated");
                            if !resumable {
                                self.session.reset();
                            }
                            let wait = Duration::from_millis(rand::thread_rng().gen_range(1000..=5000));
                            sleep(wait).await;
                            return Ok(SessionEnd::Reconnect);
                        }
                        OpCode::Hello | OpCode::Identify | OpCode::Resume => {
                            debug!(op = %message.op, "Unexpected op code ignored");
                        }
                    }
                }
            }
        }
    }

    /// Record the sequence, track the session, and forward the event
    async fn dispatch(&mut self, message: GatewayMessage) -> Result<(), ConnectionError> {
        if let Some(seq) = message.s {
            self.session.record_sequence(seq);
        }
        let Some((name, data)) = message.into_dispatch() else {
            return Ok(());
        };

        let event = match DispatchEvent::decode(&name, data) {
            Ok(Some(event)) => event,
            Ok(None) => {
                trace!(event = %name, "Dispatch ignored");
                return Ok(());
            }
            Err(e) => {
                warn!(event = %name, error = %e, "Malformed dispatch skipped");
                return Ok(());
            }
        };

        match &event {
            DispatchEvent::Ready(ready) => {
                self.session
                    .record_ready(ready.session_id.clone(), ready.resume_gateway_url.clone());
                self.established = true;
            }
            DispatchEvent::Resumed => {
                info!(session_id = ?self.session.session_id(), "Gateway session resumed");
                self.established = true;
            }
            DispatchEvent::Engine(_) => {}
        }

        self.events
            .send(event)
            .await
            .map_err(|_| ConnectionError::ChannelClosed)
    }
}

impl std::fmt::Debug for Shard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shard")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish()
    }
}

async fn read_hello(source: &mut WsSource) -> Result<HelloPayload, ConnectionError> {
    loop {
        match source.next().await {
            Some(Ok(Message::Text(text))) => {
                let message = GatewayMessage::from_json(&text)?;
                return message
                    .as_hello()
                    .ok_or_else(|| ConnectionError::Protocol(format!("expected Hello, got {message}")));
            }
            Some(Ok(Message::Close(frame))) => return Err(closed(frame)),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
            None => {
                return Err(ConnectionError::Closed {
                    code: None,
                    reason: "closed before Hello".to_string(),
                })
            }
        }
    }
}

async fn send(sink: &mut WsSink, message: &GatewayMessage) -> Result<(), ConnectionError> {
    sink.send(Message::Text(message.to_json()?)).await?;
    Ok(())
}

fn closed(frame: Option<CloseFrame<'_>>) -> ConnectionError {
    match frame {
        Some(frame) => ConnectionError::Closed {
            code: Some(u16::from(frame.code)),
            reason: frame.reason.into_owned(),
        },
        None => ConnectionError::Closed {
            code: None,
            reason: String::new(),
        },
    }
}

/// Exponential reconnect delay with up to a second of jitter
fn backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    let base = Duration::from_secs(1 << exponent).min(MAX_BACKOFF);
    let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..1000));
    base + jitter
}
