//! The session controller: an actor owning the state machine and the
//! reconnection policy.
//!
//! The controller composes one [`TransportWorker`] and one
//! [`HeartbeatMonitor`] at a time. The public surface is a cloneable
//! [`SessionHandle`] (commands in, oneshot replies out) plus a stream of
//! [`SessionEvent`]s — the presentation layer never reaches past either.
//!
//! Everything runs inside a single spawned task: commands, transport
//! events, heartbeat events, and the retry timer all arrive through one
//! `select!`, so there is no shared mutable state to lock.

use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};

use karma_protocol::{encode, ClientMessageType, Message, ServerMessageType};
use karma_transport::{TransportEvent, TransportWorker};

use crate::{
    ConnectionState, HeartbeatConfig, HeartbeatEvent, HeartbeatMonitor,
    MessageValidator, Session, SessionConfig, SessionError,
};

// ---------------------------------------------------------------------------
// Public surface
// ---------------------------------------------------------------------------

/// Events the controller publishes to the presentation layer.
#[derive(Debug)]
pub enum SessionEvent {
    /// The state machine moved along one of its edges.
    StateChanged {
        /// State before the transition.
        old: ConnectionState,
        /// State after the transition.
        new: ConnectionState,
    },
    /// A validated server message, for the layers above to interpret.
    MessageReceived(Message),
    /// A user-facing problem report.
    Error(String),
    /// An unexpected loss was detected; automatic retries have begun.
    Reconnecting,
    /// The server acknowledged the reconnection handshake.
    Reconnected,
    /// Progress report from the retry loop.
    ReconnectStatus {
        /// Seconds left in the auto-retry budget.
        seconds_remaining: u64,
    },
}

/// Commands into the actor. Replies travel on oneshot channels so no
/// caller ever blocks on the actor's internal work longer than one
/// command round.
enum Command {
    Connect {
        host: String,
        port: u16,
        name: String,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    ReconnectManually {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Send {
        msg_type: ClientMessageType,
        fields: Vec<(String, String)>,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    State {
        reply: oneshot::Sender<ConnectionState>,
    },
    Shutdown,
}

/// Handle to a running session controller. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Initiates a connection. Legal only from `Disconnected`.
    ///
    /// Resolves once the TCP connection is up and the handshake has been
    /// sent — the `Connected` state arrives later, as an event, when the
    /// server acknowledges.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] — a session is already active;
    ///   the existing transport is left untouched.
    /// - [`SessionError::Transport`] — TCP connect failed (refused,
    ///   timed out, or other I/O), classified by cause.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        name: &str,
    ) -> Result<(), SessionError> {
        self.request(|reply| Command::Connect {
            host: host.to_string(),
            port,
            name: name.to_string(),
            reply,
        })
        .await?
    }

    /// Intentionally disconnects and clears the cached session.
    /// Legal (and idempotent) from any state.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Manually re-enters the retry path after auto-reconnect gave up
    /// (or while it is still running). Requires the session cached by an
    /// earlier `connect()` in this process.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] — only legal from
    ///   `Disconnected` or `Reconnecting`.
    /// - [`SessionError::NoCachedSession`] — nothing to reconnect to.
    pub async fn reconnect_manually(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::ReconnectManually { reply })
            .await?
    }

    /// Asks the server to seat us in a room.
    pub async fn send_join_room(&self) -> Result<(), SessionError> {
        self.send(ClientMessageType::JoinRoom, vec![]).await
    }

    /// Asks the server to start the game.
    pub async fn send_start_game(&self) -> Result<(), SessionError> {
        self.send(ClientMessageType::StartGame, vec![]).await
    }

    /// Plays cards: a comma-separated card list, or the reserve keyword.
    pub async fn send_play_cards(&self, cards: &str) -> Result<(), SessionError> {
        self.send(
            ClientMessageType::PlayCards,
            vec![("cards".to_string(), cards.to_string())],
        )
        .await
    }

    /// Picks up the discard pile instead of playing.
    pub async fn send_pickup_pile(&self) -> Result<(), SessionError> {
        self.send(ClientMessageType::PickupPile, vec![]).await
    }

    /// Current state, for display purposes. The answer can be stale by
    /// one event — consumers tracking state should prefer
    /// [`SessionEvent::StateChanged`].
    pub async fn state(&self) -> Result<ConnectionState, SessionError> {
        self.request(|reply| Command::State { reply }).await
    }

    /// Stops the actor after an intentional disconnect.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(
        &self,
        msg_type: ClientMessageType,
        fields: Vec<(String, String)>,
    ) -> Result<(), SessionError> {
        self.request(|reply| Command::Send {
            msg_type,
            fields,
            reply,
        })
        .await?
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::ControllerGone)?;
        reply_rx.await.map_err(|_| SessionError::ControllerGone)
    }
}

/// Spawns a session controller actor.
///
/// Returns the command handle and the event stream. The actor runs until
/// [`SessionHandle::shutdown`] or until every handle is dropped.
pub fn spawn_session(
    config: SessionConfig,
) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let validator = MessageValidator::new(config.invalid_msg_threshold);
    let actor = SessionActor {
        config,
        state: ConnectionState::Disconnected,
        session: None,
        worker: None,
        transport_rx: None,
        heartbeat: None,
        heartbeat_rx: None,
        validator,
        validator_threshold_hit: false,
        retry: None,
        events: event_tx,
        commands: cmd_rx,
    };

    tokio::spawn(actor.run());

    (SessionHandle { commands: cmd_tx }, event_rx)
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// What woke the actor loop up.
enum Wake {
    Command(Option<Command>),
    Transport(Option<TransportEvent>),
    Heartbeat(Option<HeartbeatEvent>),
    Retry,
}

struct SessionActor {
    config: SessionConfig,
    state: ConnectionState,
    /// Cached identity and reconnection bookkeeping. `Some` from
    /// `connect()` until intentional disconnect or definitive failure.
    session: Option<Session>,
    /// At most one worker is live at a time; replaced wholesale during
    /// reconnection. `worker` and `transport_rx` are set and cleared
    /// together.
    worker: Option<TransportWorker>,
    transport_rx: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    /// At most one monitor; same replace-wholesale discipline.
    heartbeat: Option<HeartbeatMonitor>,
    heartbeat_rx: Option<mpsc::UnboundedReceiver<HeartbeatEvent>>,
    validator: MessageValidator,
    validator_threshold_hit: bool,
    /// Armed while auto-reconnect is running.
    retry: Option<Interval>,
    events: mpsc::UnboundedSender<SessionEvent>,
    commands: mpsc::Receiver<Command>,
}

impl SessionActor {
    async fn run(mut self) {
        tracing::info!("session controller started");

        loop {
            let wake = tokio::select! {
                cmd = self.commands.recv() => Wake::Command(cmd),
                ev = recv_opt(&mut self.transport_rx) => Wake::Transport(ev),
                ev = recv_opt(&mut self.heartbeat_rx) => Wake::Heartbeat(ev),
                () = retry_tick(&mut self.retry) => Wake::Retry,
            };

            match wake {
                Wake::Command(Some(cmd)) => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }
                // Every handle dropped: tear down and exit.
                Wake::Command(None) => break,
                Wake::Transport(Some(ev)) => self.handle_transport_event(ev).await,
                // A closed channel means the worker is gone; stop
                // polling it. Loss itself arrives as an event first.
                Wake::Transport(None) => self.transport_rx = None,
                Wake::Heartbeat(Some(ev)) => self.handle_heartbeat_event(ev).await,
                Wake::Heartbeat(None) => self.heartbeat_rx = None,
                Wake::Retry => self.attempt_reconnect().await,
            }
        }

        self.do_disconnect().await;
        tracing::info!("session controller stopped");
    }

    // -- Commands ---------------------------------------------------------

    /// Returns `false` when the actor should exit.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Connect {
                host,
                port,
                name,
                reply,
            } => {
                let result = self.do_connect(host, port, name).await;
                let _ = reply.send(result);
            }
            Command::Disconnect { reply } => {
                self.do_disconnect().await;
                let _ = reply.send(());
            }
            Command::ReconnectManually { reply } => {
                let result = self.do_manual_reconnect();
                let _ = reply.send(result);
            }
            Command::Send {
                msg_type,
                fields,
                reply,
            } => {
                let result = self.do_send(msg_type, &fields).await;
                let _ = reply.send(result);
            }
            Command::State { reply } => {
                let _ = reply.send(self.state);
            }
            Command::Shutdown => return false,
        }
        true
    }

    async fn do_connect(
        &mut self,
        host: String,
        port: u16,
        name: String,
    ) -> Result<(), SessionError> {
        if self.state != ConnectionState::Disconnected {
            tracing::warn!(state = %self.state, "connect rejected");
            return Err(SessionError::InvalidState {
                command: "connect",
                state: self.state,
            });
        }

        self.session = Some(Session::new(name.clone(), host.clone(), port));
        self.validator.reset();
        self.validator_threshold_hit = false;
        self.change_state(ConnectionState::Connecting);

        match self.spawn_worker(&host, port).await {
            Ok(()) => {
                // Handshake goes out immediately; Connected arrives as
                // an event once the server acknowledges.
                if let Err(e) = self
                    .send_now(ClientMessageType::Connect, &[("name", name.as_str())])
                    .await
                {
                    tracing::warn!(error = %e, "handshake send failed");
                }
                Ok(())
            }
            Err(e) => {
                self.session = None;
                self.change_state(ConnectionState::Disconnected);
                Err(SessionError::Transport(e))
            }
        }
    }

    async fn do_disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected
            && self.session.is_none()
            && self.worker.is_none()
        {
            return;
        }
        tracing::info!("disconnect requested");
        self.retry = None;
        self.stop_heartbeat();
        self.retire_worker().await;
        self.session = None;
        self.change_state(ConnectionState::Disconnected);
    }

    fn do_manual_reconnect(&mut self) -> Result<(), SessionError> {
        if !matches!(
            self.state,
            ConnectionState::Disconnected | ConnectionState::Reconnecting
        ) {
            tracing::warn!(state = %self.state, "manual reconnect rejected");
            return Err(SessionError::InvalidState {
                command: "reconnect",
                state: self.state,
            });
        }
        let Some(session) = &mut self.session else {
            tracing::warn!("manual reconnect without cached session");
            return Err(SessionError::NoCachedSession);
        };

        tracing::info!("manual reconnection requested");
        // A manual trigger opens a fresh auto-retry window.
        session.disconnect_time = Some(Instant::now());
        session.reconnect_attempts = 0;
        self.retry = None;
        self.start_auto_reconnect();
        Ok(())
    }

    async fn do_send(
        &mut self,
        msg_type: ClientMessageType,
        fields: &[(String, String)],
    ) -> Result<(), SessionError> {
        let borrowed: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        self.send_now(msg_type, &borrowed).await
    }

    /// Encodes and writes one client message on the live worker.
    async fn send_now(
        &mut self,
        msg_type: ClientMessageType,
        fields: &[(&str, &str)],
    ) -> Result<(), SessionError> {
        let Some(worker) = &self.worker else {
            tracing::warn!(%msg_type, state = %self.state, "send while not connected");
            return Err(SessionError::InvalidState {
                command: "send",
                state: self.state,
            });
        };
        let wire = encode(msg_type.code(), "", "", fields);
        tracing::debug!(%msg_type, "sending");
        worker.send(&wire).await.map_err(SessionError::Transport)
    }

    // -- Transport events -------------------------------------------------

    async fn handle_transport_event(&mut self, ev: TransportEvent) {
        match ev {
            TransportEvent::Message(msg) => self.handle_message(msg).await,
            TransportEvent::InvalidFrame(reason) => {
                self.emit(SessionEvent::Error(format!(
                    "invalid message from server: {reason}"
                )));
                self.validator.note_invalid_frame();
                self.enforce_validator_threshold().await;
            }
            TransportEvent::FramingError(reason) => {
                // Fatal; the worker is already tearing the connection
                // down and a Closed event follows.
                self.emit(SessionEvent::Error(format!(
                    "connection desynchronized: {reason}"
                )));
            }
            TransportEvent::Closed => self.handle_unexpected_loss().await,
        }
    }

    async fn handle_message(&mut self, msg: Message) {
        let Some(msg_type) = self.validator.classify(&msg) else {
            self.emit(SessionEvent::Error(format!(
                "unknown message type {} from server",
                msg.msg_type
            )));
            self.enforce_validator_threshold().await;
            return;
        };

        match msg_type {
            ServerMessageType::Error
                if self.state == ConnectionState::Connecting =>
            {
                // Rejection during the handshake is definitive — no
                // auto-reconnect, straight back to Disconnected.
                let reason = msg
                    .field("error")
                    .unwrap_or("connection rejected by server")
                    .to_string();
                tracing::warn!(%reason, "handshake rejected");
                self.stop_heartbeat();
                self.retire_worker().await;
                self.session = None;
                self.change_state(ConnectionState::Disconnected);
                self.emit(SessionEvent::Error(reason));
            }
            ServerMessageType::Connected => self.on_connected_ack(&msg),
            ServerMessageType::Pong => {
                if let Some(heartbeat) = &self.heartbeat {
                    heartbeat.on_pong_received();
                }
            }
            ServerMessageType::RoomJoined => {
                self.change_state(ConnectionState::InRoom);
            }
            ServerMessageType::RoomLeft => {
                self.change_state(ConnectionState::Connected);
            }
            ServerMessageType::GameStarted => {
                self.change_state(ConnectionState::InGame);
            }
            ty if ty.implies_in_game() => {
                // Authoritative game traffic proves a game is running
                // even if we never saw it start (mid-game reconnect).
                if self.state != ConnectionState::InGame {
                    tracing::info!(%ty, "game traffic while not IN_GAME — following the server");
                    self.change_state(ConnectionState::InGame);
                }
            }
            ServerMessageType::GameOver => {
                // State is driven by the RoomLeft that follows; changing
                // here would race the room teardown messages.
            }
            _ => {}
        }

        self.emit(SessionEvent::MessageReceived(msg));
    }

    fn on_connected_ack(&mut self, msg: &Message) {
        if msg.field("status") != Some("success") {
            tracing::warn!(status = ?msg.field("status"), "CONNECTED without success status");
            return;
        }

        let was_reconnecting = self.state == ConnectionState::Reconnecting;
        self.change_state(ConnectionState::Connected);
        self.validator.reset();
        self.start_heartbeat();

        if was_reconnecting {
            tracing::info!("reconnection acknowledged");
            self.retry = None;
            if let Some(session) = &mut self.session {
                session.mark_recovered();
            }
            self.emit(SessionEvent::Reconnected);
        }
    }

    /// Tears down on validator threshold: reconnecting to a peer that
    /// emits garbage would just re-trip the counter, so this is
    /// definitive, like a handshake rejection.
    async fn enforce_validator_threshold(&mut self) {
        if !self.validator.threshold_reached() || self.validator_threshold_hit {
            return;
        }
        self.validator_threshold_hit = true;
        tracing::error!(
            strikes = self.validator.invalid_count(),
            "invalid-message threshold reached — disconnecting"
        );
        self.emit(SessionEvent::Error(format!(
            "server sent {} invalid messages; disconnecting",
            self.validator.invalid_count()
        )));
        self.retry = None;
        self.stop_heartbeat();
        self.retire_worker().await;
        self.session = None;
        self.change_state(ConnectionState::Disconnected);
    }

    // -- Heartbeat events -------------------------------------------------

    async fn handle_heartbeat_event(&mut self, ev: HeartbeatEvent) {
        match ev {
            HeartbeatEvent::PingSent => {}
            HeartbeatEvent::PongReceived { rtt } => {
                tracing::trace!(?rtt, "heartbeat round trip");
            }
            HeartbeatEvent::TimedOut => {
                tracing::warn!("heartbeat timeout — treating as connection loss");
                self.emit(SessionEvent::Error(
                    "server stopped responding (heartbeat timeout)".to_string(),
                ));
                self.handle_unexpected_loss().await;
            }
        }
    }

    // -- Loss and reconnection --------------------------------------------

    async fn handle_unexpected_loss(&mut self) {
        // The monitor may already have stopped itself; either way both
        // the monitor and the worker are dead weight now.
        self.stop_heartbeat();
        self.retire_worker().await;

        match self.state {
            ConnectionState::Disconnected => {}
            ConnectionState::Connecting => {
                // Loss before the handshake ack: there is no session
                // with the server to resume, so this is a failed
                // connect, not a reconnectable drop.
                self.emit(SessionEvent::Error(
                    "connection lost during handshake".to_string(),
                ));
                self.session = None;
                self.change_state(ConnectionState::Disconnected);
            }
            ConnectionState::Reconnecting => {
                // A loss during a retry (TCP came up, ack never did).
                // The disconnect timestamp is NOT reset — the budget
                // keeps draining from the first loss. Re-arm the timer
                // if the TCP success had stopped it.
                if self.retry.is_none() {
                    self.arm_retry_timer();
                }
            }
            ConnectionState::Connected
            | ConnectionState::InRoom
            | ConnectionState::InGame => {
                if let Some(session) = &mut self.session {
                    session.disconnect_time = Some(Instant::now());
                    session.reconnect_attempts = 0;
                }
                self.start_auto_reconnect();
            }
        }
    }

    fn start_auto_reconnect(&mut self) {
        tracing::info!("starting auto-reconnect");
        self.change_state(ConnectionState::Reconnecting);
        self.emit(SessionEvent::Reconnecting);
        self.arm_retry_timer();
    }

    fn arm_retry_timer(&mut self) {
        let mut interval = time::interval_at(
            time::Instant::now() + self.config.retry_interval,
            self.config.retry_interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.retry = Some(interval);
    }

    async fn attempt_reconnect(&mut self) {
        // Copy what we need out of the session up front; the borrow must
        // not span the state changes and worker teardown below.
        let (host, port, name, disconnect_time, attempt) = {
            let Some(session) = &mut self.session else {
                self.retry = None;
                return;
            };
            session.reconnect_attempts += 1;
            (
                session.host.clone(),
                session.port,
                session.player_name.clone(),
                session.disconnect_time,
                session.reconnect_attempts,
            )
        };

        if let Some(since) = disconnect_time {
            let elapsed = since.elapsed();
            if elapsed > self.config.auto_retry_budget {
                let budget = self.config.auto_retry_budget.as_secs();
                let window = self.config.session_window.as_secs();
                tracing::info!(
                    elapsed_secs = elapsed.as_secs(),
                    budget_secs = budget,
                    "auto-retry budget exceeded — stopping"
                );
                self.retry = None;
                self.change_state(ConnectionState::Disconnected);
                self.emit(SessionEvent::Error(format!(
                    "Automatic reconnection stopped after {budget}s. \
                     You can still reconnect manually until the session \
                     window ({window}s total) expires."
                )));
                return;
            }

            let remaining =
                (self.config.auto_retry_budget - elapsed).as_secs();
            tracing::info!(attempt, remaining, "reconnect attempt");
            self.emit(SessionEvent::ReconnectStatus {
                seconds_remaining: remaining,
            });
        }

        // A worker whose loop has exited can't be restarted — always a
        // fresh instance.
        self.retire_worker().await;

        match self.spawn_worker(&host, port).await {
            Ok(()) => {
                // Raw TCP is up: stop retrying and ask the server for
                // our seat back. Success is only declared on the ack.
                self.retry = None;
                if let Err(e) = self
                    .send_now(ClientMessageType::Reconnect, &[("name", name.as_str())])
                    .await
                {
                    tracing::warn!(error = %e, "reconnect handshake send failed");
                }
            }
            Err(e) => {
                // Keep the timer running; next attempt on the next tick.
                tracing::debug!(attempt, error = %e, "reconnect attempt failed");
            }
        }
    }

    // -- Component lifecycle ----------------------------------------------

    async fn spawn_worker(
        &mut self,
        host: &str,
        port: u16,
    ) -> Result<(), karma_transport::TransportError> {
        debug_assert!(self.worker.is_none(), "two live workers");
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let worker = TransportWorker::connect(
            host,
            port,
            self.config.connect_timeout,
            events_tx,
        )
        .await?;
        self.worker = Some(worker);
        self.transport_rx = Some(events_rx);
        Ok(())
    }

    /// Stops and discards the worker and its event channel together, so
    /// a stale event from a dead connection can never be mistaken for a
    /// live one.
    async fn retire_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop().await;
        }
        self.transport_rx = None;
    }

    fn start_heartbeat(&mut self) {
        self.stop_heartbeat();
        let Some(worker) = &self.worker else {
            return;
        };

        let (mut monitor, events_rx) = HeartbeatMonitor::new(HeartbeatConfig {
            ping_interval: self.config.ping_interval,
            pong_timeout: self.config.pong_timeout,
        });

        // The ping callback writes through the worker's shared write
        // path from the monitor's own task.
        let sender = worker.sender();
        let ping_wire = encode(ClientMessageType::Ping.code(), "", "", &[]);
        monitor.start(move || {
            let sender = sender.clone();
            let wire = ping_wire.clone();
            tokio::spawn(async move {
                if let Err(e) = sender.send(&wire).await {
                    // The loss surfaces through the transport events.
                    tracing::debug!(error = %e, "ping send failed");
                }
            });
        });

        self.heartbeat = Some(monitor);
        self.heartbeat_rx = Some(events_rx);
    }

    fn stop_heartbeat(&mut self) {
        if let Some(mut monitor) = self.heartbeat.take() {
            monitor.stop();
        }
        self.heartbeat_rx = None;
    }

    // -- State and events -------------------------------------------------

    /// Applies a transition if it is one of the defined edges; anything
    /// else is rejected and logged, never applied.
    fn change_state(&mut self, new: ConnectionState) {
        if new == self.state {
            return;
        }
        if !self.state.can_transition_to(new) {
            tracing::error!(from = %self.state, to = %new, "illegal state transition rejected");
            return;
        }
        let old = std::mem::replace(&mut self.state, new);
        tracing::info!(%old, %new, "state changed");
        self.emit(SessionEvent::StateChanged { old, new });
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine — events are advisory.
        let _ = self.events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Select helpers
// ---------------------------------------------------------------------------

/// Receives from an optional channel; pends forever when absent so the
/// `select!` branch simply never fires.
async fn recv_opt<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Ticks the optional retry timer; pends forever when disarmed.
async fn retry_tick(retry: &mut Option<Interval>) {
    match retry.as_mut() {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
