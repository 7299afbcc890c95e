//! Heartbeat: periodic ping emission and pong-deadline timeout detection.
//!
//! TCP alone can take minutes to notice a dead peer. The heartbeat
//! notices in one pong deadline: every ping arms a timer, and a deadline
//! that elapses without a pong means the connection is dead no matter
//! what the socket thinks.
//!
//! The monitor is deliberately dumb about consequences — it reports
//! liveness upward and never attempts reconnection itself.

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};

// ---------------------------------------------------------------------------
// Config and events
// ---------------------------------------------------------------------------

/// Heartbeat timing.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings. The first ping fires immediately on
    /// start, not one interval later.
    pub ping_interval: Duration,
    /// How long after each ping the pong must arrive.
    pub pong_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(2),
            pong_timeout: Duration::from_secs(2),
        }
    }
}

/// Notifications from the monitor to its owner.
#[derive(Debug)]
pub enum HeartbeatEvent {
    /// A ping was handed to the send function.
    PingSent,
    /// The awaited pong arrived within the deadline.
    PongReceived {
        /// Ping-to-pong round trip.
        rtt: Duration,
    },
    /// No pong before the deadline. Fired exactly once; the monitor has
    /// already stopped itself — no further pings go to a connection
    /// judged dead.
    TimedOut,
}

/// Control messages into the timer task.
enum MonitorCommand {
    PongReceived,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Periodic ping emission with pong-deadline supervision.
///
/// The timer state (`last_ping_time`, `awaiting_pong`) lives inside the
/// spawned task and is recreated on every [`start`](Self::start), so a
/// stop/start cycle can never leak a stale deadline into the next
/// connection.
pub struct HeartbeatMonitor {
    config: HeartbeatConfig,
    events: mpsc::UnboundedSender<HeartbeatEvent>,
    commands: Option<mpsc::UnboundedSender<MonitorCommand>>,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatMonitor {
    /// Creates a monitor and the event channel its owner will read.
    pub fn new(
        config: HeartbeatConfig,
    ) -> (Self, mpsc::UnboundedReceiver<HeartbeatEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                events: events_tx,
                commands: None,
                task: None,
            },
            events_rx,
        )
    }

    /// Starts the timer task. `send_ping` is called once immediately and
    /// then once per interval; each call arms the pong deadline.
    ///
    /// Starting an already-running monitor is a no-op with a warning.
    pub fn start<F>(&mut self, send_ping: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_running() {
            tracing::warn!("heartbeat already running");
            return;
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let config = self.config.clone();
        let events = self.events.clone();

        self.commands = Some(cmd_tx);
        self.task = Some(tokio::spawn(run(config, send_ping, events, cmd_rx)));

        tracing::info!(
            interval = ?self.config.ping_interval,
            deadline = ?self.config.pong_timeout,
            "heartbeat started"
        );
    }

    /// Feeds a received pong into the timer task.
    ///
    /// Called by the controller when the server's pong message arrives.
    /// A pong while stopped (or with none awaited) is logged and ignored.
    pub fn on_pong_received(&self) {
        match &self.commands {
            Some(commands) if self.is_running() => {
                let _ = commands.send(MonitorCommand::PongReceived);
            }
            _ => tracing::warn!("pong received but heartbeat not running"),
        }
    }

    /// Cancels both timers. Idempotent — safe to call repeatedly and
    /// after the monitor stopped itself on timeout.
    pub fn stop(&mut self) {
        // Dropping the command sender closes the channel; the task
        // treats that as the stop signal.
        if self.commands.take().is_some() {
            tracing::info!("heartbeat stopped");
        }
        self.task = None;
    }

    /// `true` while the timer task is alive.
    pub fn is_running(&self) -> bool {
        self.commands.is_some()
            && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Timer task
// ---------------------------------------------------------------------------

/// The timer loop: ping on the interval, watch the deadline, stop on
/// timeout or when the command channel closes.
async fn run<F>(
    config: HeartbeatConfig,
    mut send_ping: F,
    events: mpsc::UnboundedSender<HeartbeatEvent>,
    mut commands: mpsc::UnboundedReceiver<MonitorCommand>,
) where
    F: FnMut() + Send + 'static,
{
    let mut ticker = time::interval(config.ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut awaiting_pong = false;
    let mut last_ping_time = Instant::now();
    let mut deadline: Option<Pin<Box<Sleep>>> = None;

    loop {
        tokio::select! {
            // Deadline and next ping can be due at the same instant
            // (interval == timeout). The deadline must win: once the
            // connection is judged dead, no further ping may go out.
            biased;

            cmd = commands.recv() => match cmd {
                Some(MonitorCommand::PongReceived) => {
                    if awaiting_pong {
                        awaiting_pong = false;
                        deadline = None;
                        let rtt = last_ping_time.elapsed();
                        tracing::debug!(?rtt, "pong received");
                        let _ = events.send(HeartbeatEvent::PongReceived { rtt });
                    } else {
                        tracing::warn!("pong received but none awaited");
                    }
                }
                // Channel closed: the owner called stop() or dropped us.
                None => break,
            },

            () = async { deadline.as_mut().expect("deadline armed").await },
                if deadline.is_some() =>
            {
                tracing::warn!(
                    timeout = ?config.pong_timeout,
                    "no pong within deadline"
                );
                let _ = events.send(HeartbeatEvent::TimedOut);
                break;
            }

            _ = ticker.tick() => {
                send_ping();
                awaiting_pong = true;
                last_ping_time = Instant::now();
                deadline = Some(Box::pin(time::sleep(config.pong_timeout)));
                tracing::trace!("ping sent");
                let _ = events.send(HeartbeatEvent::PingSent);
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
