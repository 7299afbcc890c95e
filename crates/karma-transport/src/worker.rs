//! The transport worker: one socket, one receive loop, one write path.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;

use karma_protocol::{decode, Message, MessageFramer};

use crate::TransportError;

/// How long [`TransportWorker::stop`] waits for the receive loop to exit
/// before proceeding anyway.
pub const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Size of one socket read.
const RECV_BUFFER_SIZE: usize = 4096;

/// Notifications from a worker to its owner.
///
/// Delivered over the unbounded channel handed to
/// [`TransportWorker::connect`]; the worker never calls back into owner
/// state directly.
#[derive(Debug)]
pub enum TransportEvent {
    /// A complete frame arrived and decoded.
    Message(Message),

    /// One frame failed to decode. Recoverable — the receive loop keeps
    /// running, and the owner decides whether repeated occurrences add
    /// up to something worse.
    InvalidFrame(String),

    /// The framing buffer overflowed: the stream is desynchronized and
    /// the worker is tearing the connection down. A [`Closed`](Self::Closed)
    /// follows.
    FramingError(String),

    /// The connection is gone — graceful peer close and socket errors
    /// both land here. Fired at most once per worker, and never for an
    /// owner-initiated [`stop`](TransportWorker::stop).
    Closed,
}

/// Owns one TCP connection attempt.
///
/// On a successful connect the worker spawns a dedicated receive loop
/// task that feeds socket chunks through the framer and codec and
/// forwards every decoded [`Message`] as an event. Sends from any task
/// funnel through a single mutex-guarded write half.
///
/// A worker is single-use: once its receive loop has exited (loss or
/// stop) it cannot be restarted — the session layer creates a fresh
/// instance for every attempt.
pub struct TransportWorker {
    sender: TransportSender,
    shutdown: watch::Sender<bool>,
    recv_task: Option<JoinHandle<()>>,
}

/// A cheap, cloneable handle to a worker's write path.
///
/// Lets other components (the heartbeat's ping callback, for one) write
/// to the socket without owning the worker. All clones funnel through
/// the same per-socket mutex, so writes never interleave.
#[derive(Clone)]
pub struct TransportSender {
    peer: String,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    events: mpsc::UnboundedSender<TransportEvent>,
    /// Cleared exactly once, by whichever side observes the loss first.
    connected: Arc<AtomicBool>,
}

impl TransportSender {
    /// Writes one already-encoded wire string to the socket.
    ///
    /// # Errors
    /// Returns [`TransportError::Closed`] once the connection is lost;
    /// a write failure marks the connection lost itself.
    pub async fn send(&self, wire: &str) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        let mut writer = self.writer.lock().await;
        match writer.write_all(wire.as_bytes()).await {
            Ok(()) => {
                tracing::trace!(peer = %self.peer, len = wire.len(), "sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "send failed");
                mark_lost(&self.connected, &self.events);
                Err(TransportError::Io(e))
            }
        }
    }

    /// Returns `true` until the connection is lost or stopped.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl TransportWorker {
    /// Opens a TCP connection and starts the receive loop.
    ///
    /// Performs no retries. Failure is classified so the session layer
    /// can report it precisely:
    ///
    /// # Errors
    /// - [`TransportError::Refused`] — the peer refused the connection
    /// - [`TransportError::TimedOut`] — no answer within `timeout`
    /// - [`TransportError::Io`] — anything else
    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let peer = format!("{host}:{port}");

        let stream = match time::timeout(timeout, TcpStream::connect(&*peer)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(TransportError::Refused(peer));
            }
            Ok(Err(e)) => return Err(TransportError::Io(e)),
            Err(_) => return Err(TransportError::TimedOut(peer)),
        };

        // Frames are tiny; don't let Nagle batch them.
        let _ = stream.set_nodelay(true);

        let (read_half, write_half) = stream.into_split();
        let connected = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tracing::info!(%peer, "transport connected");

        let recv_task = tokio::spawn(recv_loop(
            read_half,
            events.clone(),
            Arc::clone(&connected),
            shutdown_rx,
            peer.clone(),
        ));

        Ok(Self {
            sender: TransportSender {
                peer,
                writer: Arc::new(Mutex::new(write_half)),
                events,
                connected,
            },
            shutdown: shutdown_tx,
            recv_task: Some(recv_task),
        })
    }

    /// Writes one already-encoded wire string to the socket.
    ///
    /// Safe to call from any task — writes serialize through the
    /// per-socket mutex and never interleave.
    ///
    /// # Errors
    /// Returns [`TransportError::Closed`] once the connection is lost;
    /// a write failure marks the connection lost itself.
    pub async fn send(&self, wire: &str) -> Result<(), TransportError> {
        self.sender.send(wire).await
    }

    /// A cloneable handle to this worker's write path.
    pub fn sender(&self) -> TransportSender {
        self.sender.clone()
    }

    /// Returns `true` until the connection is lost or stopped.
    pub fn is_connected(&self) -> bool {
        self.sender.is_connected()
    }

    /// The `host:port` this worker connected to.
    pub fn peer(&self) -> &str {
        &self.sender.peer
    }

    /// Tears the worker down: suppresses further events, signals the
    /// receive loop, shuts the socket down, and waits up to
    /// [`STOP_JOIN_TIMEOUT`] for the loop to finish — then proceeds
    /// regardless. Idempotent.
    pub async fn stop(&mut self) {
        // Owner-initiated teardown must not surface as a loss event.
        self.sender.connected.store(false, Ordering::SeqCst);
        let _ = self.shutdown.send(true);
        let _ = self.sender.writer.lock().await.shutdown().await;

        if let Some(task) = self.recv_task.take() {
            if time::timeout(STOP_JOIN_TIMEOUT, task).await.is_err() {
                tracing::warn!(
                    peer = %self.sender.peer,
                    "receive loop did not exit within join timeout"
                );
            }
            tracing::info!(peer = %self.sender.peer, "transport stopped");
        }
    }
}

/// Flags the connection as lost and emits the single `Closed` event.
///
/// The swap makes the notification idempotent no matter which side
/// (receive loop or a failed send) observes the loss first.
fn mark_lost(
    connected: &AtomicBool,
    events: &mpsc::UnboundedSender<TransportEvent>,
) {
    if connected.swap(false, Ordering::SeqCst) {
        let _ = events.send(TransportEvent::Closed);
    }
}

/// The dedicated receive loop. Runs until shutdown or loss.
async fn recv_loop(
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
    peer: String,
) {
    let mut framer = MessageFramer::default();
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    tracing::debug!(%peer, "receive loop started");

    loop {
        tokio::select! {
            // Sender dropped counts as shutdown too.
            _ = shutdown.changed() => break,

            result = reader.read(&mut buf) => match result {
                Ok(0) => {
                    tracing::info!(%peer, "peer closed connection");
                    mark_lost(&connected, &events);
                    break;
                }
                Ok(n) => {
                    let chunk = String::from_utf8_lossy(&buf[..n]);
                    match framer.add_data(&chunk) {
                        Ok(frames) => {
                            for frame in frames {
                                dispatch_frame(&frame, &events, &peer);
                            }
                        }
                        Err(e) => {
                            // Desynchronized stream: unrecoverable.
                            tracing::error!(%peer, error = %e, "framing overflow");
                            let _ = events.send(TransportEvent::FramingError(
                                e.to_string(),
                            ));
                            mark_lost(&connected, &events);
                            break;
                        }
                    }
                }
                Err(e) => {
                    if connected.load(Ordering::SeqCst) {
                        tracing::warn!(%peer, error = %e, "socket error");
                    }
                    mark_lost(&connected, &events);
                    break;
                }
            },
        }
    }

    // A partial frame from a dead connection must not leak anywhere.
    framer.clear();
    tracing::debug!(%peer, "receive loop stopped");
}

/// Decodes one frame and forwards the result.
fn dispatch_frame(
    frame: &str,
    events: &mpsc::UnboundedSender<TransportEvent>,
    peer: &str,
) {
    match decode(frame) {
        Ok(msg) => {
            tracing::trace!(%peer, %msg, "received");
            let _ = events.send(TransportEvent::Message(msg));
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "undecodable frame");
            let _ = events.send(TransportEvent::InvalidFrame(e.to_string()));
        }
    }
}
