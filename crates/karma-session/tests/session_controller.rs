//! Integration tests for the session controller.
//!
//! Each test stands up a real TCP listener playing the server's half of
//! the protocol and drives the controller through its public handle,
//! asserting on the event stream. Timings are compressed (hundreds of
//! milliseconds instead of the production 60 s / 120 s windows) so the
//! reconnection policy can be exercised in real time.

use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use karma_session::{
    spawn_session, ConnectionState, SessionConfig, SessionError, SessionEvent,
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Base config: quick retries, heartbeat effectively disabled so ping
/// traffic doesn't interfere with the scenario under test.
fn quiet_config() -> SessionConfig {
    SessionConfig {
        connect_timeout: Duration::from_secs(2),
        ping_interval: Duration::from_secs(60),
        pong_timeout: Duration::from_secs(60),
        retry_interval: Duration::from_millis(100),
        auto_retry_budget: Duration::from_secs(10),
        session_window: Duration::from_secs(20),
        invalid_msg_threshold: 3,
    }
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    (listener, port)
}

/// Reads one newline-terminated line from the server side of the socket.
async fn read_line(stream: &mut TcpStream) -> String {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = timeout(EVENT_TIMEOUT, stream.read(&mut byte))
            .await
            .expect("read within timeout")
            .expect("read");
        if n == 0 || byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    String::from_utf8(line).expect("utf8 line")
}

/// Reads lines until one with the given type code, skipping heartbeat
/// pings and anything else.
async fn read_until_type(stream: &mut TcpStream, code: &str) -> String {
    loop {
        let line = read_line(stream).await;
        if line.split('|').next() == Some(code) {
            return line;
        }
    }
}

/// Accepts a connection, consumes the CONNECT handshake, and acknowledges.
async fn accept_and_ack(listener: &TcpListener) -> TcpStream {
    let (mut stream, _) = timeout(EVENT_TIMEOUT, listener.accept())
        .await
        .expect("accept within timeout")
        .expect("accept");
    let handshake = read_line(&mut stream).await;
    assert_eq!(handshake.split('|').next(), Some("0"), "expected CONNECT");
    stream.write_all(b"100|||st=ok\n").await.expect("ack");
    stream
}

/// Waits for the first event matching the predicate, skipping others.
async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    mut pred: impl FnMut(&SessionEvent) -> bool,
) -> SessionEvent {
    timeout(EVENT_TIMEOUT, async {
        loop {
            let ev = events.recv().await.expect("event channel open");
            if pred(&ev) {
                return ev;
            }
        }
    })
    .await
    .expect("expected event within timeout")
}

async fn wait_for_state(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    to: ConnectionState,
) {
    wait_for(events, |ev| {
        matches!(ev, SessionEvent::StateChanged { new, .. } if *new == to)
    })
    .await;
}

// =========================================================================
// Connect and the room/game flow
// =========================================================================

#[tokio::test]
async fn test_connect_handshake_and_room_flow() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");

    let (mut server, _) = listener.accept().await.expect("accept");
    // The handshake carries the player name under the compact code.
    assert_eq!(read_line(&mut server).await, "0|||nm=Alice");

    wait_for_state(&mut events, ConnectionState::Connecting).await;

    server.write_all(b"100|||st=ok\n").await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await;
    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::MessageReceived(m)
            if m.msg_type == 100 && m.field("status") == Some("success"))
    })
    .await;

    // Room join round trip.
    handle.send_join_room().await.expect("join");
    assert_eq!(read_until_type(&mut server, "2").await, "2|||");
    server.write_all(b"101||R1|\n").await.unwrap();
    wait_for_state(&mut events, ConnectionState::InRoom).await;

    // Game start, a play, and the room teardown at game end.
    server.write_all(b"105|||\n").await.unwrap();
    wait_for_state(&mut events, ConnectionState::InGame).await;

    handle.send_play_cards("2H,2D").await.expect("play");
    assert_eq!(read_until_type(&mut server, "7").await, "7|||cd=2H,2D");

    // GAME_OVER leaves the state alone; the ROOM_LEFT drives it.
    server.write_all(b"112|||wn=Alice\n102|||st=lft\n").await.unwrap();
    wait_for_state(&mut events, ConnectionState::Connected).await;
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Connected);

    handle.disconnect().await.expect("disconnect");
}

#[tokio::test]
async fn test_connect_rejected_outside_disconnected() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // A second connect must fail and must not open a second socket.
    let result = handle.connect("127.0.0.1", port, "Alice").await;
    assert!(matches!(result, Err(SessionError::InvalidState { .. })));
    assert!(
        timeout(Duration::from_millis(300), listener.accept())
            .await
            .is_err(),
        "no second connection may be opened"
    );
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Connected);

    drop(server);
}

#[tokio::test]
async fn test_tcp_connect_failure_is_classified_and_state_restored() {
    let (listener, port) = bind().await;
    drop(listener); // the port now refuses

    let (handle, _events) = spawn_session(quiet_config());
    let result = handle.connect("127.0.0.1", port, "Alice").await;

    assert!(matches!(
        result,
        Err(SessionError::Transport(
            karma_transport::TransportError::Refused(_)
        ))
    ));
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Disconnected);

    // Nothing cached from the failed attempt.
    assert!(matches!(
        handle.reconnect_manually().await,
        Err(SessionError::NoCachedSession)
    ));
}

// =========================================================================
// Handshake rejection
// =========================================================================

#[tokio::test]
async fn test_server_rejection_goes_straight_to_disconnected() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let (mut server, _) = listener.accept().await.expect("accept");
    read_line(&mut server).await;

    // Rejection while Connecting is definitive.
    server.write_all(b"103|||er=name already taken\n").await.unwrap();

    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::Error(e) if e.contains("name already taken"))
    })
    .await;
    wait_for_state(&mut events, ConnectionState::Disconnected).await;

    // No auto-reconnect after a rejection.
    assert!(
        timeout(Duration::from_millis(400), listener.accept())
            .await
            .is_err(),
        "rejection must not trigger reconnect attempts"
    );

    // The session is gone too, so manual reconnect has nothing to use.
    assert!(matches!(
        handle.reconnect_manually().await,
        Err(SessionError::NoCachedSession)
    ));
}

// =========================================================================
// Mid-game state recovery
// =========================================================================

#[tokio::test]
async fn test_game_state_forces_in_game() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let mut server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // Authoritative game traffic with no GAME_STARTED ever observed:
    // the controller follows the server straight into the game.
    server.write_all(b"106|||h=2H,10D|yt=1\n").await.unwrap();

    wait_for_state(&mut events, ConnectionState::InGame).await;
    let ev = wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::MessageReceived(m) if m.msg_type == 106)
    })
    .await;
    let SessionEvent::MessageReceived(msg) = ev else {
        unreachable!()
    };
    // Compact field names arrive expanded.
    assert_eq!(msg.field("hand"), Some("2H,10D"));
    assert_eq!(msg.field("your_turn"), Some("1"));

    handle.disconnect().await.unwrap();
}

// =========================================================================
// Unexpected loss and reconnection
// =========================================================================

#[tokio::test]
async fn test_unexpected_loss_reconnects_with_identity() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // Kill the connection out from under the client.
    drop(server);

    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnecting)).await;
    wait_for_state(&mut events, ConnectionState::Reconnecting).await;

    // The retry loop opens a fresh connection and replays the identity
    // through the RECONNECT handshake — not CONNECT.
    let (mut server, _) = timeout(EVENT_TIMEOUT, listener.accept())
        .await
        .expect("reconnect attempt")
        .expect("accept");
    assert_eq!(read_line(&mut server).await, "6|||nm=Alice");

    // Only the server ack confirms the reconnection.
    server.write_all(b"100|||st=ok\n").await.unwrap();
    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnected)).await;
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Connected);

    handle.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_auto_retry_stops_after_budget_and_stays_stopped() {
    let mut config = quiet_config();
    config.retry_interval = Duration::from_millis(100);
    config.auto_retry_budget = Duration::from_millis(400);

    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(config);

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // Lose the connection AND the server, so every retry is refused.
    drop(server);
    drop(listener);

    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnecting)).await;
    // Progress reports carry the shrinking window.
    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::ReconnectStatus { .. })
    })
    .await;

    // Once the budget is exceeded the controller gives up for good and
    // tells the user manual reconnection is still possible.
    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::Error(e) if e.contains("manually"))
    })
    .await;
    wait_for_state(&mut events, ConnectionState::Disconnected).await;

    // And it stays stopped: no spontaneous resumption.
    let resumed = timeout(Duration::from_millis(400), async {
        loop {
            match events.recv().await {
                Some(SessionEvent::Reconnecting)
                | Some(SessionEvent::ReconnectStatus { .. }) => break,
                Some(_) => continue,
                None => std::future::pending().await,
            }
        }
    })
    .await;
    assert!(resumed.is_err(), "auto-retry must not resume on its own");
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_second_loss_does_not_reset_the_window() {
    let mut config = quiet_config();
    config.retry_interval = Duration::from_millis(200);
    config.auto_retry_budget = Duration::from_millis(600);

    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(config);

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // First loss starts the clock.
    let first_loss = Instant::now();
    drop(server);
    wait_for_state(&mut events, ConnectionState::Reconnecting).await;

    // First retry gets TCP up, the server stalls without acking, then
    // the connection dies again — a second loss observed while already
    // Reconnecting, well into the window.
    let (mut server, _) = timeout(EVENT_TIMEOUT, listener.accept())
        .await
        .expect("retry attempt")
        .expect("accept");
    read_line(&mut server).await; // the RECONNECT handshake
    tokio::time::sleep(Duration::from_millis(500)).await;
    drop(server);
    drop(listener); // all further retries refused

    // The window still expires relative to the FIRST loss, at roughly
    // 0.9 s. Had the second loss (at ~0.7 s) reset the timestamp,
    // expiry could not land before ~1.3 s.
    wait_for_state(&mut events, ConnectionState::Disconnected).await;
    let elapsed = first_loss.elapsed();
    assert!(
        elapsed < Duration::from_millis(1150),
        "window was reset by the second loss: expired after {elapsed:?}"
    );
}

#[tokio::test]
async fn test_manual_reconnect_after_auto_retry_gave_up() {
    let mut config = quiet_config();
    config.retry_interval = Duration::from_millis(100);
    config.auto_retry_budget = Duration::from_millis(300);

    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(config);

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    drop(server);
    drop(listener);
    wait_for_state(&mut events, ConnectionState::Disconnected).await;

    // The server comes back on the same port; the cached identity makes
    // a manual reconnect possible within this process.
    let listener = TcpListener::bind(("127.0.0.1", port)).await.expect("rebind");
    handle.reconnect_manually().await.expect("manual reconnect");
    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnecting)).await;

    let (mut server, _) = timeout(EVENT_TIMEOUT, listener.accept())
        .await
        .expect("manual attempt")
        .expect("accept");
    assert_eq!(read_line(&mut server).await, "6|||nm=Alice");
    server.write_all(b"100|||st=ok\n").await.unwrap();

    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnected)).await;
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Connected);

    handle.disconnect().await.unwrap();
}

// =========================================================================
// Heartbeat integration
// =========================================================================

#[tokio::test]
async fn test_heartbeat_timeout_triggers_reconnection() {
    let mut config = quiet_config();
    config.ping_interval = Duration::from_millis(100);
    config.pong_timeout = Duration::from_millis(100);
    config.retry_interval = Duration::from_millis(100);

    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(config);

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let mut server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // The first ping arrives immediately; never answer it.
    assert_eq!(read_until_type(&mut server, "4").await, "4|||");

    // The pong deadline passes → heartbeat timeout → same path as an
    // unexpected transport loss.
    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::Error(e) if e.contains("heartbeat"))
    })
    .await;
    wait_for_state(&mut events, ConnectionState::Reconnecting).await;

    // Answer the reconnect; pongs flow this time.
    let (mut server2, _) = timeout(EVENT_TIMEOUT, listener.accept())
        .await
        .expect("reconnect attempt")
        .expect("accept");
    assert_eq!(read_line(&mut server2).await, "6|||nm=Alice");
    server2.write_all(b"100|||st=ok\n").await.unwrap();
    wait_for(&mut events, |ev| matches!(ev, SessionEvent::Reconnected)).await;

    // Keep the revived connection alive through one ping/pong exchange.
    assert_eq!(read_until_type(&mut server2, "4").await, "4|||");
    server2.write_all(b"104|||\n").await.unwrap();

    handle.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_pong_keeps_the_connection_alive() {
    let mut config = quiet_config();
    config.ping_interval = Duration::from_millis(100);
    config.pong_timeout = Duration::from_millis(100);

    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(config);

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let mut server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // Answer several pings; the session must stay Connected throughout.
    for _ in 0..3 {
        assert_eq!(read_until_type(&mut server, "4").await, "4|||");
        server.write_all(b"104|||\n").await.unwrap();
    }
    assert_eq!(handle.state().await.unwrap(), ConnectionState::Connected);

    handle.disconnect().await.unwrap();
}

// =========================================================================
// Validator threshold
// =========================================================================

#[tokio::test]
async fn test_invalid_message_threshold_tears_the_session_down() {
    let (listener, port) = bind().await;
    let (handle, mut events) = spawn_session(quiet_config());

    handle.connect("127.0.0.1", port, "Alice").await.expect("connect");
    let mut server = accept_and_ack(&listener).await;
    wait_for_state(&mut events, ConnectionState::Connected).await;

    // Three strikes: two undecodable frames and an unknown type code.
    server
        .write_all(b"not a message\n???\n555|||\n")
        .await
        .unwrap();

    wait_for(&mut events, |ev| {
        matches!(ev, SessionEvent::Error(e) if e.contains("invalid messages"))
    })
    .await;
    wait_for_state(&mut events, ConnectionState::Disconnected).await;

    // Desynchronization is definitive: no reconnect attempts follow.
    assert!(
        timeout(Duration::from_millis(400), listener.accept())
            .await
            .is_err(),
        "threshold teardown must not auto-reconnect"
    );
}
