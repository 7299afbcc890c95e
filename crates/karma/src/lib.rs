//! # Karma
//!
//! Client core for the Karma two-player card game: the wire protocol,
//! the TCP session layer with heartbeat and bounded reconnection, the
//! game rules, and the ambient pieces a desktop front end needs
//! (settings snapshot, logging handle).
//!
//! A front end drives the whole thing through the session handle and
//! its event stream:
//!
//! ```rust,no_run
//! use karma::prelude::*;
//!
//! # async fn example() -> Result<(), KarmaError> {
//! let _log = init_logging(LogConfig::default())?;
//!
//! let (session, mut events) = spawn_session(SessionConfig::default());
//! session.connect("127.0.0.1", 8080, "Alice").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::StateChanged { old, new } => {
//!             println!("{old} -> {new}");
//!         }
//!         SessionEvent::MessageReceived(msg) => {
//!             println!("server says: {msg}");
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;
mod settings;

pub use error::KarmaError;
pub use logging::{init_logging, LogConfig, LogGuard};
pub use settings::{ConnectionSettings, PlayerSettings, Settings};

/// One-stop imports for client front ends.
pub mod prelude {
    pub use crate::{
        init_logging, KarmaError, LogConfig, LogGuard, Settings,
    };
    pub use karma_protocol::{
        ClientMessageType, Message, ServerMessageType,
    };
    pub use karma_rules::{can_play_on, parse_card_list, validate_play, Card};
    pub use karma_session::{
        spawn_session, ConnectionState, SessionConfig, SessionError,
        SessionEvent, SessionHandle,
    };
}
