//! Client settings: an immutable snapshot with validated mutations.
//!
//! A loaded [`Settings`] value is never edited in place. Mutation goes
//! through `with_*` operations that validate and return a **new**
//! snapshot, and persistence is an explicit, fallible step — so a
//! half-written or invalid settings file can never leak into a running
//! client, and concurrent readers always see a consistent value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::KarmaError;

/// Player names are what the server keys sessions on; keep them short
/// and unambiguous on the wire.
pub const MAX_PLAYER_NAME_LEN: usize = 32;

/// Connection preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Server host to offer in the connect dialog.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether unexpected losses should auto-reconnect.
    pub auto_reconnect: bool,
}

/// Player preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Last name used, re-offered on the next connect.
    pub last_name: String,
    /// Whether to remember `last_name` at all.
    pub remember_name: bool,
}

/// One immutable snapshot of the client's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Connection preferences.
    pub connection: ConnectionSettings,
    /// Player preferences.
    pub player: PlayerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                auto_reconnect: true,
            },
            player: PlayerSettings {
                last_name: String::new(),
                remember_name: true,
            },
        }
    }
}

impl Settings {
    /// Loads a snapshot from disk. A missing file yields the defaults;
    /// an unreadable or malformed file is an error, not a silent reset.
    pub fn load(path: &Path) -> Result<Self, KarmaError> {
        if !path.exists() {
            tracing::info!(?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| KarmaError::Settings(format!("read {path:?}: {e}")))?;
        let settings = serde_json::from_str(&text)
            .map_err(|e| KarmaError::Settings(format!("parse {path:?}: {e}")))?;
        tracing::info!(?path, "settings loaded");
        Ok(settings)
    }

    /// Persists this snapshot. Scoped and fallible; the in-memory value
    /// is unaffected either way.
    pub fn save(&self, path: &Path) -> Result<(), KarmaError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| KarmaError::Settings(format!("serialize: {e}")))?;
        std::fs::write(path, text)
            .map_err(|e| KarmaError::Settings(format!("write {path:?}: {e}")))?;
        tracing::info!(?path, "settings saved");
        Ok(())
    }

    /// A new snapshot with different connection coordinates.
    ///
    /// # Errors
    /// [`KarmaError::Settings`] for an empty host or port 0.
    pub fn with_connection(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Self, KarmaError> {
        if host.trim().is_empty() {
            return Err(KarmaError::Settings("host must not be empty".into()));
        }
        if port == 0 {
            return Err(KarmaError::Settings("port must not be 0".into()));
        }
        let mut next = self.clone();
        next.connection.host = host.trim().to_string();
        next.connection.port = port;
        Ok(next)
    }

    /// A new snapshot remembering a different player name.
    ///
    /// # Errors
    /// [`KarmaError::Settings`] unless the name is 1–32 characters of
    /// `[A-Za-z0-9_-]` — the charset the server accepts on the wire.
    pub fn with_player_name(&self, name: &str) -> Result<Self, KarmaError> {
        if name.is_empty() || name.len() > MAX_PLAYER_NAME_LEN {
            return Err(KarmaError::Settings(format!(
                "player name must be 1-{MAX_PLAYER_NAME_LEN} characters"
            )));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(KarmaError::Settings(
                "player name may only contain letters, digits, _ and -".into(),
            ));
        }
        let mut next = self.clone();
        next.player.last_name = name.to_string();
        Ok(next)
    }

    /// A new snapshot with auto-reconnect toggled.
    pub fn with_auto_reconnect(&self, enabled: bool) -> Self {
        let mut next = self.clone();
        next.connection.auto_reconnect = enabled;
        next
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "karma-settings-{tag}-{}.json",
            std::process::id()
        ))
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/karma.json"))
            .expect("defaults");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("roundtrip");
        let settings = Settings::default()
            .with_connection("10.0.0.5", 9999)
            .unwrap()
            .with_player_name("Alice_42")
            .unwrap();

        settings.save(&path).expect("save");
        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded, settings);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_malformed_file_is_an_error_not_a_reset() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();

        let result = Settings::load(&path);
        assert!(matches!(result, Err(KarmaError::Settings(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_with_connection_validates() {
        let base = Settings::default();
        assert!(base.with_connection("", 8080).is_err());
        assert!(base.with_connection("   ", 8080).is_err());
        assert!(base.with_connection("host", 0).is_err());

        let next = base.with_connection(" example.net ", 1234).unwrap();
        assert_eq!(next.connection.host, "example.net");
        assert_eq!(next.connection.port, 1234);
        // The original snapshot is untouched.
        assert_eq!(base.connection.host, "127.0.0.1");
    }

    #[test]
    fn test_with_player_name_validates_charset_and_length() {
        let base = Settings::default();
        assert!(base.with_player_name("").is_err());
        assert!(base.with_player_name(&"x".repeat(33)).is_err());
        assert!(base.with_player_name("bad name").is_err());
        assert!(base.with_player_name("bad|name").is_err());

        let next = base.with_player_name("Good_name-1").unwrap();
        assert_eq!(next.player.last_name, "Good_name-1");
        assert_eq!(base.player.last_name, "");
    }

    #[test]
    fn test_with_auto_reconnect_produces_new_snapshot() {
        let base = Settings::default();
        let next = base.with_auto_reconnect(false);
        assert!(!next.connection.auto_reconnect);
        assert!(base.connection.auto_reconnect);
    }
}
