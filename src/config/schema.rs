use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/segue/config.toml` or `~/.config/segue/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SEGUE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub control: ControlSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// How often the end-of-track monitor polls the device (milliseconds).
    pub poll_interval_ms: u64,
    /// Start playing the first track right after the initial folder scan.
    pub autoplay: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            autoplay: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder scanned at startup when no directory is given on the command line.
    pub music_dir: String,
    /// File extensions to treat as audio (without dot).
    pub extensions: Vec<String>,
    /// Compare extensions byte-for-byte (`song.MP3` is skipped when only `mp3` is listed).
    pub case_sensitive_extensions: bool,
    /// Read title/artist from embedded tags instead of using the file name.
    pub read_tags: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_dir: "music".to_string(),
            extensions: vec!["mp3".into()],
            case_sensitive_extensions: true,
            read_tags: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Whether to open the line-based TCP control channel.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 9012,
        }
    }
}

impl ControlSettings {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
