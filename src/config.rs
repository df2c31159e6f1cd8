use crate::model::Track;
use crate::view::parse_flag;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const SECRETS_FILE: &str = "secrets.toml";
const FALLBACK_SECRETS_DIR: &str = ".streamlit";
pub const PLAYLIST_KEY: &str = "PLAYLIST_DATA";

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_AUDIO_MB: usize = 64;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub playlist_data: Option<String>,
    pub secrets_path: PathBuf,
    pub fetch_timeout: Duration,
    pub max_audio_bytes: usize,
    pub inline_audio: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_raw = lookup("SHELLARCHIVE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .with_context(|| format!("invalid SHELLARCHIVE_BIND address {bind_raw}"))?;

        let fetch_timeout_secs = match lookup("SHELLARCHIVE_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| {
                    format!("SHELLARCHIVE_FETCH_TIMEOUT_SECS must be a number, got {raw}")
                })?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        let max_audio_mb = match lookup("SHELLARCHIVE_MAX_AUDIO_MB") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SHELLARCHIVE_MAX_AUDIO_MB must be a number, got {raw}"))?,
            None => DEFAULT_MAX_AUDIO_MB,
        };

        let secrets_path = match lookup("SHELLARCHIVE_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir).join(SECRETS_FILE),
            None => PathBuf::from(FALLBACK_SECRETS_DIR).join(SECRETS_FILE),
        };

        Ok(Self {
            bind_addr,
            playlist_data: lookup(PLAYLIST_KEY).filter(|raw| !raw.trim().is_empty()),
            secrets_path,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            max_audio_bytes: max_audio_mb.saturating_mul(1024 * 1024),
            inline_audio: lookup("SHELLARCHIVE_INLINE_AUDIO").is_some_and(|raw| parse_flag(&raw)),
        })
    }
}

pub fn load_playlist(config: &ServerConfig) -> Vec<Track> {
    let raw = match config.playlist_data.clone() {
        Some(raw) => {
            info!("reading playlist from {PLAYLIST_KEY} environment variable");
            raw
        }
        None => match read_secrets_value(&config.secrets_path) {
            Ok(Some(raw)) => {
                info!("reading playlist from {}", config.secrets_path.display());
                raw
            }
            Ok(None) => {
                warn!(
                    "no {PLAYLIST_KEY} found in environment or {}; serving placeholder playlist",
                    config.secrets_path.display()
                );
                return placeholder_playlist();
            }
            Err(err) => {
                warn!("{err:#}; serving placeholder playlist");
                return placeholder_playlist();
            }
        },
    };

    match parse_playlist(&raw) {
        Ok(tracks) => {
            info!("loaded {} tracks", tracks.len());
            tracks
        }
        Err(err) => {
            warn!("{err:#}; serving placeholder playlist");
            placeholder_playlist()
        }
    }
}

pub fn placeholder_playlist() -> Vec<Track> {
    vec![Track::placeholder()]
}

pub fn parse_playlist(raw: &str) -> Result<Vec<Track>> {
    serde_json::from_str(raw)
        .with_context(|| format!("failed to parse {PLAYLIST_KEY} as a track list"))
}

pub fn read_secrets_value(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read secrets file {}", path.display()))?;
    let table: toml::Table = toml::from_str(&raw)
        .with_context(|| format!("failed to parse secrets file {}", path.display()))?;

    match table.get(PLAYLIST_KEY) {
        None => Ok(None),
        Some(toml::Value::String(json)) => Ok(Some(json.clone())),
        Some(other) => serde_json::to_string(other)
            .map(Some)
            .with_context(|| format!("unsupported {PLAYLIST_KEY} value in {}", path.display())),
    }
}
