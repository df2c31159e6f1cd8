use crate::model::SessionState;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "shellarchive_session";
const SESSION_ID_LEN: usize = 24;
const SESSION_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SESSION_IDLE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn update<T>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(id) {
            let idle_ttl = self.idle_ttl;
            entries.retain(|_, entry| now.duration_since(entry.last_seen) < idle_ttl);
        }

        let entry = entries.entry(id.to_string()).or_insert_with(|| SessionEntry {
            state: SessionState::default(),
            last_seen: now,
        });
        entry.last_seen = now;
        f(&mut entry.state)
    }

    pub fn peek(&self, id: &str) -> Option<SessionState> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn generate_session_id() -> String {
    (0..SESSION_ID_LEN)
        .map(|_| {
            let idx = rand::random_range(0..SESSION_ID_CHARS.len());
            SESSION_ID_CHARS[idx] as char
        })
        .collect()
}

pub fn is_valid_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_LEN && value.bytes().all(|byte| SESSION_ID_CHARS.contains(&byte))
}

pub fn session_id_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_session_id(value))
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
