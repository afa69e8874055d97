//! Server-side sessions keyed by a cookie-carried id.
//!
//! Session ids are only ever read from the `Cookie` header. Every
//! [`SessionStore::start`] hands out a fresh id and copies the existing data
//! over. The previous id keeps resolving for a short grace period so
//! concurrent requests carrying it still see the session, then it is gone.
//!
//! Sessions without data are never stored.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{utils::generate_session_id, AuthError};

pub const SESSION_COOKIE_NAME: &str = "sec_session_id";

const DEFAULT_IDLE_TIMEOUT_SECONDS: u64 = 1440;
const DEFAULT_ROTATION_GRACE_SECONDS: u64 = 30;
/// Upper bound between two sweeps of expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct SessionConfig {
    cookie_secure: bool,
    idle_timeout: Duration,
    rotation_grace: Duration,
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookie_secure: true,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECONDS),
            rotation_grace: Duration::from_secs(DEFAULT_ROTATION_GRACE_SECONDS),
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// How long a replaced session id keeps resolving.
    #[must_use]
    pub fn with_rotation_grace(mut self, rotation_grace: Duration) -> Self {
        self.rotation_grace = rotation_grace;
        self
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    #[must_use]
    pub fn rotation_grace(&self) -> Duration {
        self.rotation_grace
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a logged-in session carries. All three are set together by a
/// successful login; a session missing any of them is not logged in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Digits only.
    pub user_id: Option<String>,
    /// `[a-zA-Z0-9_-]` only.
    pub username: Option<String>,
    pub login_string: Option<String>,
}

impl SessionData {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A started session: its current id plus the data to read and mutate.
#[derive(Debug)]
pub struct Session {
    id: String,
    /// The id this session was resumed from, if any.
    previous: Option<String>,
    pub data: SessionData,
}

impl Session {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

struct SessionEntry {
    data: SessionData,
    touched_at: Instant,
    /// Set once the id has been replaced by a newer one.
    retired_at: Option<Instant>,
}

impl SessionEntry {
    fn new(data: SessionData, now: Instant) -> Self {
        Self {
            data,
            touched_at: now,
            retired_at: None,
        }
    }

    fn is_live(&self, now: Instant, config: &SessionConfig) -> bool {
        now.saturating_duration_since(self.touched_at) < config.idle_timeout
            && self.retired_at.map_or(true, |retired| {
                now.saturating_duration_since(retired) < config.rotation_grace
            })
    }
}

struct Entries {
    map: HashMap<String, SessionEntry>,
    last_sweep: Instant,
}

pub struct SessionStore {
    config: SessionConfig,
    entries: Mutex<Entries>,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start (or resume) the session for this request under a new id.
    ///
    /// # Errors
    /// Returns [`AuthError::InsecureSession`] if no session id can be
    /// generated or the id cannot be carried in a cookie.
    pub async fn start(&self, headers: &HeaderMap) -> Result<Session, AuthError> {
        let previous = extract_session_id(headers);
        let id = generate_session_id()
            .map_err(|err| AuthError::InsecureSession(format!("session id: {err}")))?;
        // Fail before touching any state if the id could not be sent back.
        self.cookie_for(&id)?;

        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        self.sweep(&mut entries, now);

        let mut data = SessionData::default();
        let mut resumed_from = None;
        if let Some(old) = previous {
            if let Some(entry) = entries.map.get_mut(&old) {
                if entry.is_live(now, &self.config) {
                    data = entry.data.clone();
                    entry.retired_at.get_or_insert(now);
                    resumed_from = Some(old);
                }
            }
        }

        let resumed = resumed_from.is_some();
        debug!(resumed, "session started");

        if !data.is_empty() {
            entries
                .map
                .insert(id.clone(), SessionEntry::new(data.clone(), now));
        }

        Ok(Session {
            id,
            previous: resumed_from,
            data,
        })
    }

    /// Persist the session's data under its current id. A session without
    /// data is dropped instead.
    pub async fn save(&self, session: &Session) {
        let mut entries = self.entries.lock().await;
        if session.data.is_empty() {
            entries.map.remove(&session.id);
        } else {
            entries.map.insert(
                session.id.clone(),
                SessionEntry::new(session.data.clone(), Instant::now()),
            );
        }
    }

    /// Drop the session and the id it was resumed from (logout).
    pub async fn destroy(&self, session: &Session) {
        let mut entries = self.entries.lock().await;
        entries.map.remove(&session.id);
        if let Some(previous) = &session.previous {
            entries.map.remove(previous);
        }
    }

    /// `Set-Cookie` value carrying the session id.
    ///
    /// # Errors
    /// Returns [`AuthError::InsecureSession`] if the cookie is not a valid header.
    pub fn cookie(&self, session: &Session) -> Result<HeaderValue, AuthError> {
        self.cookie_for(&session.id)
    }

    /// `Set-Cookie` value that expires the session cookie in the browser.
    ///
    /// # Errors
    /// Returns [`AuthError::InsecureSession`] if the cookie is not a valid header.
    pub fn expired_cookie(&self) -> Result<HeaderValue, AuthError> {
        self.build_cookie(&format!(
            "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        ))
    }

    fn sweep(&self, entries: &mut Entries, now: Instant) {
        let interval = self.config.idle_timeout.min(SWEEP_INTERVAL);
        if now.saturating_duration_since(entries.last_sweep) < interval {
            return;
        }
        let before = entries.map.len();
        entries.map.retain(|_, entry| entry.is_live(now, &self.config));
        entries.last_sweep = now;
        debug!(removed = before - entries.map.len(), "swept sessions");
    }

    fn cookie_for(&self, id: &str) -> Result<HeaderValue, AuthError> {
        // No Max-Age: the cookie lives for the browser session.
        self.build_cookie(&format!(
            "{SESSION_COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax"
        ))
    }

    fn build_cookie(&self, cookie: &str) -> Result<HeaderValue, AuthError> {
        let mut cookie = cookie.to_string();
        if self.config.cookie_secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|err| AuthError::InsecureSession(format!("cookie header: {err}")))
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }
}

/// Session id from the `Cookie` header; nothing else is consulted.
fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}
