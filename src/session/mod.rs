//! Browser session: the `auth` credential cookie and the pending-OTP cookie.
//!
//! [`Credentials`] is a stateless facade over a [`SessionStore`]. It never
//! caches: every read decodes the stored value again. Writes and removals
//! never fail outward; storage errors are logged and swallowed. A value that
//! does not decode into a valid record reads as `None`.
//!
//! Values are compact JSON encoded as unpadded base64url so they stay within
//! the cookie-octet alphabet.

mod cookie;
mod memory;
mod store;

pub use self::cookie::{CookieJar, format_set_cookie};
pub use self::memory::MemoryStore;
pub use self::store::{CookieAttributes, SameSite, SessionStore, StoreError};

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error};

pub const AUTH_COOKIE: &str = "auth";
pub const PENDING_COOKIE: &str = "auth_pending";

const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_PENDING_TTL_SECONDS: u64 = 5 * 60;

/// The logged-in session: a bearer token and an optional role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AuthRecord {
    #[must_use]
    pub fn new(token: impl Into<String>, role: Option<String>) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    /// A record authenticates only with a non-empty token. Role shape is
    /// enforced by deserialization (string, null or absent).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }
}

/// A login waiting for its OTP, keyed by the backend's pending-session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    pub pending_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PendingLogin {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.pending_id.trim().is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct CookieConfig {
    session_ttl: Duration,
    pending_ttl: Duration,
    secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            pending_ttl: Duration::from_secs(DEFAULT_PENDING_TTL_SECONDS),
            secure: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_pending_ttl_seconds(mut self, seconds: u64) -> Self {
        self.pending_ttl = Duration::from_secs(seconds);
        self
    }

    /// `Secure` is only set when the site is served over HTTPS (production).
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    #[must_use]
    pub fn session_attributes(&self) -> CookieAttributes {
        CookieAttributes::new(self.session_ttl).with_secure(self.secure)
    }

    #[must_use]
    pub fn pending_attributes(&self) -> CookieAttributes {
        CookieAttributes::new(self.pending_ttl).with_secure(self.secure)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Credentials {
    config: CookieConfig,
}

impl Credentials {
    #[must_use]
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Store the session record, replacing any previous one.
    pub fn write<S: SessionStore + ?Sized>(&self, store: &mut S, record: &AuthRecord) {
        let attributes = self.config.session_attributes();
        put(store, AUTH_COOKIE, record, &attributes);
    }

    /// The current session record, or `None` when absent or malformed.
    pub fn read<S: SessionStore + ?Sized>(&self, store: &S) -> Option<AuthRecord> {
        let record: AuthRecord = take(store, AUTH_COOKIE)?;
        if record.is_valid() {
            Some(record)
        } else {
            debug!("Ignoring {AUTH_COOKIE} cookie with empty token");
            None
        }
    }

    pub fn clear<S: SessionStore + ?Sized>(&self, store: &mut S) {
        let attributes = self.config.session_attributes();
        drop_cookie(store, AUTH_COOKIE, &attributes);
    }

    pub fn write_pending<S: SessionStore + ?Sized>(&self, store: &mut S, pending: &PendingLogin) {
        let attributes = self.config.pending_attributes();
        put(store, PENDING_COOKIE, pending, &attributes);
    }

    pub fn read_pending<S: SessionStore + ?Sized>(&self, store: &S) -> Option<PendingLogin> {
        let pending: PendingLogin = take(store, PENDING_COOKIE)?;
        pending.is_valid().then_some(pending)
    }

    pub fn clear_pending<S: SessionStore + ?Sized>(&self, store: &mut S) {
        let attributes = self.config.pending_attributes();
        drop_cookie(store, PENDING_COOKIE, &attributes);
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn decode<T: DeserializeOwned>(name: &str, raw: &str) -> Option<T> {
    let bytes = match Base64UrlUnpadded::decode_vec(raw) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("Ignoring {name} cookie that is not base64url: {err}");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("Ignoring malformed {name} cookie: {err}");
            None
        }
    }
}

fn put<S, T>(store: &mut S, name: &str, value: &T, attributes: &CookieAttributes)
where
    S: SessionStore + ?Sized,
    T: Serialize,
{
    let encoded = match encode(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            error!("Failed to encode {name} cookie: {err}");
            return;
        }
    };
    match store.set(name, &encoded, attributes) {
        Ok(()) => debug!("Cookie {name} set"),
        Err(err) => error!("Failed to set {name} cookie: {err}"),
    }
}

fn take<S, T>(store: &S, name: &str) -> Option<T>
where
    S: SessionStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = store.get(name)?;
    decode(name, &raw)
}

fn drop_cookie<S: SessionStore + ?Sized>(store: &mut S, name: &str, attributes: &CookieAttributes) {
    match store.remove(name, attributes) {
        Ok(()) => debug!("Cookie {name} cleared"),
        Err(err) => error!("Failed to clear {name} cookie: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    fn credentials() -> Credentials {
        Credentials::new(CookieConfig::new())
    }

    fn raw(json: &str) -> String {
        Base64UrlUnpadded::encode_string(json.as_bytes())
    }

    /// Replay the jar's `Set-Cookie` headers as the next request's `Cookie` header.
    fn next_request(jar: &CookieJar) -> CookieJar {
        let pairs: Vec<String> = jar
            .set_cookie_headers()
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter(|pair| !pair.ends_with('='))
            .map(ToString::to_string)
            .collect();
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&pairs.join("; ")) {
            headers.insert(COOKIE, value);
        }
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn write_then_read_round_trips() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        for record in [
            AuthRecord::new("abc123", Some("admin".to_string())),
            AuthRecord::new("t", None),
            AuthRecord::new("token with spaces; and \"quotes\"", Some(String::new())),
        ] {
            credentials.write(&mut store, &record);
            assert_eq!(credentials.read(&store), Some(record));
        }
    }

    #[test]
    fn read_after_clear_is_none() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        let record = AuthRecord::new("abc123", Some("admin".to_string()));

        credentials.write(&mut store, &record);
        assert_eq!(credentials.read(&store), Some(record));

        credentials.clear(&mut store);
        assert_eq!(credentials.read(&store), None);
    }

    #[test]
    fn empty_token_is_not_a_session() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        credentials.write(&mut store, &AuthRecord::new("", None));
        assert_eq!(credentials.read(&store), None);
    }

    #[test]
    fn malformed_values_read_as_none() {
        let credentials = credentials();
        let cases = [
            "not base64 at all!".to_string(),
            raw("{not json"),
            raw("\"just a string\""),
            raw("{}"),
            raw(r#"{"role":"admin"}"#),
            raw(r#"{"token":42}"#),
            raw(r#"{"token":"abc","role":7}"#),
            raw(r#"{"token":"abc","role":["admin"]}"#),
        ];
        for value in cases {
            let mut store = MemoryStore::new();
            store.insert_raw(AUTH_COOKIE, &value);
            assert_eq!(credentials.read(&store), None, "value: {value}");
        }
    }

    #[test]
    fn cookie_value_is_base64url_json() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        credentials.write(&mut store, &AuthRecord::new("abc123", Some("admin".to_string())));

        let Some(value) = store.get(AUTH_COOKIE) else {
            panic!("auth cookie should be written");
        };
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(value, raw(r#"{"token":"abc123","role":"admin"}"#));

        let mut store = MemoryStore::new();
        store.insert_raw(AUTH_COOKIE, "%7B%22token%22%3A%22abc123%22%7D");
        assert_eq!(credentials.read(&store), None);
    }

    #[test]
    fn role_may_be_null_or_absent() {
        let credentials = credentials();
        for json in [r#"{"token":"abc","role":null}"#, r#"{"token":"abc"}"#] {
            let mut store = MemoryStore::new();
            store.insert_raw(AUTH_COOKIE, &raw(json));
            assert_eq!(credentials.read(&store), Some(AuthRecord::new("abc", None)));
        }

        let mut store = MemoryStore::new();
        store.insert_raw(AUTH_COOKIE, &raw(r#"{"token":"abc","role":"staff","extra":1}"#));
        assert_eq!(
            credentials.read(&store),
            Some(AuthRecord::new("abc", Some("staff".to_string())))
        );
    }

    #[test]
    fn store_failures_are_contained() {
        let credentials = credentials();
        let mut store = MemoryStore::read_only();
        credentials.write(&mut store, &AuthRecord::new("abc", None));
        credentials.clear(&mut store);
        assert_eq!(credentials.read(&store), None);
    }

    #[test]
    fn scenario_write_read_clear() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        let record = AuthRecord::new("abc123", Some("admin".to_string()));

        credentials.write(&mut store, &record);
        assert_eq!(
            credentials.read(&store),
            Some(AuthRecord::new("abc123", Some("admin".to_string())))
        );
        credentials.clear(&mut store);
        assert_eq!(credentials.read(&store), None);
    }

    #[test]
    fn round_trips_through_http_headers() {
        let credentials = credentials();
        let record = AuthRecord::new("abc123", Some("admin".to_string()));

        let mut jar = CookieJar::default();
        credentials.write(&mut jar, &record);
        let next = next_request(&jar);
        assert_eq!(credentials.read(&next), Some(record));

        let mut jar = next;
        credentials.clear(&mut jar);
        assert_eq!(credentials.read(&next_request(&jar)), None);
    }

    #[test]
    fn session_cookie_attributes_follow_environment() {
        let mut jar = CookieJar::default();
        let production = Credentials::new(CookieConfig::new().with_secure(true));
        production.write(&mut jar, &AuthRecord::new("abc", None));

        let header = jar.set_cookie_headers()[0].to_str().unwrap_or_default();
        assert!(header.starts_with("auth="));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=604800"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.ends_with("; Secure"));

        let mut jar = CookieJar::default();
        credentials().write(&mut jar, &AuthRecord::new("abc", None));
        let header = jar.set_cookie_headers()[0].to_str().unwrap_or_default();
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn pending_login_round_trips_and_clears() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        let pending = PendingLogin {
            pending_id: "p-1".to_string(),
            next: Some("/profile".to_string()),
        };

        credentials.write_pending(&mut store, &pending);
        assert_eq!(credentials.read_pending(&store), Some(pending));
        assert_eq!(credentials.read(&store), None);

        credentials.clear_pending(&mut store);
        assert_eq!(credentials.read_pending(&store), None);
    }

    #[test]
    fn blank_pending_id_is_ignored() {
        let credentials = credentials();
        let mut store = MemoryStore::new();
        store.insert_raw(PENDING_COOKIE, &raw(r#"{"pendingId":"  "}"#));
        assert_eq!(credentials.read_pending(&store), None);
    }
}
