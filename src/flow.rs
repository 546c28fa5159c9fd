//! Two-step login: credentials, then OTP.
//!
//! The state is derived from the stored cookies on every request. The pending
//! record carries the backend's pending-session id, which links the OTP to the
//! login that requested it.

use crate::routes::{HOME_PATH, LOGIN_PATH, OTP_PATH};
use crate::session::{AuthRecord, Credentials, PendingLogin, SessionStore};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlow {
    AwaitingCredentials,
    AwaitingOtp(PendingLogin),
    Authenticated(AuthRecord),
}

impl AuthFlow {
    pub fn current<S: SessionStore + ?Sized>(credentials: &Credentials, store: &S) -> Self {
        if let Some(record) = credentials.read(store) {
            return Self::Authenticated(record);
        }
        match credentials.read_pending(store) {
            Some(pending) => Self::AwaitingOtp(pending),
            None => Self::AwaitingCredentials,
        }
    }
}

pub struct FlowContext<'a, S: SessionStore + ?Sized> {
    credentials: &'a Credentials,
    store: &'a mut S,
}

impl<'a, S: SessionStore + ?Sized> FlowContext<'a, S> {
    pub fn new(credentials: &'a Credentials, store: &'a mut S) -> Self {
        Self { credentials, store }
    }

    #[must_use]
    pub fn state(&self) -> AuthFlow {
        AuthFlow::current(self.credentials, &*self.store)
    }

    /// Credentials accepted and an OTP was sent. Returns the OTP path.
    pub fn login_succeeded(&mut self, pending: &PendingLogin) -> &'static str {
        self.credentials.write_pending(&mut *self.store, pending);
        info!("Login accepted, awaiting OTP");
        OTP_PATH
    }

    /// OTP accepted. Stores the session and returns the post-login path.
    pub fn otp_verified(&mut self, pending: &PendingLogin, record: &AuthRecord) -> String {
        self.credentials.write(&mut *self.store, record);
        self.credentials.clear_pending(&mut *self.store);
        info!("OTP verified, session established");
        return_path(pending.next.as_deref())
    }

    pub fn logout(&mut self) -> &'static str {
        self.credentials.clear(&mut *self.store);
        self.credentials.clear_pending(&mut *self.store);
        info!("Session cleared");
        LOGIN_PATH
    }
}

/// Local post-login destination; anything else falls back to home.
#[must_use]
pub fn return_path(next: Option<&str>) -> String {
    let Some(next) = next.map(str::trim) else {
        return HOME_PATH.to_string();
    };
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    let login = next == LOGIN_PATH
        || next.starts_with("/login/")
        || next.starts_with("/login?");
    if local && !login {
        next.to_string()
    } else {
        HOME_PATH.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CookieConfig, MemoryStore};

    fn pending(next: Option<&str>) -> PendingLogin {
        PendingLogin {
            pending_id: "pending-1".to_string(),
            next: next.map(ToString::to_string),
        }
    }

    #[test]
    fn walks_the_login_steps() {
        let credentials = Credentials::new(CookieConfig::new());
        let mut store = MemoryStore::new();
        let mut flow = FlowContext::new(&credentials, &mut store);
        assert_eq!(flow.state(), AuthFlow::AwaitingCredentials);

        let pending = pending(Some("/profile"));
        assert_eq!(flow.login_succeeded(&pending), OTP_PATH);
        assert_eq!(flow.state(), AuthFlow::AwaitingOtp(pending.clone()));

        let record = AuthRecord::new("abc123", Some("admin".to_string()));
        assert_eq!(flow.otp_verified(&pending, &record), "/profile");
        assert_eq!(flow.state(), AuthFlow::Authenticated(record));
        assert_eq!(credentials.read_pending(&store), None);
    }

    #[test]
    fn logout_clears_everything() {
        let credentials = Credentials::new(CookieConfig::new());
        let mut store = MemoryStore::new();
        let mut flow = FlowContext::new(&credentials, &mut store);
        flow.login_succeeded(&pending(None));
        flow.otp_verified(&pending(None), &AuthRecord::new("abc", None));

        assert_eq!(flow.logout(), LOGIN_PATH);
        assert_eq!(flow.state(), AuthFlow::AwaitingCredentials);
        assert!(store.is_empty());
    }

    #[test]
    fn return_path_accepts_local_paths_only() {
        assert_eq!(return_path(None), "/");
        assert_eq!(return_path(Some("/doctor/42")), "/doctor/42");
        assert_eq!(return_path(Some("/profile?edit=true")), "/profile?edit=true");
        assert_eq!(return_path(Some("https://evil.example")), "/");
        assert_eq!(return_path(Some("//evil.example")), "/");
        assert_eq!(return_path(Some("/\\evil.example")), "/");
        assert_eq!(return_path(Some("/login")), "/");
        assert_eq!(return_path(Some("/login/otp")), "/");
        assert_eq!(return_path(Some("")), "/");
    }
}
