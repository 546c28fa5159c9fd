//! # Hospadmin (hospital administration front end)
//!
//! `hospadmin` serves the hospital administration screens over a REST backend.
//! It owns the browser session and the routing; every domain operation is
//! delegated to the backend.
//!
//! ## Session
//!
//! The logged-in session is an [`session::AuthRecord`] (token plus optional role)
//! stored in a single `auth` cookie. The [`session::Credentials`] facade never caches
//! it: every read re-parses the cookie and malformed values read as "no session".
//!
//! ## Routing
//!
//! Page requests resolve through an ordered [`routes::RouteTable`] of private
//! (layout shell) and public (standalone) entries; first match wins and unknown
//! paths redirect to `/404`. Private screens require a valid session, otherwise
//! the request is redirected to `/login` with the requested path preserved.
//!
//! ## Login
//!
//! Login is two steps, credentials then OTP, tracked by [`flow::AuthFlow`].

pub mod api;
pub mod backend;
pub mod cli;
pub mod flow;
pub mod routes;
pub mod session;
pub mod views;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
