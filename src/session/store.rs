//! The storage capability behind the session facade.
//!
//! A [`SessionStore`] is a flat name/value jar with cookie attributes. The
//! request-scoped [`super::CookieJar`] backs it with HTTP headers; tests swap in
//! [`super::MemoryStore`].

use std::{fmt, time::Duration};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes sent with every write and removal of a cookie.
///
/// Removal must reuse the attributes of the write; jars ignore a removal whose
/// path differs from the stored cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub path: String,
    pub max_age: Duration,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieAttributes {
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self {
            path: "/".to_string(),
            max_age,
            secure: false,
            http_only: true,
            same_site: SameSite::Strict,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid cookie name: {0}")]
    InvalidName(String),
    #[error("invalid cookie value for {0}")]
    InvalidValue(String),
    #[error("invalid cookie path: {0}")]
    InvalidPath(String),
    #[error("cookie store is read-only")]
    ReadOnly,
}

pub trait SessionStore {
    /// Current value for `name`, if present and not expired.
    fn get(&self, name: &str) -> Option<String>;

    /// Store `value` under `name`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the name, value or attributes cannot be stored.
    fn set(
        &mut self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), StoreError>;

    /// Remove `name`. Removing an absent name is not an error.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be recorded.
    fn remove(&mut self, name: &str, attributes: &CookieAttributes) -> Result<(), StoreError>;
}

/// RFC 6265 token characters for cookie names.
pub(crate) fn valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

/// RFC 6265 cookie-octet characters for cookie values.
pub(crate) fn valid_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

pub(crate) fn valid_cookie_path(path: &str) -> bool {
    path.starts_with('/') && !path.bytes().any(|b| b == b';' || b.is_ascii_control())
}

pub(crate) fn check(
    name: &str,
    value: &str,
    attributes: &CookieAttributes,
) -> Result<(), StoreError> {
    if !valid_cookie_name(name) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    if !valid_cookie_value(value) {
        return Err(StoreError::InvalidValue(name.to_string()));
    }
    if !valid_cookie_path(&attributes.path) {
        return Err(StoreError::InvalidPath(attributes.path.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attributes_are_strict_and_root_scoped() {
        let attributes = CookieAttributes::new(Duration::from_secs(60));
        assert_eq!(attributes.path, "/");
        assert_eq!(attributes.same_site, SameSite::Strict);
        assert!(attributes.http_only);
        assert!(!attributes.secure);
    }

    #[test]
    fn cookie_names_reject_separators() {
        assert!(valid_cookie_name("auth"));
        assert!(valid_cookie_name("auth_pending"));
        assert!(!valid_cookie_name(""));
        assert!(!valid_cookie_name("a=b"));
        assert!(!valid_cookie_name("a b"));
        assert!(!valid_cookie_name("a;b"));
    }

    #[test]
    fn cookie_values_reject_json_punctuation() {
        assert!(valid_cookie_value("eyJ0b2tlbiI6ImFiYyJ9"));
        assert!(valid_cookie_value(""));
        assert!(!valid_cookie_value("{\"token\":\"abc\"}"));
        assert!(!valid_cookie_value("a,b"));
        assert!(!valid_cookie_value("a;b"));
    }

    #[test]
    fn check_reports_the_offending_part() {
        let attributes = CookieAttributes::new(Duration::from_secs(60));
        assert_eq!(
            check("auth", "a b", &attributes),
            Err(StoreError::InvalidValue("auth".to_string()))
        );
        let bad_path = attributes.clone().with_path("admin");
        assert_eq!(
            check("auth", "abc", &bad_path),
            Err(StoreError::InvalidPath("admin".to_string()))
        );
        assert_eq!(check("auth", "abc", &attributes), Ok(()));
    }
}
