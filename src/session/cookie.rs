//! Request-scoped cookie jar over HTTP headers.
//!
//! Reads come from the request `Cookie` header, writes become `Set-Cookie`
//! headers on the response. Writes are visible to later reads within the same
//! request so a handler observes its own changes.

use super::store::{CookieAttributes, SessionStore, StoreError, check};
use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use std::{collections::HashMap, convert::Infallible};

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    incoming: HashMap<String, String>,
    // None marks a removal made during this request.
    changed: HashMap<String, Option<String>>,
    set_cookies: Vec<HeaderValue>,
}

impl CookieJar {
    /// Parse every `Cookie` header; the first value for a name wins.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut incoming = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                    continue;
                };
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                incoming
                    .entry(key.to_string())
                    .or_insert_with(|| val.trim().to_string());
            }
        }

        Self {
            incoming,
            changed: HashMap::new(),
            set_cookies: Vec::new(),
        }
    }

    /// `Set-Cookie` values accumulated by writes and removals, in order.
    #[must_use]
    pub fn set_cookie_headers(&self) -> &[HeaderValue] {
        &self.set_cookies
    }

    fn push(&mut self, cookie: &str, name: &str) -> Result<(), StoreError> {
        let value =
            HeaderValue::from_str(cookie).map_err(|_| StoreError::InvalidValue(name.to_string()))?;
        self.set_cookies.push(value);
        Ok(())
    }
}

/// Render a `Set-Cookie` header value.
#[must_use]
pub fn format_set_cookie(name: &str, value: &str, attributes: &CookieAttributes) -> String {
    let mut cookie = format!(
        "{name}={value}; Path={}; Max-Age={}; SameSite={}",
        attributes.path,
        attributes.max_age.as_secs(),
        attributes.same_site
    );
    if attributes.http_only {
        cookie.push_str("; HttpOnly");
    }
    if attributes.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

impl SessionStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        match self.changed.get(name) {
            Some(changed) => changed.clone(),
            None => self.incoming.get(name).cloned(),
        }
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), StoreError> {
        check(name, value, attributes)?;
        self.push(&format_set_cookie(name, value, attributes), name)?;
        self.changed
            .insert(name.to_string(), Some(value.to_string()));
        Ok(())
    }

    fn remove(&mut self, name: &str, attributes: &CookieAttributes) -> Result<(), StoreError> {
        check(name, "", attributes)?;
        let mut expired = attributes.clone();
        expired.max_age = std::time::Duration::ZERO;
        self.push(&format_set_cookie(name, "", &expired), name)?;
        self.changed.insert(name.to_string(), None);
        Ok(())
    }
}

impl<S> FromRequestParts<S> for CookieJar
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

impl IntoResponseParts for CookieJar {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.set_cookies {
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}
