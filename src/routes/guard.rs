//! Session check for private routes.
//!
//! Private screens require a valid [`AuthRecord`]; without one the request is
//! redirected to the login screen with the requested path kept in `next`.

use super::{Access, HOME_PATH, LOGIN_PATH, Resolution};
use crate::session::AuthRecord;
use tracing::debug;
use url::form_urlencoded;

#[must_use]
pub fn authorize(
    resolution: Resolution,
    session: Option<&AuthRecord>,
    requested: &str,
) -> Resolution {
    match resolution {
        Resolution::Render {
            access: Access::Private,
            screen,
            ..
        } if session.is_none() => {
            debug!("No session for private screen {screen:?}; redirecting to login");
            Resolution::Redirect {
                location: login_redirect(requested),
            }
        }
        other => other,
    }
}

/// Login path carrying `requested` as the post-login destination.
#[must_use]
pub fn login_redirect(requested: &str) -> String {
    if requested.is_empty() || requested == HOME_PATH {
        return LOGIN_PATH.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", requested)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}
