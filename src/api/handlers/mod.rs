pub mod auth;
pub mod health;
pub mod pages;
pub mod profile;
pub mod role;

use super::AppState;
use crate::routes::{Screen, guard::login_redirect};
use crate::session::{AuthRecord, CookieJar};
use crate::views;
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Redirect, Response};
use url::form_urlencoded;

/// Path plus query, as the browser asked for it.
pub(crate) fn requested(uri: &Uri) -> &str {
    uri.path_and_query()
        .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str())
}

pub(crate) fn query_param(uri: &Uri, name: &str) -> Option<String> {
    form_urlencoded::parse(uri.query()?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Wrap private screen content in the layout shell.
pub(crate) fn private_page(
    state: &AppState,
    screen: Screen,
    session: &AuthRecord,
    content: &str,
) -> Html<String> {
    Html(views::shell(
        state.navigation(),
        screen,
        session.role.as_deref(),
        content,
    ))
}

/// Session for a form post to a private screen, or the login redirect.
pub(crate) fn require_session(
    state: &AppState,
    jar: &CookieJar,
    path: &str,
) -> Result<AuthRecord, Response> {
    state
        .credentials
        .read(jar)
        .ok_or_else(|| Redirect::to(&login_redirect(path)).into_response())
}
