use super::{private_page, profile, query_param, requested};
use crate::api::AppState;
use crate::backend::{FieldErrors, PatientForm};
use crate::flow::AuthFlow;
use crate::routes::{HOME_PATH, LOGIN_PATH, Params, Resolution, Screen, Shell, guard::authorize};
use crate::session::{AuthRecord, CookieJar};
use crate::views::screens;
use axum::{
    extract::Extension,
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Every page GET: resolve through the route table, guard, then render.
pub async fn page(
    method: Method,
    uri: Uri,
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let session = state.credentials.read(&jar);
    let resolution = authorize(
        state.routes.resolve(uri.path()),
        session.as_ref(),
        requested(&uri),
    );

    match resolution {
        Resolution::Redirect { location } => {
            debug!("{} redirects to {}", uri.path(), location);
            Redirect::to(&location).into_response()
        }
        Resolution::Render {
            screen,
            shell: Some(Shell::Main),
            params,
            ..
        } => {
            let Some(session) = session else {
                return Redirect::to(LOGIN_PATH).into_response();
            };
            private(&state, &uri, screen, &params, &session).await
        }
        Resolution::Render { screen, .. } => public(&state, &jar, &uri, screen),
    }
}

async fn private(
    state: &AppState,
    uri: &Uri,
    screen: Screen,
    params: &Params,
    session: &AuthRecord,
) -> Response {
    match screen {
        Screen::Profile => {
            let editing = query_param(uri, "edit").is_some_and(|edit| edit == "true");
            profile::show(state, session, editing).await
        }
        Screen::Role => private_page(
            state,
            screen,
            session,
            &screens::role(&PatientForm::default(), None, &FieldErrors::new()),
        )
        .into_response(),
        _ => private_page(state, screen, session, &screens::placeholder(screen, params))
            .into_response(),
    }
}

fn public(state: &AppState, jar: &CookieJar, uri: &Uri, screen: Screen) -> Response {
    match screen {
        Screen::Login => {
            let next = query_param(uri, "next");
            Html(screens::login(None, "", next.as_deref(), &FieldErrors::new())).into_response()
        }
        Screen::Otp => match AuthFlow::current(&state.credentials, jar) {
            AuthFlow::AwaitingOtp(_) => Html(screens::otp(None)).into_response(),
            AuthFlow::Authenticated(_) => {
                debug!("Already signed in; OTP screen redirects home");
                Redirect::to(HOME_PATH).into_response()
            }
            AuthFlow::AwaitingCredentials => {
                debug!("No pending login; OTP screen redirects to login");
                Redirect::to(LOGIN_PATH).into_response()
            }
        },
        Screen::Register => {
            Html(screens::register(None, None, &FieldErrors::new())).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Html(screens::not_found())).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, pending_cookie, session_cookie};
    use anyhow::Result;
    use axum::{
        body::{Body, to_bytes},
        http::{
            Request, StatusCode,
            header::{COOKIE, LOCATION},
        },
    };
    use tower::ServiceExt;

    async fn get(uri: &str, cookie: Option<&str>) -> Result<axum::response::Response> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(app()?.oneshot(request.body(Body::empty())?).await?)
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    async fn body(response: axum::response::Response) -> Result<String> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    #[tokio::test]
    async fn anonymous_private_page_redirects_to_login() -> Result<()> {
        let response = get("/dashboard?tab=1", None).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Fdashboard%3Ftab%3D1");
        Ok(())
    }

    #[tokio::test]
    async fn login_page_carries_next() -> Result<()> {
        let response = get("/login?next=%2Fdashboard", None).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await?;
        assert!(html.contains(r#"name="next" value="/dashboard""#));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_goes_to_not_found() -> Result<()> {
        let response = get("/xyz123", None).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/404");

        let response = get("/404", None).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await?.contains("Page not found"));
        Ok(())
    }

    #[tokio::test]
    async fn authenticated_placeholder_renders_in_shell() -> Result<()> {
        let cookie = session_cookie();
        let response = get("/doctor/42", Some(&cookie)).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await?;
        assert!(html.contains("Doctor ID: 42"));
        assert!(html.contains(r#"action="/logout""#));
        assert!(html.contains("admin"));
        Ok(())
    }

    #[tokio::test]
    async fn add_doctor_is_not_a_doctor_id() -> Result<()> {
        let cookie = session_cookie();
        let html = body(get("/doctor/add", Some(&cookie)).await?).await?;
        assert!(html.contains("<h1>Add Doctor</h1>"));
        assert!(!html.contains("Doctor ID"));
        Ok(())
    }

    #[tokio::test]
    async fn otp_without_pending_login_redirects() -> Result<()> {
        let response = get("/login/otp", None).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        Ok(())
    }

    #[tokio::test]
    async fn otp_screen_follows_flow_state() -> Result<()> {
        let response = get("/login/otp", Some(&pending_cookie())).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body(response).await?.contains("Verify OTP"));

        let cookie = format!("{}; {}", session_cookie(), pending_cookie());
        let response = get("/login/otp", Some(&cookie)).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_cookie_is_no_session() -> Result<()> {
        let response = get("/profile", Some("auth=not-json")).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Fprofile");
        Ok(())
    }

    #[tokio::test]
    async fn role_form_renders_for_session() -> Result<()> {
        let cookie = session_cookie();
        let html = body(get("/role", Some(&cookie)).await?).await?;
        assert!(html.contains("<h1>Add Role</h1>"));
        assert!(html.contains(r#"<option value="Male">Male</option>"#));
        Ok(())
    }
}
