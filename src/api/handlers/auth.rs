use crate::api::AppState;
use crate::backend::{FieldErrors, LoginForm, OtpForm, Registration};
use crate::flow::{AuthFlow, FlowContext};
use crate::routes::{HOME_PATH, LOGIN_PATH};
use crate::session::{AuthRecord, CookieJar, PendingLogin};
use crate::views::{Notice, screens};
use axum::{
    Form,
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// `POST /login`: submit credentials, then continue to the OTP step.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    mut jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = form.next.as_deref().filter(|next| !next.trim().is_empty());
    let email = form.email.trim();

    let errors = form.validate();
    if !errors.is_empty() {
        let html = screens::login(None, email, next, &errors);
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    }

    match state.backend.login(&form).await {
        Ok(challenge) => {
            let pending = PendingLogin {
                pending_id: challenge.pending_id,
                next: next.map(ToString::to_string),
            };
            let location = FlowContext::new(&state.credentials, &mut jar).login_succeeded(&pending);
            (jar, Redirect::to(location)).into_response()
        }
        Err(err) => {
            warn!("Login failed: {err}");
            let notice = Notice::error(err.user_message("Login failed. Please try again."));
            let html = screens::login(Some(&notice), email, next, &FieldErrors::new());
            (err.status_code(), Html(html)).into_response()
        }
    }
}

/// `POST /login/otp`: verify the code for the pending login.
pub async fn verify_otp(
    Extension(state): Extension<Arc<AppState>>,
    mut jar: CookieJar,
    Form(form): Form<OtpForm>,
) -> Response {
    let mut flow = FlowContext::new(&state.credentials, &mut jar);
    let pending = match flow.state() {
        AuthFlow::AwaitingOtp(pending) => pending,
        AuthFlow::Authenticated(_) => {
            debug!("OTP submitted with an active session");
            return Redirect::to(HOME_PATH).into_response();
        }
        AuthFlow::AwaitingCredentials => {
            debug!("OTP submitted without a pending login");
            return Redirect::to(LOGIN_PATH).into_response();
        }
    };

    if !form.is_well_formed() {
        let notice = Notice::error("Enter the numeric code you received");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(screens::otp(Some(&notice))),
        )
            .into_response();
    }

    match state.backend.verify_otp(&pending, &form).await {
        Ok(verified) => {
            let record = AuthRecord::new(verified.token, verified.role);
            let location = flow.otp_verified(&pending, &record);
            (jar, Redirect::to(&location)).into_response()
        }
        Err(err) => {
            warn!("OTP verification failed: {err}");
            let notice = Notice::error(err.user_message("Invalid OTP. Please try again."));
            (err.status_code(), Html(screens::otp(Some(&notice)))).into_response()
        }
    }
}

/// `POST /register`: create the hospital account, then offer the login screen.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<Registration>,
) -> Response {
    let errors = form.validate();
    if !errors.is_empty() {
        let html = screens::register(None, Some(&form), &errors);
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    }

    match state.backend.register(&form).await {
        Ok(message) => {
            info!("Hospital registered");
            let notice = Notice::success(
                message.unwrap_or_else(|| "Registration successful. Please log in.".to_string()),
            );
            let html = screens::login(Some(&notice), form.email.trim(), None, &FieldErrors::new());
            Html(html).into_response()
        }
        Err(err) => {
            error!("Registration failed: {err}");
            let notice = Notice::error(err.user_message("Registration failed. Please try again."));
            let html = screens::register(Some(&notice), Some(&form), &FieldErrors::new());
            (err.status_code(), Html(html)).into_response()
        }
    }
}

/// `POST /logout`: drop the session and any pending login.
pub async fn logout(Extension(state): Extension<Arc<AppState>>, mut jar: CookieJar) -> Response {
    let location = FlowContext::new(&state.credentials, &mut jar).logout();
    (jar, Redirect::to(location)).into_response()
}
