use super::{private_page, require_session};
use crate::api::{AppState, PROFILE_PATH};
use crate::backend::{BackendError, FieldErrors, ProfileEdits};
use crate::routes::Screen;
use crate::session::{AuthRecord, CookieJar};
use crate::views::{Notice, screens};
use axum::{
    Form,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info};

fn fetch_failed(err: &BackendError) -> String {
    let fallback = match err {
        BackendError::Rejected { .. } => "Failed to fetch profile data",
        _ => "An error occurred while fetching data",
    };
    err.user_message(fallback)
}

fn update_failed(err: &BackendError) -> String {
    let fallback = match err {
        BackendError::Rejected { .. } => "Failed to update profile",
        _ => "An error occurred while updating the profile.",
    };
    err.user_message(fallback)
}

/// `GET /profile`, optionally in edit mode.
pub(crate) async fn show(state: &AppState, session: &AuthRecord, editing: bool) -> Response {
    match state.backend.hospital_details(&session.token).await {
        Ok(profile) => {
            let content = screens::profile(&profile, editing, None, &FieldErrors::new());
            private_page(state, Screen::Profile, session, &content).into_response()
        }
        Err(err) => {
            error!("Failed to fetch hospital details: {err}");
            let content = screens::profile_unavailable(&fetch_failed(&err));
            (
                err.status_code(),
                private_page(state, Screen::Profile, session, &content),
            )
                .into_response()
        }
    }
}

/// `POST /profile`: merge the editable fields into the current record and save.
pub async fn update(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Form(edits): Form<ProfileEdits>,
) -> Response {
    let session = match require_session(&state, &jar, PROFILE_PATH) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let current = match state.backend.hospital_details(&session.token).await {
        Ok(current) => current,
        Err(err) => {
            error!("Failed to fetch hospital details before update: {err}");
            let content = screens::profile_unavailable(&fetch_failed(&err));
            return (
                err.status_code(),
                private_page(&state, Screen::Profile, &session, &content),
            )
                .into_response();
        }
    };

    let updated = match edits.apply(&current) {
        Ok(updated) => updated,
        Err(errors) => {
            let content = screens::profile(
                &edits.preview(&current),
                true,
                Some(&Notice::error("Please correct the highlighted fields")),
                &errors,
            );
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                private_page(&state, Screen::Profile, &session, &content),
            )
                .into_response();
        }
    };

    match state.backend.update_details(&session.token, &updated).await {
        Ok(message) => {
            info!("Hospital profile updated");
            let notice =
                Notice::success(message.unwrap_or_else(|| "Profile updated successfully!".to_string()));
            let content = screens::profile(&updated, false, Some(&notice), &FieldErrors::new());
            private_page(&state, Screen::Profile, &session, &content).into_response()
        }
        Err(err) => {
            error!("Failed to update hospital details: {err}");
            let notice = Notice::error(update_failed(&err));
            let content = screens::profile(&current, false, Some(&notice), &FieldErrors::new());
            (
                err.status_code(),
                private_page(&state, Screen::Profile, &session, &content),
            )
                .into_response()
        }
    }
}
