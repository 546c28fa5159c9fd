use super::{private_page, require_session};
use crate::api::{AppState, ROLE_PATH};
use crate::backend::{FieldErrors, PatientForm};
use crate::routes::Screen;
use crate::session::CookieJar;
use crate::views::{Notice, screens};
use axum::{
    Form,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// `POST /role`: validate the add-role form, then hand it to the backend.
pub async fn submit(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<PatientForm>,
) -> Response {
    let session = match require_session(&state, &jar, ROLE_PATH) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    let form = form.normalized();
    let errors = form.validate();
    if !errors.is_empty() {
        debug!("Add-role form rejected: {:?}", errors.keys().collect::<Vec<_>>());
        let content = screens::role(&form, None, &errors);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            private_page(&state, Screen::Role, &session, &content),
        )
            .into_response();
    }

    match state.backend.add_patient(&session.token, &form).await {
        Ok(message) => {
            info!("Role added");
            let notice =
                Notice::success(message.unwrap_or_else(|| "Patient added successfully".to_string()));
            let content = screens::role(&PatientForm::default(), Some(&notice), &FieldErrors::new());
            private_page(&state, Screen::Role, &session, &content).into_response()
        }
        Err(err) => {
            error!("Failed to add role: {err}");
            let notice = Notice::error(err.user_message("Failed to add role"));
            let content = screens::role(&form, Some(&notice), &FieldErrors::new());
            (
                err.status_code(),
                private_page(&state, Screen::Role, &session, &content),
            )
                .into_response()
        }
    }
}
