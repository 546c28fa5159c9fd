use crate::{
    backend::HospitalClient,
    routes::{LOGIN_PATH, OTP_PATH, REGISTER_PATH, RouteTable, Screen},
    session::Credentials,
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub(crate) mod handlers;

use handlers::{auth, health, pages, profile, role};

pub const LOGOUT_PATH: &str = "/logout";
pub const PROFILE_PATH: &str = "/profile";
pub const ROLE_PATH: &str = "/role";

/// Shared per-process state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub routes: RouteTable,
    pub credentials: Credentials,
    pub backend: HospitalClient,
    navigation: Vec<(&'static str, Screen)>,
}

impl AppState {
    #[must_use]
    pub fn new(routes: RouteTable, credentials: Credentials, backend: HospitalClient) -> Self {
        let navigation = routes.navigation();
        Self {
            routes,
            credentials,
            backend,
            navigation,
        }
    }

    #[must_use]
    pub fn navigation(&self) -> &[(&'static str, Screen)] {
        &self.navigation
    }
}

/// Build the router: form posts on their paths, every page through the route table.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health).options(health::health))
        .route(LOGIN_PATH, get(pages::page).post(auth::login))
        .route(OTP_PATH, get(pages::page).post(auth::verify_otp))
        .route(REGISTER_PATH, get(pages::page).post(auth::register))
        .route(LOGOUT_PATH, post(auth::logout))
        .route(PROFILE_PATH, get(pages::page).post(profile::update))
        .route(ROLE_PATH, get(pages::page).post(role::submit))
        .fallback(pages::page)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
