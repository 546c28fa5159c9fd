use crate::{
    api::{self, AppState},
    backend::HospitalClient,
    cli::telemetry,
    routes::hospital_routes,
    session::{CookieConfig, Credentials},
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend_url: Url,
    pub backend_timeout: Duration,
    pub cookies: CookieConfig,
}

/// Build the shared state from the parsed arguments.
///
/// # Errors
/// Returns an error if the route table is inconsistent or the backend client cannot be built.
pub fn state(args: &Args) -> Result<AppState> {
    let routes = hospital_routes().context("Invalid route table")?;
    let backend = HospitalClient::new(args.backend_url.clone(), args.backend_timeout)?;
    let credentials = Credentials::new(args.cookies.clone());
    Ok(AppState::new(routes, credentials, backend))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the state cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let state = state(&args)?;

    info!(
        "Backend {} (timeout {}s), secure cookies: {}",
        state.backend.base_url(),
        args.backend_timeout.as_secs(),
        args.cookies.secure()
    );

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}
