//! REST client for the hospital backend.
//!
//! Every endpoint answers with an [`Envelope`]; anything other than
//! `status == 200` becomes [`BackendError::Rejected`] carrying the backend
//! message. Authenticated calls send the session token as a bearer token.

mod error;
mod types;

pub use self::error::BackendError;
pub use self::types::{
    Envelope, FieldErrors, FieldKind, GENDERS, HospitalDetails, LoginChallenge, LoginForm,
    OtpForm, PatientForm, ProfileData, ProfileEdits, ProfileField, Registration, VerifiedLogin,
};

use crate::APP_USER_AGENT;
use crate::session::PendingLogin;
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

const LOGIN_ENDPOINT: &str = "hospital/login";
const VERIFY_OTP_ENDPOINT: &str = "hospital/login/verifyOtp";
const REGISTER_ENDPOINT: &str = "hospital/register";
const DETAILS_ENDPOINT: &str = "hospital/getDetails";
const UPDATE_DETAILS_ENDPOINT: &str = "hospital/updateDetails";
const ADD_PATIENT_ENDPOINT: &str = "hospital/patients/add";

#[derive(Debug, Clone)]
pub struct HospitalClient {
    base_url: Url,
    client: Client,
}

impl HospitalClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit credentials; the backend answers with a pending session and sends an OTP.
    ///
    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected login.
    #[instrument(skip_all)]
    pub async fn login(&self, form: &LoginForm) -> Result<LoginChallenge, BackendError> {
        let request = self.request(Method::POST, LOGIN_ENDPOINT, None)?;
        let challenge: LoginChallenge = data(send(request.json(&form.body())).await?)?;
        if challenge.pending_id.trim().is_empty() {
            return Err(BackendError::MissingData);
        }
        Ok(challenge)
    }

    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected code.
    #[instrument(skip_all)]
    pub async fn verify_otp(
        &self,
        pending: &PendingLogin,
        otp: &OtpForm,
    ) -> Result<VerifiedLogin, BackendError> {
        let body = serde_json::json!({
            "pendingId": pending.pending_id,
            "otp": otp.code(),
        });
        let request = self.request(Method::POST, VERIFY_OTP_ENDPOINT, None)?;
        let verified: VerifiedLogin = data(send(request.json(&body)).await?)?;
        if verified.token.is_empty() {
            return Err(BackendError::MissingData);
        }
        Ok(verified)
    }

    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected registration.
    #[instrument(skip_all)]
    pub async fn register(&self, form: &Registration) -> Result<Option<String>, BackendError> {
        let request = self.request(Method::POST, REGISTER_ENDPOINT, None)?;
        Ok(message(
            send::<serde_json::Value>(request.json(&form.body())).await?,
        ))
    }

    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected token.
    #[instrument(skip_all)]
    pub async fn hospital_details(&self, token: &str) -> Result<ProfileData, BackendError> {
        let request = self.request(Method::GET, DETAILS_ENDPOINT, Some(token))?;
        let details: HospitalDetails = data(send(request).await?)?;
        Ok(ProfileData::from(details))
    }

    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected update.
    #[instrument(skip_all)]
    pub async fn update_details(
        &self,
        token: &str,
        profile: &ProfileData,
    ) -> Result<Option<String>, BackendError> {
        let request = self.request(Method::PATCH, UPDATE_DETAILS_ENDPOINT, Some(token))?;
        Ok(message(
            send::<serde_json::Value>(request.json(profile)).await?,
        ))
    }

    /// # Errors
    /// Returns [`BackendError`] on transport failure or a rejected form.
    #[instrument(skip_all)]
    pub async fn add_patient(
        &self,
        token: &str,
        form: &PatientForm,
    ) -> Result<Option<String>, BackendError> {
        let request = self.request(Method::POST, ADD_PATIENT_ENDPOINT, Some(token))?;
        Ok(message(
            send::<serde_json::Value>(request.json(form)).await?,
        ))
    }

    fn request(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.base_url.join(endpoint)?;
        debug!("{method} {url}");
        let request = self.client.request(method, url);
        Ok(match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Envelope<T>, BackendError> {
    let response = request.send().await.map_err(|err| {
        error!("Backend request failed: {err}");
        BackendError::Request(err)
    })?;
    let status = response.status();
    let body = response.bytes().await?;

    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&body).map_err(|err| {
        error!("Backend returned a non-envelope body (HTTP {status}): {err}");
        BackendError::Http {
            status: status.as_u16(),
        }
    })?;

    if !envelope.is_success() {
        debug!(
            "Backend rejected request: status={}, message={:?}",
            envelope.status, envelope.message
        );
        return Err(BackendError::Rejected {
            status: envelope.status,
            message: envelope.message.unwrap_or_default(),
        });
    }

    let data = match envelope.data {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value).map_err(|err| {
            error!("Backend data did not match the expected shape: {err}");
            BackendError::MissingData
        })?),
    };

    Ok(Envelope {
        status: envelope.status,
        message: envelope.message,
        data,
    })
}

fn data<T>(envelope: Envelope<T>) -> Result<T, BackendError> {
    envelope.data.ok_or(BackendError::MissingData)
}

fn message<T>(envelope: Envelope<T>) -> Option<String> {
    envelope.message.filter(|message| !message.trim().is_empty())
}
