//! HTTP implementation of the clinic API
//!
//! Reads are retried with exponential backoff. Writes (create, update,
//! status change, ledger) are sent once: they are not idempotent and a
//! duplicated create would double-book a patient.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::models::{
    Ack, AppointmentEnvelope, AppointmentListResponse, AppointmentUpdateRequest, LedgerEntry,
    NewAppointmentRequest, PatientSearchResponse, StatusUpdateRequest,
};
use super::traits::AppointmentApi;
use crate::config::{ApiConfig, RetryConfig, SecretString};
use crate::domain::{
    date_key, ApiError, AppointmentId, AppointmentStatus, ExistingAppointment, PatientSummary,
    Result, SlotwiseError,
};

/// Clinic REST API client
///
/// # Example
///
/// ```no_run
/// use slotwise::adapters::clinic::{AppointmentApi, HttpClinicApi};
/// use slotwise::config::ApiConfig;
/// use chrono::NaiveDate;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = HttpClinicApi::new(&ApiConfig::default())?;
/// let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let booked = api.appointments_on(date).await?;
/// println!("{} appointments", booked.len());
/// # Ok(())
/// # }
/// ```
pub struct HttpClinicApi {
    base_url: Url,
    client: Client,
    auth_token: Option<SecretString>,
    retry: RetryConfig,
}

impl HttpClinicApi {
    /// Build a client from the `[api]` section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL cannot be parsed or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SlotwiseError::Configuration(format!(
                "Invalid api.base_url '{}': {}",
                config.base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SlotwiseError::Configuration(format!(
                "api.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| {
                SlotwiseError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        if config.auth_token.is_none() {
            tracing::warn!("No api.auth_token configured, requests will be unauthenticated");
        }

        Ok(Self {
            base_url,
            client,
            auth_token: config.auth_token.clone(),
            retry: config.retry.clone(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ConnectionFailed("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.auth_token {
            Some(token) => {
                let token: &str = token.expose_secret().as_ref();
                builder.bearer_auth(token)
            }
            None => builder,
        }
    }

    /// Retry a request with exponential backoff
    ///
    /// Only errors for which [`ApiError::is_retryable`] holds are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> std::result::Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ApiError>>,
    {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !e.is_retryable() {
                        return Err(e);
                    }

                    let delay_ms = self.retry.delay_for(attempt);
                    crate::log_retry_attempt!(attempt, max_retries, &e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> std::result::Result<T, ApiError> {
        self.retry_request(|| {
            let request = self.request(Method::GET, url.clone());
            async move {
                let response = request.send().await.map_err(send_error)?;
                read_json(response, what).await
            }
        })
        .await
    }
}

#[async_trait]
impl AppointmentApi for HttpClinicApi {
    async fn appointments_on(
        &self,
        date: NaiveDate,
    ) -> std::result::Result<Vec<ExistingAppointment>, ApiError> {
        let key = date_key(date);
        let url = self.endpoint(&["api", "appointments", "date", &key])?;
        tracing::debug!(date = %key, "Fetching existing appointments");

        let body: AppointmentListResponse = self.get_json(url, "appointments by date").await?;
        if !body.success {
            return Err(rejected(body.message, "appointment listing"));
        }

        let mut appointments = Vec::with_capacity(body.appointments.len());
        for dto in body.appointments {
            let raw_id = dto.id.clone();
            match ExistingAppointment::try_from(dto) {
                Ok(apt) => appointments.push(apt),
                Err(e) => {
                    tracing::warn!(appointment_id = %raw_id, error = %e, "Skipping malformed appointment");
                }
            }
        }

        tracing::debug!(date = %key, count = appointments.len(), "Existing appointments loaded");
        Ok(appointments)
    }

    async fn appointment(
        &self,
        id: &AppointmentId,
    ) -> std::result::Result<ExistingAppointment, ApiError> {
        let url = self.endpoint(&["api", "appointments", id.as_str()])?;
        let body: AppointmentEnvelope = self.get_json(url, "appointment").await?;
        if !body.success {
            return Err(rejected(body.message, "appointment lookup"));
        }
        body.appointment
            .ok_or_else(|| ApiError::NotFound(format!("appointment {id}")))
            .and_then(ExistingAppointment::try_from)
    }

    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> std::result::Result<AppointmentId, ApiError> {
        let url = self.endpoint(&["api", "appointments"])?;
        let response = self
            .request(Method::POST, url)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;
        let body: AppointmentEnvelope = read_json(response, "create appointment").await?;
        if !body.success {
            return Err(rejected(body.message, "appointment creation"));
        }

        let created = body.appointment.ok_or_else(|| {
            ApiError::InvalidResponse("create response did not include the appointment".to_string())
        })?;
        AppointmentId::new(created.id).map_err(ApiError::InvalidResponse)
    }

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        request: &AppointmentUpdateRequest,
    ) -> std::result::Result<(), ApiError> {
        let url = self.endpoint(&["api", "appointments", id.as_str()])?;
        let response = self
            .request(Method::PUT, url)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;
        let body: Ack = read_json(response, "update appointment").await?;
        if !body.success {
            return Err(rejected(body.message, "appointment update"));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> std::result::Result<(), ApiError> {
        let url = self.endpoint(&["api", "appointments", id.as_str(), "status"])?;
        let response = self
            .request(Method::PATCH, url)
            .json(&StatusUpdateRequest { status })
            .send()
            .await
            .map_err(send_error)?;
        let body: Ack = read_json(response, "status update").await?;
        if !body.success {
            return Err(rejected(body.message, "status update"));
        }
        Ok(())
    }

    async fn search_patients(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<PatientSummary>, ApiError> {
        let mut url = self.endpoint(&["api", "patients"])?;
        url.query_pairs_mut().append_pair("search", query);

        let body: PatientSearchResponse = self.get_json(url, "patient search").await?;
        if !body.success {
            return Err(rejected(body.message, "patient search"));
        }
        body.patients
            .into_iter()
            .map(PatientSummary::try_from)
            .collect()
    }

    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> std::result::Result<(), ApiError> {
        let url = self.endpoint(&["api", "ledger"])?;
        let response = self
            .request(Method::POST, url)
            .json(entry)
            .send()
            .await
            .map_err(send_error)?;
        let body: Ack = read_json(response, "ledger entry").await?;
        if !body.success {
            return Err(rejected(body.message, "ledger entry"));
        }
        Ok(())
    }
}

fn send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e.to_string())
    } else {
        ApiError::ConnectionFailed(e.to_string())
    }
}

fn rejected(message: Option<String>, what: &str) -> ApiError {
    ApiError::Rejected(message.unwrap_or_else(|| format!("{what} was not accepted")))
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> std::result::Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{what}: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, what, &body))
}

fn status_error(status: StatusCode, what: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());

    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(format!("{what}: {message}"))
    } else if status.is_server_error() {
        ApiError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::ClientError {
            status: status.as_u16(),
            message,
        }
    }
}
