//! Low-level HTTP client — `PlatformHttp`.
//!
//! One method per backend endpoint. Returns wire types (conversion to domain
//! types happens at the service boundary). Internal to the SDK — the services
//! wrap this behind [`PlatformBackend`](super::PlatformBackend).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::deposit::DepositNotification;
use crate::directory::AddressPayload;
use crate::error::BackendError;
use crate::http::retry::{RetryConfig, RetryPolicy};
use crate::http::PlatformBackend;

/// Low-level HTTP client for the exchange REST API.
///
/// Every request carries the deployment api key as a query parameter, the
/// scheme the platform uses for its public endpoints.
#[derive(Clone)]
pub struct PlatformHttp {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PlatformHttp {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let builder = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: builder.build().expect("Failed to build HTTP client"),
        }
    }

    // ── Deposit addresses ────────────────────────────────────────────────

    pub async fn deposit_address(&self, user_id: &str) -> Result<AddressPayload, BackendError> {
        let url = self.deposit_address_url(user_id);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    fn deposit_address_url(&self, user_id: &str) -> String {
        self.endpoint_url(&format!(
            "/metamask-address/{}",
            urlencoding::encode(user_id)
        ))
    }

    // ── Deposit notifications ────────────────────────────────────────────

    /// Single attempt, no retries: a replay would announce the same deposit
    /// twice.
    pub async fn notify_deposit(
        &self,
        notification: &DepositNotification,
    ) -> Result<(), BackendError> {
        let url = self.endpoint_url("/metamask-deposit-notification");
        self.execute(&reqwest::Method::POST, &url, Some(notification))
            .await
            .map(|_| ())
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}{}?apikey={}",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<T, BackendError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, BackendError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        BackendError::ServerError { status, .. } => {
                            config.retryable_statuses.contains(status)
                        }
                        BackendError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                            }
                            true
                        }
                        BackendError::Timeout => true,
                        BackendError::Reqwest(re) => {
                            re.is_connect() || re.is_timeout() || re.is_request()
                        }
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(BackendError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, BackendError> {
        let resp = self.execute(method, url, body).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Send the request and map non-success statuses to errors, leaving the
    /// body of successful responses untouched.
    async fn execute<B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, BackendError> {
        let mut req = self.client.request(method.clone(), url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let status_code = status.as_u16();
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 => Err(BackendError::Unauthorized),
            404 => Err(BackendError::NotFound(body_text)),
            429 => Err(BackendError::RateLimited {
                retry_after_ms: None,
            }),
            400..=499 => Err(BackendError::BadRequest(body_text)),
            _ => Err(BackendError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

#[async_trait]
impl PlatformBackend for PlatformHttp {
    async fn fetch_deposit_address(&self, user_id: &str) -> Result<AddressPayload, BackendError> {
        self.deposit_address(user_id).await
    }

    async fn push_deposit_notification(
        &self,
        notification: &DepositNotification,
    ) -> Result<(), BackendError> {
        self.notify_deposit(notification).await
    }
}
