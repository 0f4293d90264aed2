//! Request executor
//!
//! Builds and issues exactly one HTTP call for an iteration of a job and
//! turns whatever happens into a `RequestResult`:
//! - a response (any status) becomes a `completed` result
//! - timeouts, cancellation and network errors become `failed` results
//!
//! Nothing escapes as an error; the scheduler never has to handle a
//! request-level failure.

use async_trait::async_trait;
use barrage_core::domain::profile::LoadProfile;
use barrage_core::domain::result::RequestResult;
use reqwest::Client;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::OnceLock;
use tokio::time::{Duration, Instant};
use tracing::trace;

use crate::cancel::CancelToken;
use crate::config::RunnerConfig;
use crate::service::fingerprint::{build_headers, effective_url, synthetic_body};

/// Issues a single request of a load test
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Executes iteration `iteration` of `profile`
    ///
    /// Implementations must never panic on network conditions and must
    /// settle promptly once `cancel` fires.
    async fn execute(
        &self,
        iteration: u32,
        profile: &LoadProfile,
        cancel: &CancelToken,
    ) -> RequestResult;
}

/// `RequestExecutor` backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpRequestExecutor {
    client: Client,
}

impl HttpRequestExecutor {
    /// Creates an executor with a client tuned by the runner configuration
    pub fn new(config: &RunnerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self { client })
    }

    fn build_request(
        &self,
        iteration: u32,
        profile: &LoadProfile,
    ) -> Result<reqwest::Request, String> {
        let mut rng = rand::thread_rng();
        let url = effective_url(profile, &mut rng);
        let headers = build_headers(profile, &mut rng)?;

        trace!("Iteration {} -> {} {}", iteration, profile.method, url);

        let mut builder = self
            .client
            .request(profile.method.into(), url)
            .headers(headers);

        let payload = profile.payload_bytes();
        if payload > 0 {
            builder = builder.body(synthetic_body(payload));
        }

        builder
            .build()
            .map_err(|e| describe_error("Invalid request", &e))
    }
}

#[async_trait]
impl RequestExecutor for HttpRequestExecutor {
    async fn execute(
        &self,
        iteration: u32,
        profile: &LoadProfile,
        cancel: &CancelToken,
    ) -> RequestResult {
        let started = Instant::now();
        let start_time = monotonic_ms(started.into_std());
        let deadline = started + Duration::from_millis(profile.timeout_ms);

        let request = match self.build_request(iteration, profile) {
            Ok(request) => request,
            Err(message) => {
                return RequestResult::failed(iteration, start_time, elapsed_ms(started), message);
            }
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                RequestResult::failed(iteration, start_time, elapsed_ms(started), "request cancelled")
            }
            _ = tokio::time::sleep_until(deadline) => {
                RequestResult::failed(
                    iteration,
                    start_time,
                    elapsed_ms(started),
                    format!("Request timed out after {}ms", profile.timeout_ms),
                )
            }
            response = self.client.execute(request) => match response {
                Ok(mut response) => {
                    let duration = elapsed_ms(started);
                    let status = response.status().as_u16();
                    let headers = lowercase_headers(response.headers());

                    // Drain so the connection goes back to the pool clean.
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::timeout_at(deadline, async {
                            while let Ok(Some(_)) = response.chunk().await {}
                        }) => {}
                    }

                    RequestResult::completed(iteration, start_time, duration, status, headers)
                }
                Err(e) => RequestResult::failed(
                    iteration,
                    start_time,
                    elapsed_ms(started),
                    describe_error(classify(&e), &e),
                ),
            },
        }
    }
}

/// Milliseconds since a process-wide monotonic origin
pub fn monotonic_ms(at: std::time::Instant) -> f64 {
    static ORIGIN: OnceLock<std::time::Instant> = OnceLock::new();
    let origin = *ORIGIN.get_or_init(std::time::Instant::now);
    at.saturating_duration_since(origin).as_secs_f64() * 1000.0
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Header map keyed by lower-cased name; repeated headers are comma-joined
fn lowercase_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        // `HeaderName` is always stored lower-cased.
        out.entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

fn classify(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Request timed out"
    } else if e.is_connect() {
        "Connection failed"
    } else if e.is_redirect() {
        "Redirect error"
    } else if e.is_builder() {
        "Invalid request"
    } else {
        "Request failed"
    }
}

/// Human-readable message including the full source chain
fn describe_error(kind: &str, e: &reqwest::Error) -> String {
    let mut message = format!("{}: {}", kind, e);
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
