//! Target selection and bounded-wait delivery.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::HeaderValue;
use tokio::time::timeout;

use crate::config::UpstreamConfig;
use crate::forward::types::{DeliveryError, ForwardError, UpstreamResponse};
use crate::observability::metrics;

/// Forwards an opaque JSON-RPC payload to one upstream endpoint.
///
/// Policy: a configured provider is trusted exclusively; its failure is
/// surfaced, never masked by silently falling through to public endpoints.
/// Without a provider, the fallback list is walked in order and the first
/// target that returns any HTTP response wins.
pub struct Forwarder {
    client: reqwest::Client,
    provider_url: Option<String>,
    fallback_urls: Vec<String>,
    attempt_timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder from upstream configuration.
    ///
    /// Fails only if the outbound client cannot be constructed (TLS backend
    /// initialization).
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        // No client-level timeout; each attempt is raced against its own
        // timer in `deliver`.
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            provider_url: config.provider_url,
            fallback_urls: config.fallback_urls,
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
        })
    }

    /// The sequence of targets a call will attempt, in order.
    pub fn targets(&self) -> &[String] {
        match &self.provider_url {
            Some(url) => std::slice::from_ref(url),
            None => &self.fallback_urls,
        }
    }

    /// Forward `payload` to the active target sequence.
    ///
    /// Attempts are strictly sequential: each target's outcome is fully
    /// resolved before the next is touched, and iteration stops at the first
    /// target that returns an HTTP response, whatever its status. Only when
    /// every target fails does this return an error, carrying the last
    /// attempt's failure description.
    pub async fn forward(&self, payload: Bytes) -> Result<UpstreamResponse, ForwardError> {
        let mut last_err: Option<DeliveryError> = None;

        for url in self.targets() {
            match self.deliver(url, payload.clone()).await {
                Ok(response) => {
                    metrics::record_attempt(url, true);
                    tracing::debug!(
                        target = %url,
                        status = %response.status,
                        "Upstream responded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    metrics::record_attempt(url, false);
                    tracing::warn!(target = %url, error = %e, "Upstream attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(ForwardError::from_last(last_err))
    }

    /// Deliver `payload` to a single target, bounded by the attempt timeout.
    ///
    /// The outbound call is raced against a timer; if the timer fires first
    /// the call is abandoned and its eventual result discarded. Reading the
    /// response body counts against the same timer, so an upstream that
    /// sends headers and then stalls still resolves as a timeout.
    async fn deliver(
        &self,
        target: &str,
        payload: Bytes,
    ) -> Result<UpstreamResponse, DeliveryError> {
        let request = self
            .client
            .post(target)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);

        let attempt = async {
            let response = request.send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .cloned();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(UpstreamResponse {
                status,
                content_type: content_type.map(convert_header),
                body,
            })
        };

        match timeout(self.attempt_timeout, attempt).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DeliveryError::Transport(describe(e))),
            Err(_) => Err(DeliveryError::Timeout),
        }
    }
}

/// reqwest and axum share the `http` types, but going through bytes keeps
/// this robust if their versions ever diverge.
fn convert_header(value: reqwest::header::HeaderValue) -> HeaderValue {
    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("application/json"))
}

/// Reduce a reqwest error chain to its root-cause description, so the error
/// envelope says "connection refused" rather than the full URL wrapper.
fn describe(e: reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = &e;
    while let Some(inner) = source.source() {
        source = inner;
    }
    source.to_string()
}
