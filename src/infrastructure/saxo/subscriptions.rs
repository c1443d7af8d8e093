//! Subscription REST Client
//!
//! Thin client for the trade message endpoints: create a streaming
//! subscription for a caller-chosen reference id, delete it, and mark
//! the most recently seen trade message as read.
//!
//! No retry and no token refresh; a non-2xx response surfaces as a
//! typed error carrying the status and body.

use std::time::Duration;

use reqwest::StatusCode;

use super::messages::{SubscriptionRequest, SubscriptionResponse};

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the subscription endpoints.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionApiError {
    /// Transport-level failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered outside the 2xx range.
    #[error("unexpected status {status} from {endpoint}: {body}")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Endpoint that was called.
        endpoint: String,
        /// Response body, if readable.
        body: String,
    },
}

/// REST client for trade message subscriptions.
#[derive(Clone)]
pub struct SubscriptionClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    context_id: String,
}

impl SubscriptionClient {
    /// Create a client against `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        context_id: impl Into<String>,
    ) -> Result<Self, SubscriptionApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            access_token: access_token.into(),
            context_id: context_id.into(),
        })
    }

    /// Create the trade message subscription for this context.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn subscribe(
        &self,
        reference_id: &str,
    ) -> Result<SubscriptionResponse, SubscriptionApiError> {
        let endpoint = format!("{}/trade/v1/messages/subscriptions", self.base_url);
        let request =
            SubscriptionRequest::json(self.context_id.clone(), reference_id.to_string());

        tracing::debug!(reference_id, context_id = %self.context_id, "Creating trade message subscription");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(endpoint, response).await?;
        Ok(response.json().await?)
    }

    /// Delete the subscription for `reference_id` in this context.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn unsubscribe(&self, reference_id: &str) -> Result<(), SubscriptionApiError> {
        let endpoint = format!(
            "{}/trade/v1/messages/subscriptions/{}/{}",
            self.base_url, self.context_id, reference_id
        );

        tracing::debug!(reference_id, context_id = %self.context_id, "Deleting trade message subscription");

        let response = self
            .http
            .delete(&endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check_status(endpoint, response).await?;
        Ok(())
    }

    /// Mark `message_id` as read.
    ///
    /// The id is the payload-level trade message id tracked by
    /// [`LastSeenMessageId`](crate::domain::LastSeenMessageId), not a
    /// frame envelope id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn mark_seen(&self, message_id: u64) -> Result<(), SubscriptionApiError> {
        let endpoint = format!("{}/trade/v1/messages/seen/{message_id}", self.base_url);

        tracing::debug!(message_id, "Marking trade message as read");

        let response = self
            .http
            .put(&endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::check_status(endpoint, response).await?;
        Ok(())
    }

    /// The context id requests are scoped to.
    #[must_use]
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    async fn check_status(
        endpoint: String,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SubscriptionApiError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SubscriptionApiError::Status {
            status,
            endpoint,
            body,
        })
    }
}

impl std::fmt::Debug for SubscriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("context_id", &self.context_id)
            .finish_non_exhaustive()
    }
}
