use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::credentials::CredentialProvider;
use super::rate_limiter::RateLimiter;
use crate::constants::{DEFAULT_ACCOUNT, REQUEST_TIMEOUT};
use crate::errors::{FailureClass, MarketDataError};
use crate::models::Marketplace;

/// Hook for provider-specific failure signals hidden in a response body
/// (e.g. a gRPC-gateway `code` field).
pub type BodyClassifier = fn(StatusCode, &str) -> Option<FailureClass>;

/// Rate-limited JSON fetcher for one marketplace account.
///
/// Every call waits for the account's rate-limit slot, attaches the bearer
/// token, and turns the outcome into either a decoded payload or a classified
/// [`MarketDataError`].
pub struct HttpFetcher {
    client: Client,
    marketplace: Marketplace,
    base_url: String,
    account: String,
    limiter: Arc<RateLimiter>,
    credentials: Arc<dyn CredentialProvider>,
    headers: Vec<(&'static str, String)>,
    body_classifier: Option<BodyClassifier>,
}

impl HttpFetcher {
    pub fn new(
        marketplace: Marketplace,
        base_url: impl Into<String>,
        limiter: Arc<RateLimiter>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            marketplace,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account: DEFAULT_ACCOUNT.to_string(),
            limiter,
            credentials,
            headers: Vec::new(),
            body_classifier: None,
        }
    }

    /// Use a named account; each account is spaced independently.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Attach a static header to every request (API keys).
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body_classifier(mut self, classifier: BodyClassifier) -> Self {
        self.body_classifier = Some(classifier);
        self
    }

    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    /// Key under which this fetcher's requests are spaced.
    pub fn rate_limit_key(&self) -> String {
        format!("{}:{}", self.marketplace, self.account)
    }

    /// Spacing currently applied to this fetcher's account.
    pub fn request_interval(&self) -> Duration {
        self.limiter.interval_for(&self.rate_limit_key())
    }

    /// Change the spacing for this fetcher's account on the shared limiter.
    pub fn set_request_interval(&self, interval: Duration) {
        self.limiter.configure(&self.rate_limit_key(), interval);
    }

    /// Ask the credential source for a token without sending a request.
    pub async fn check_credentials(&self) -> Result<(), MarketDataError> {
        self.credentials.bearer_token(self.marketplace).await.map(|_| ())
    }

    /// GET `{base_url}{path}` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let token = self.credentials.bearer_token(self.marketplace).await?;
        let url = format!("{}{}", self.base_url, path);

        self.limiter.acquire(&self.rate_limit_key()).await;
        debug!("{} GET {}", self.marketplace, path);

        let mut request = self.client.get(&url).bearer_auth(token).query(query);
        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let error = classify_failure(self.marketplace, status, &body, path, self.body_classifier);
            warn!("{} GET {} failed: {}", self.marketplace, path, error);
            return Err(error);
        }

        // Some gateways report throttling with a 200 and an error body.
        if let Some(class) = self.body_classifier.and_then(|f| f(status, &body)) {
            return Err(error_for_class(self.marketplace, class, path, status));
        }

        decode_body(self.marketplace, &body)
    }

    fn map_send_error(&self, error: reqwest::Error) -> MarketDataError {
        if error.is_timeout() {
            MarketDataError::Timeout {
                provider: self.marketplace.to_string(),
            }
        } else {
            MarketDataError::Network(error)
        }
    }
}

/// Decode a JSON payload, failing fast on any shape mismatch.
pub fn decode_body<T: DeserializeOwned>(
    marketplace: Marketplace,
    body: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::InvalidResponse {
        provider: marketplace.to_string(),
        message: e.to_string(),
    })
}

/// Map a non-success response onto a classified error.
pub fn classify_failure(
    marketplace: Marketplace,
    status: StatusCode,
    body: &str,
    path: &str,
    body_classifier: Option<BodyClassifier>,
) -> MarketDataError {
    if let Some(class) = body_classifier.and_then(|f| f(status, body)) {
        return error_for_class(marketplace, class, path, status);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: marketplace.to_string(),
        },
        StatusCode::NOT_FOUND => MarketDataError::NotFound(format!("{} {}", marketplace, path)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MarketDataError::Unauthorized {
            provider: marketplace.to_string(),
            message: format!("HTTP {}", status),
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => MarketDataError::Timeout {
            provider: marketplace.to_string(),
        },
        _ => MarketDataError::ProviderError {
            provider: marketplace.to_string(),
            message: format!("HTTP error: {}", status),
        },
    }
}

fn error_for_class(
    marketplace: Marketplace,
    class: FailureClass,
    path: &str,
    status: StatusCode,
) -> MarketDataError {
    match class {
        FailureClass::RateLimited => MarketDataError::RateLimited {
            provider: marketplace.to_string(),
        },
        FailureClass::NotFound => MarketDataError::NotFound(format!("{} {}", marketplace, path)),
        FailureClass::Transient => MarketDataError::ProviderError {
            provider: marketplace.to_string(),
            message: format!("error body with HTTP {}", status),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn grpc_code(_: StatusCode, body: &str) -> Option<FailureClass> {
        if body.contains("\"code\":8") {
            Some(FailureClass::RateLimited)
        } else {
            None
        }
    }

    #[test]
    fn test_429_is_rate_limited() {
        let err = classify_failure(Marketplace::StockX, StatusCode::TOO_MANY_REQUESTS, "", "/x", None);
        assert_eq!(err.failure_class(), FailureClass::RateLimited);
    }

    #[test]
    fn test_404_is_not_found() {
        let err = classify_failure(Marketplace::StockX, StatusCode::NOT_FOUND, "", "/x", None);
        assert_eq!(err.failure_class(), FailureClass::NotFound);
    }

    #[test]
    fn test_expired_token_is_transient() {
        let err = classify_failure(Marketplace::Alias, StatusCode::UNAUTHORIZED, "", "/x", None);
        assert!(matches!(err, MarketDataError::Unauthorized { .. }));
        assert_eq!(err.failure_class(), FailureClass::Transient);
    }

    #[test]
    fn test_5xx_is_transient() {
        let err = classify_failure(Marketplace::Alias, StatusCode::BAD_GATEWAY, "", "/x", None);
        assert_eq!(err.failure_class(), FailureClass::Transient);
    }

    #[test]
    fn test_body_classifier_wins_over_status() {
        let err = classify_failure(
            Marketplace::Alias,
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":8,"message":"quota"}"#,
            "/x",
            Some(grpc_code),
        );
        assert_eq!(err.failure_class(), FailureClass::RateLimited);
    }

    #[test]
    fn test_decode_body_rejects_wrong_shape() {
        #[derive(Debug, Deserialize)]
        struct Expected {
            amount: String,
        }

        let ok: Expected = decode_body(Marketplace::StockX, r#"{"amount":"27"}"#).unwrap();
        assert_eq!(ok.amount, "27");

        let err = decode_body::<Expected>(Marketplace::StockX, r#"{"amount":null}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidResponse { .. }));
    }
}
