//! Composes request forming, header attachment, sending and classification.

use anyhow::Result;
use bytes::Bytes;
use log::error;

use super::client::{HttpClient, SendRequest};
use super::headers::{Header, apply_headers};
use super::request::FormRequest;
use super::status::StatusClassifier;

/// Runs a complete call through a sender and a status classifier.
pub struct Requester<S: SendRequest> {
    sender: S,
    classifier: StatusClassifier,
}

impl<S: SendRequest> Requester<S> {
    pub fn new(sender: S, classifier: StatusClassifier) -> Self {
        Self { sender, classifier }
    }

    /// Forms the request, adds `headers` in order, sends it and classifies the response.
    #[tracing::instrument(skip(self, req, headers), fields(url = %req.url()))]
    pub async fn execute(&self, req: &FormRequest, headers: &[Header]) -> Result<Bytes> {
        let request = req.form_request().inspect_err(|e| {
            error!("Incorrect parameters set in form request: {}", e);
        })?;
        let request = apply_headers(request, headers)?;

        let resp = self.sender.send(request).await?;
        self.classifier.process(resp).await
    }
}

impl Requester<HttpClient> {
    /// Default client (10 second timeout) and the default 60 second rate-limit pause.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            HttpClient::default_client()?,
            StatusClassifier::default(),
        ))
    }
}

/// Performs a single call with the default configuration.
pub async fn default_request(req: &FormRequest, headers: &[Header]) -> Result<Bytes> {
    Requester::with_defaults()?.execute(req, headers).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::MockSendRequest;
    use crate::http::status::StatusError;
    use std::time::Duration;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    fn requester(sender: MockSendRequest) -> Requester<MockSendRequest> {
        Requester::new(sender, StatusClassifier::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_execute_sends_formed_request_with_headers() {
        let mut sender = MockSendRequest::new();
        sender
            .expect_send()
            .withf(|req| {
                req.method() == reqwest::Method::PUT
                    && req.url().as_str() == "https://api.example.com/v1/items/7"
                    && req.headers()["content-type"] == "application/json"
                    && req.headers()["x-api-key"] == "k"
                    && req.body().and_then(|b| b.as_bytes()) == Some(&b"{}"[..])
            })
            .times(1)
            .returning(|_| Ok(response(200, "saved")));

        let req = FormRequest::new("https://api.example.com", "/v1/items/7", "PUT")
            .with_payload("{}");
        let headers = [
            Header::new("Content-Type", "application/json"),
            Header::new("X-Api-Key", "k"),
        ];
        let body = requester(sender).execute(&req, &headers).await.unwrap();

        assert_eq!(body, "saved");
    }

    #[tokio::test]
    async fn test_execute_invalid_method_never_sends() {
        let mut sender = MockSendRequest::new();
        sender.expect_send().times(0);

        let req = FormRequest::new("https://api.example.com", "/", "NOT VALID");
        let result = requester(sender).execute(&req, &[]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_invalid_header_never_sends() {
        let mut sender = MockSendRequest::new();
        sender.expect_send().times(0);

        let req = FormRequest::new("https://api.example.com", "/", "GET");
        let result = requester(sender)
            .execute(&req, &[Header::new("bad header", "v")])
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_propagates_transport_error() {
        let mut sender = MockSendRequest::new();
        sender
            .expect_send()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let req = FormRequest::new("https://api.example.com", "/", "GET");
        let err = requester(sender).execute(&req, &[]).await.unwrap_err();

        assert!(err.to_string().contains("connection refused"));
        assert!(err.downcast_ref::<StatusError>().is_none());
    }

    #[tokio::test]
    async fn test_execute_classifies_response() {
        let mut sender = MockSendRequest::new();
        sender
            .expect_send()
            .times(1)
            .returning(|_| Ok(response(422, "invalid")));

        let req = FormRequest::new("https://api.example.com", "/", "POST");
        let err = requester(sender).execute(&req, &[]).await.unwrap_err();

        let status_err = err.downcast_ref::<StatusError>().unwrap();
        assert_eq!(status_err.status().as_u16(), 422);
        assert_eq!(status_err.body().unwrap(), "invalid");
    }

    #[tokio::test]
    async fn test_execute_rate_limit_does_not_retry() {
        let mut sender = MockSendRequest::new();
        sender
            .expect_send()
            .times(1)
            .returning(|_| Ok(response(429, "")));

        let req = FormRequest::new("https://api.example.com", "/", "GET");
        let err = requester(sender).execute(&req, &[]).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<StatusError>(),
            Some(&StatusError::RateLimitExceeded)
        );
    }
}
