//! Status-code classification of HTTP responses into a (body, error) outcome.

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use log::{debug, error, warn};
use reqwest::{Response, StatusCode};

/// How long to pause after a 429 before reporting the rate limit.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// Failures derived from the response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// HTTP 429
    RateLimitExceeded,
    /// Any other 4xx; the response body is kept for the caller.
    ClientError { status: StatusCode, body: Bytes },
    /// 5xx; the body is discarded.
    ServerError { status: StatusCode },
}

impl StatusError {
    pub fn status(&self) -> StatusCode {
        match self {
            StatusError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            StatusError::ClientError { status, .. } | StatusError::ServerError { status } => {
                *status
            }
        }
    }

    /// Body returned alongside a 4xx error.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            StatusError::ClientError { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusError::RateLimitExceeded => write!(f, "rate limit exceeded"),
            StatusError::ClientError { status, .. } => {
                write!(f, "{} received; check request", status.as_u16())
            }
            StatusError::ServerError { status } => {
                write!(
                    f,
                    "{} received; check network/service availability",
                    status.as_u16()
                )
            }
        }
    }
}

impl std::error::Error for StatusError {}

/// Reads the whole response body.
pub async fn read_body(resp: Response) -> Result<Bytes> {
    let url = resp.url().clone();
    resp.bytes()
        .await
        .map_err(|e| {
            error!("Error reading HTTP body from {}: {}", url, e);
            e
        })
        .with_context(|| format!("Failed to read response body from {}", url))
}

/// Maps a response to its body or a [`StatusError`] by status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusClassifier {
    pub rate_limit_delay: Duration,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self {
            rate_limit_delay: RATE_LIMIT_DELAY,
        }
    }
}

impl StatusClassifier {
    pub fn new(rate_limit_delay: Duration) -> Self {
        Self { rate_limit_delay }
    }

    /// Reads the body and classifies the response:
    /// 2xx returns the body, 429 pauses then fails, other 4xx fails with the body,
    /// 5xx fails without it, and any other class returns the body.
    ///
    /// A body read failure only surfaces for outcomes that carry the body.
    #[tracing::instrument(skip(self, resp), fields(status = %resp.status()))]
    pub async fn process(&self, resp: Response) -> Result<Bytes> {
        let status = resp.status();
        let body = read_body(resp).await;
        self.classify(status, body).await
    }

    async fn classify(&self, status: StatusCode, body: Result<Bytes>) -> Result<Bytes> {
        match status.as_u16() / 100 {
            2 => body,
            4 if status == StatusCode::TOO_MANY_REQUESTS => {
                if let Err(e) = &body {
                    debug!("Ignoring unreadable 429 body: {:#}", e);
                }
                warn!(
                    "Rate limit exceeded, pausing {:?} before failing",
                    self.rate_limit_delay
                );
                tokio::time::sleep(self.rate_limit_delay).await;
                Err(StatusError::RateLimitExceeded.into())
            }
            4 => Err(StatusError::ClientError { status, body: body? }.into()),
            5 => {
                if let Err(e) = &body {
                    debug!("Ignoring unreadable {} body: {:#}", status.as_u16(), e);
                }
                Err(StatusError::ServerError { status }.into())
            }
            _ => {
                debug!("Unclassified status {}, returning body", status);
                body
            }
        }
    }
}

/// Classifies a response with the default 60 second rate-limit pause.
pub async fn process_status_code(resp: Response) -> Result<Bytes> {
    StatusClassifier::default().process(resp).await
}
