//! Building a `reqwest::Request` from a base URL, endpoint, method and payload.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Method, Request, Url};

/// The pieces of an outbound HTTP call before it becomes a real request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRequest {
    pub base_url: String,
    pub endpoint: String,
    pub payload: Vec<u8>,
    pub method: String,
}

impl FormRequest {
    pub fn new(
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: endpoint.into(),
            payload: Vec::new(),
            method: method.into(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Full URL of the call. The endpoint is appended verbatim, no slash handling.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }

    /// Creates the request. An empty method means GET.
    /// Fails on an invalid method token or an unparsable URL.
    #[tracing::instrument(skip(self), fields(method = %self.method))]
    pub fn form_request(&self) -> Result<Request> {
        let url = self.url();
        debug!("URL: {}", url);

        let method = if self.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(self.method.as_bytes())
                .with_context(|| format!("Invalid HTTP method {:?}", self.method))?
        };
        let url = Url::parse(&url).with_context(|| format!("Invalid request URL {:?}", url))?;

        let mut req = Request::new(method, url);
        *req.body_mut() = Some(self.payload.clone().into());
        Ok(req)
    }
}
