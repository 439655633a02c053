use anyhow::{Context, Result};
use reqwest::Request;
use reqwest::header::{HeaderName, HeaderValue};

/// A single header to add to a request before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Appends this header to the request. Existing values for the same key are kept.
    pub fn add_header(&self, mut req: Request) -> Result<Request> {
        let name = HeaderName::from_bytes(self.key.as_bytes())
            .with_context(|| format!("Invalid header name {:?}", self.key))?;
        let value = HeaderValue::from_str(&self.value)
            .with_context(|| format!("Invalid value for header {:?}", self.key))?;
        req.headers_mut().append(name, value);
        Ok(req)
    }
}

/// Applies each header in order.
pub fn apply_headers(req: Request, headers: &[Header]) -> Result<Request> {
    headers.iter().try_fold(req, |req, h| h.add_header(req))
}
