//! Thin HTTP call helpers: form a request, add headers, send it, classify the response.

mod client;
mod headers;
mod request;
mod requester;
mod status;

pub use client::{ClientConfig, DEFAULT_TIMEOUT, HttpClient, RedirectPolicy, SendRequest};
pub use headers::{Header, apply_headers};
pub use request::FormRequest;
pub use requester::{Requester, default_request};
pub use status::{
    RATE_LIMIT_DELAY, StatusClassifier, StatusError, process_status_code, read_body,
};
