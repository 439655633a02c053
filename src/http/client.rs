//! Configurable HTTP client that sends already-formed requests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Proxy, Request, Response, redirect};

/// Timeout applied by the default client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect handling for a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// reqwest's default: follow up to 10 redirects.
    #[default]
    Default,
    /// Never follow redirects; 3xx responses are returned as-is.
    None,
    /// Follow at most this many redirects.
    Limited(usize),
}

impl RedirectPolicy {
    fn to_policy(self) -> redirect::Policy {
        match self {
            RedirectPolicy::Default => redirect::Policy::default(),
            RedirectPolicy::None => redirect::Policy::none(),
            RedirectPolicy::Limited(max) => redirect::Policy::limited(max),
        }
    }
}

/// Settings used to build an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Proxy URL all traffic is routed through.
    pub proxy: Option<String>,
    pub redirect: RedirectPolicy,
    /// Keep cookies between calls made by the same client.
    pub cookie_store: bool,
    /// Total request timeout. `None` waits forever.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            redirect: RedirectPolicy::Default,
            cookie_store: false,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn with_cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the underlying reqwest client.
    pub fn build(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .redirect(self.redirect.to_policy())
            .cookie_store(self.cookie_store);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            let proxy =
                Proxy::all(proxy).with_context(|| format!("Invalid proxy URL {:?}", proxy))?;
            builder = builder.proxy(proxy);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder.build().context("Failed to build HTTP client")
    }
}

/// Sends a formed request and hands back the raw response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SendRequest: Send + Sync {
    async fn send(&self, req: Request) -> Result<Response>;
}

/// HTTP client executing requests built by [`FormRequest`](super::FormRequest).
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config.build()?))
    }

    /// Client with a 10 second timeout and defaults for everything else.
    pub fn default_client() -> Result<Self> {
        Self::from_config(&ClientConfig::default())
    }

    /// Performs the request. Only transport failures are errors; any status is returned.
    #[tracing::instrument(skip(self, req), fields(method = %req.method(), url = %req.url()))]
    pub async fn do_request(&self, req: Request) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();

        match self.client.execute(req).await {
            Ok(resp) => {
                debug!("{} {} -> {}", method, url, resp.status());
                Ok(resp)
            }
            Err(e) => {
                error!("Error performing HTTP request {} {}: {}", method, url, e);
                Err(e).with_context(|| format!("Failed to send {} request to {}", method, url))
            }
        }
    }
}

#[async_trait]
impl SendRequest for HttpClient {
    async fn send(&self, req: Request) -> Result<Response> {
        self.do_request(req).await
    }
}
