//! HTTP Client
//!
//! Parses a URL, picks plain or TLS transport by scheme, and performs one
//! GET. Holds configuration only; no connection or session outlives a call.

use crate::error::FetchError;
use crate::http1;
use crate::tcp::TcpConfig;
use crate::transport;
use crate::url::{RawParts, Url};
use crate::{Document, Response};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Verify server certificates for https URLs
    pub verify_certificate: bool,
    /// TCP settings
    pub tcp: TcpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("webget/", env!("CARGO_PKG_VERSION")).into(),
            verify_certificate: true,
            tcp: TcpConfig::default(),
        }
    }
}

/// HTTP client builder
pub struct HttpClientBuilder {
    config: ClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn user_agent(mut self, ua: &str) -> Self {
        self.config.user_agent = ua.to_string();
        self
    }

    /// Turning this off accepts any certificate for any host
    pub fn verify_certificate(mut self, verify: bool) -> Self {
        self.config.verify_certificate = verify;
        self
    }

    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.tcp.nodelay = nodelay;
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient::with_config(self.config)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot HTTP client
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create with custom config
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a URL string. Any complete response counts as success,
    /// whatever its status.
    pub fn get_response(&self, url: &str) -> Result<Response, FetchError> {
        logged(url, self.fetch(url))
    }

    /// Fetch and return only the status code
    pub fn get_status(&self, url: &str) -> Result<u16, FetchError> {
        logged(url, self.fetch(url).map(|response| response.status))
    }

    /// Fetch and decode the body as JSON
    pub fn get_json(&self, url: &str) -> Result<Document, FetchError> {
        let result = self.fetch(url).and_then(|response| {
            serde_json::from_slice::<Document>(&response.body).map_err(FetchError::from)
        });
        logged(url, result)
    }

    /// Fetch an already parsed URL
    pub fn fetch_url(&self, url: &Url) -> Result<Response, FetchError> {
        let use_tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        };

        let target = url.request_target();
        tracing::debug!("GET {}://{}:{}{}", url.scheme(), url.host(), url.port(), target);

        let mut stream = transport::connect(
            url.host(),
            url.port(),
            use_tls,
            self.config.verify_certificate,
            &self.config.tcp,
        )?;

        let response = http1::get(&mut stream, url.host(), &target, &self.config.user_agent)?;
        Ok(response)
    }

    fn fetch(&self, url: &str) -> Result<Response, FetchError> {
        let url = Url::parse(url)?;
        self.fetch_url(&url)
    }
}

/// Report a failed fetch once, at the client boundary
fn logged<T>(url: &str, result: Result<T, FetchError>) -> Result<T, FetchError> {
    if let Err(e) = &result {
        tracing::warn!("GET {} failed ({}): {}", redact(url), e.failure(), e);
    }
    result
}

/// Drop userinfo so credentials never reach the log
fn redact(url: &str) -> String {
    match RawParts::split(url) {
        Some(parts) if parts.user_info.is_some() => {
            format!("{}://***@{}{}", parts.scheme, parts.host_port, parts.tail)
        }
        _ => url.to_string(),
    }
}
