//! webget Networking
//!
//! One-shot blocking HTTP and HTTPS GET with strict URL validation and a
//! single numeric failure code per fetch.
//!
//! ```no_run
//! let response = webget_net::get_response("https://example.com/", true)?;
//! println!("{}", response.status);
//! # Ok::<(), webget_net::FetchError>(())
//! ```

pub mod client;
pub mod error;
pub mod failure;
pub mod fetch;
pub mod host;
pub mod http1;
pub mod tcp;
pub mod tls;
pub mod transport;
pub mod url;

use std::io::{self, Write};

pub use client::{ClientConfig, HttpClient, HttpClientBuilder};
pub use error::FetchError;
pub use failure::{FailType, GetFailure};
pub use fetch::{
    get_json, get_json_with_failure, get_response, get_response_with_failure, get_status,
    get_status_with_failure,
};
pub use host::HostError;
pub use http1::{Http1Error, Http1Parser, Http1Request, HttpVersion};
pub use tcp::{TcpConfig, TcpConnection};
pub use tls::{TlsConfig, TlsStream};
pub use transport::Transport;
pub use url::{Url, UrlBuilder, UrlError};

/// JSON document decoded from a response body
pub type Document = serde_json::Value;

/// HTTP Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub version: HttpVersion,
    pub status: u16,
    pub reason: String,
    /// Headers in the order received
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Get header value (case-insensitive, first match)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as text
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Check if response is successful
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The status as a failure for callers that require a 2xx response
    pub fn error_for_status(&self) -> Result<&Self, GetFailure> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GetFailure::status(self.status))
        }
    }

    /// Write the whole message: status line, headers, blank line, body
    pub fn write_message<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{} {} {}\r\n", self.version, self.status, self.reason)?;
        for (name, value) in &self.headers {
            write!(writer, "{}: {}\r\n", name, value)?;
        }
        writer.write_all(b"\r\n")?;
        writer.write_all(&self.body)
    }
}
