//! Fetch errors and their failure codes

use std::io;

use crate::failure::GetFailure;
use crate::http1::Http1Error;
use crate::url::UrlError;

/// Why a fetch failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    Url(#[from] UrlError),

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {host} failed: {source}")]
    Auth {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("GET failed: {source}")]
    Protocol {
        /// Status code, if a status line arrived before the failure
        status: Option<u16>,
        #[source]
        source: io::Error,
    },

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Failure code for this error
    pub fn failure(&self) -> GetFailure {
        let fail_num = match self {
            FetchError::Url(_) | FetchError::UnsupportedScheme(_) => GetFailure::URL,
            FetchError::Connect { .. } => GetFailure::CONNECT,
            FetchError::Auth { .. } => GetFailure::AUTH,
            // A status of 200 says nothing about what went wrong
            FetchError::Protocol { status: Some(status), .. } if *status != 200 => *status,
            FetchError::Protocol { .. } => GetFailure::GET,
            FetchError::Decode(_) => GetFailure::JSON,
        };
        GetFailure::new(fail_num)
    }

    /// Status code received before the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Protocol { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<Http1Error> for FetchError {
    fn from(err: Http1Error) -> Self {
        FetchError::Protocol {
            status: err.status,
            source: err.source,
        }
    }
}

impl From<&FetchError> for GetFailure {
    fn from(err: &FetchError) -> Self {
        err.failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailType;

    fn protocol(status: Option<u16>) -> FetchError {
        FetchError::Protocol {
            status,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        }
    }

    #[test]
    fn test_failure_codes() {
        assert_eq!(FetchError::from(UrlError::EmptyHost).failure().fail_num(), 1);
        assert_eq!(FetchError::UnsupportedScheme("ftp".into()).failure().fail_num(), 1);
        let connect = FetchError::Connect {
            host: "localhost".into(),
            port: 1,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(connect.failure().fail_num(), 2);
        let auth = FetchError::Auth {
            host: "localhost".into(),
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        assert_eq!(auth.failure().fail_num(), 3);

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(FetchError::from(decode).failure().fail_type(), FailType::Json);
    }

    #[test]
    fn test_protocol_failure_uses_status() {
        assert_eq!(protocol(None).failure().fail_num(), GetFailure::GET);
        assert_eq!(protocol(Some(200)).failure().fail_num(), GetFailure::GET);
        assert_eq!(protocol(Some(500)).failure().fail_num(), 500);
        assert_eq!(protocol(Some(500)).failure().fail_type(), FailType::Get);
        assert_eq!(protocol(Some(500)).status(), Some(500));
    }

    #[test]
    fn test_from_http1_error() {
        let err = FetchError::from(Http1Error {
            status: Some(404),
            source: io::Error::new(io::ErrorKind::InvalidData, "bad header"),
        });
        assert_eq!(GetFailure::from(&err), GetFailure::status(404));
    }
}
