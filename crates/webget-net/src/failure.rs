//! GET Failure Codes
//!
//! The numeric failure namespace shared with consumers of fetch results.
//! Codes 100 through 999 are verbatim HTTP status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailType {
    /// No failure
    None,
    /// URL could not be parsed or is not fetchable
    Url,
    /// Name resolution or TCP connect failed
    Connect,
    /// TLS handshake or server certificate validation failed
    AuthenticateServer,
    /// Request/response exchange failed, or an HTTP status code
    Get,
    /// Response body is not valid JSON
    Json,
    /// Anything else
    Other,
}

impl fmt::Display for FailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailType::None => "none",
            FailType::Url => "url",
            FailType::Connect => "connect",
            FailType::AuthenticateServer => "authenticate-server",
            FailType::Get => "get",
            FailType::Json => "json",
            FailType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Failure number of a single fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GetFailure {
    fail_num: u16,
}

impl GetFailure {
    pub const NONE: u16 = 0;
    pub const URL: u16 = 1;
    pub const CONNECT: u16 = 2;
    pub const AUTH: u16 = 3;
    pub const GET: u16 = 4;
    pub const JSON: u16 = 5;
    pub const UNKNOWN: u16 = 0xFFFF;

    /// Range reserved for HTTP status codes
    pub const STATUS_RANGE: std::ops::Range<u16> = 100..1000;

    pub const fn new(fail_num: u16) -> Self {
        Self { fail_num }
    }

    pub const fn none() -> Self {
        Self::new(Self::NONE)
    }

    /// Failure carrying an HTTP status code
    pub const fn status(code: u16) -> Self {
        Self::new(code)
    }

    pub const fn fail_num(&self) -> u16 {
        self.fail_num
    }

    /// True for any code other than none
    pub const fn is_failure(&self) -> bool {
        self.fail_num != Self::NONE
    }

    /// HTTP status code, if this failure carries one
    pub fn status_code(&self) -> Option<u16> {
        Self::STATUS_RANGE.contains(&self.fail_num).then_some(self.fail_num)
    }

    pub fn fail_type(&self) -> FailType {
        match self.fail_num {
            Self::NONE => FailType::None,
            Self::URL => FailType::Url,
            Self::CONNECT => FailType::Connect,
            Self::AUTH => FailType::AuthenticateServer,
            Self::GET => FailType::Get,
            Self::JSON => FailType::Json,
            n if Self::STATUS_RANGE.contains(&n) => FailType::Get,
            _ => FailType::Other,
        }
    }
}

impl fmt::Display for GetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fail_type() {
            FailType::None => f.write_str("NONE"),
            FailType::Url => f.write_str("URL"),
            FailType::Connect => f.write_str("CONNECT"),
            FailType::AuthenticateServer => f.write_str("AUTH"),
            FailType::Get => write!(f, "GET:{}", self.fail_num),
            FailType::Json => f.write_str("JSON"),
            FailType::Other => write!(f, "{}", self.fail_num),
        }
    }
}

impl From<u16> for GetFailure {
    fn from(fail_num: u16) -> Self {
        Self::new(fail_num)
    }
}

impl From<GetFailure> for u16 {
    fn from(failure: GetFailure) -> Self {
        failure.fail_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_codes() {
        assert_eq!(GetFailure::new(0).fail_type(), FailType::None);
        assert_eq!(GetFailure::new(1).fail_type(), FailType::Url);
        assert_eq!(GetFailure::new(2).fail_type(), FailType::Connect);
        assert_eq!(GetFailure::new(3).fail_type(), FailType::AuthenticateServer);
        assert_eq!(GetFailure::new(4).fail_type(), FailType::Get);
        assert_eq!(GetFailure::new(5).fail_type(), FailType::Json);
        assert_eq!(GetFailure::new(0xFFFF).fail_type(), FailType::Other);
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(GetFailure::new(99).fail_type(), FailType::Other);
        assert_eq!(GetFailure::new(100).fail_type(), FailType::Get);
        assert_eq!(GetFailure::new(999).fail_type(), FailType::Get);
        assert_eq!(GetFailure::new(1000).fail_type(), FailType::Other);

        assert_eq!(GetFailure::new(99).status_code(), None);
        assert_eq!(GetFailure::status(404).status_code(), Some(404));
        assert_eq!(GetFailure::new(1000).status_code(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(GetFailure::none().to_string(), "NONE");
        assert_eq!(GetFailure::new(GetFailure::URL).to_string(), "URL");
        assert_eq!(GetFailure::new(GetFailure::CONNECT).to_string(), "CONNECT");
        assert_eq!(GetFailure::new(GetFailure::AUTH).to_string(), "AUTH");
        assert_eq!(GetFailure::new(GetFailure::GET).to_string(), "GET:4");
        assert_eq!(GetFailure::status(503).to_string(), "GET:503");
        assert_eq!(GetFailure::new(GetFailure::JSON).to_string(), "JSON");
        assert_eq!(GetFailure::new(42).to_string(), "42");
        assert_eq!(GetFailure::new(GetFailure::UNKNOWN).to_string(), "65535");
    }

    #[test]
    fn test_is_failure() {
        assert!(!GetFailure::default().is_failure());
        assert!(GetFailure::new(GetFailure::UNKNOWN).is_failure());
    }

    #[test]
    fn test_serde_is_bare_number() {
        let json = serde_json::to_string(&GetFailure::status(404)).unwrap();
        assert_eq!(json, "404");
        let failure: GetFailure = serde_json::from_str("3").unwrap();
        assert_eq!(failure.fail_type(), FailType::AuthenticateServer);
        assert_eq!(u16::from(failure), 3);
    }
}
