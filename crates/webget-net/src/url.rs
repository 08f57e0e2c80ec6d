//! URL Parsing
//!
//! Strict parser for `scheme://[userinfo@]host[:port][/path][?query][#fragment]`.
//! Parsed URLs are immutable; [`UrlBuilder`] covers field-by-field
//! construction and runs the same validation as [`Url::parse`].

use std::fmt;
use std::str::FromStr;

use crate::host::{self, HostError};

/// URL parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("illegal character {0:?} in URL")]
    IllegalCharacter(char),

    #[error("missing '://' after scheme")]
    MissingScheme,

    #[error("invalid scheme '{0}'")]
    InvalidScheme(String),

    #[error("URL has no host")]
    EmptyHost,

    #[error("invalid host '{host}': {reason}")]
    InvalidHost {
        host: String,
        #[source]
        reason: HostError,
    },

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("scheme '{0}' has no default port")]
    UnknownScheme(String),

    #[error("malformed percent-encoding in '{0}'")]
    BadPercentEncoding(String),

    #[error("invalid {component} '{value}'")]
    InvalidComponent {
        component: &'static str,
        value: String,
    },
}

/// Parsed URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    scheme: String,
    user_info: String,
    host: String,
    port: u16,
    path: String,
    query: String,
    fragment: String,
}

/// Unvalidated top-level split of a URL string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawParts<'a> {
    pub scheme: &'a str,
    /// Everything before the last '@' of the authority, if there is one
    pub user_info: Option<&'a str>,
    pub host_port: &'a str,
    /// Path, query and fragment, with their delimiters
    pub tail: &'a str,
}

impl<'a> RawParts<'a> {
    /// Split at `://`, then at the end of the authority. `None` without `://`.
    pub fn split(input: &'a str) -> Option<Self> {
        let scheme_end = input.find("://")?;
        let scheme = &input[..scheme_end];
        let rest = &input[scheme_end + 3..];

        // Authority runs up to the first '/', '?' or '#'
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        // Userinfo is everything before the last '@'
        let (user_info, host_port) = match authority.rfind('@') {
            Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
            None => (None, authority),
        };

        Some(Self {
            scheme,
            user_info,
            host_port,
            tail,
        })
    }
}

impl Url {
    /// Parse a URL string
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        if let Some(c) = input.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(UrlError::IllegalCharacter(c));
        }

        let RawParts {
            scheme,
            user_info,
            host_port,
            tail,
        } = RawParts::split(input).ok_or(UrlError::MissingScheme)?;

        let (host, port) = match host_port.rfind(':') {
            Some(colon) => (&host_port[..colon], Some(&host_port[colon + 1..])),
            None => (host_port, None),
        };

        // Fragment wins over query: a '?' after '#' belongs to the fragment
        let (before_fragment, fragment) = match tail.find('#') {
            Some(i) => (&tail[..i], &tail[i + 1..]),
            None => (tail, ""),
        };
        let (path, query) = match before_fragment.find('?') {
            Some(i) => (&before_fragment[..i], &before_fragment[i + 1..]),
            None => (before_fragment, ""),
        };

        let mut builder = UrlBuilder::new(scheme, host)
            .user_info(user_info.unwrap_or(""))
            .path(path)
            .query(query)
            .fragment(fragment);
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            builder = builder.port(parse_port(port)?);
        }
        builder.build()
    }

    /// Start building a URL from its parts
    pub fn builder(scheme: &str, host: &str) -> UrlBuilder {
        UrlBuilder::new(scheme, host)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user_info(&self) -> &str {
        &self.user_info
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Check if the port is the scheme's default
    pub fn is_default_port(&self) -> bool {
        self.port == host::default_port(&self.scheme)
    }

    /// Everything after the authority: path, `?query`, `#fragment`
    pub fn after_authority(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }

    /// Request target for the GET line; an empty path becomes `/`
    pub fn request_target(&self) -> String {
        let target = self.after_authority();
        if self.path.is_empty() {
            format!("/{}", target)
        } else {
            target
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if !self.user_info.is_empty() {
            write!(f, "{}@", self.user_info)?;
        }
        f.write_str(&self.host)?;
        if !self.is_default_port() {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.after_authority())
    }
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = UrlError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// Field-by-field URL construction
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    scheme: String,
    user_info: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: String,
    fragment: String,
}

impl UrlBuilder {
    pub fn new(scheme: &str, host: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            ..Default::default()
        }
    }

    pub fn user_info(mut self, user_info: &str) -> Self {
        self.user_info = user_info.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn fragment(mut self, fragment: &str) -> Self {
        self.fragment = fragment.to_string();
        self
    }

    /// Validate every part and produce the URL
    pub fn build(self) -> Result<Url, UrlError> {
        let parts = [
            &self.scheme,
            &self.user_info,
            &self.host,
            &self.path,
            &self.query,
            &self.fragment,
        ];
        if let Some(c) = parts
            .iter()
            .flat_map(|part| part.chars())
            .find(|c| !c.is_ascii_graphic())
        {
            return Err(UrlError::IllegalCharacter(c));
        }

        let scheme = self.scheme.to_ascii_lowercase();
        if !is_valid_scheme(&scheme) {
            return Err(UrlError::InvalidScheme(self.scheme));
        }

        if self.host.is_empty() {
            return Err(UrlError::EmptyHost);
        }
        let host = self.host.to_ascii_lowercase();
        host::validate_host(&host).map_err(|reason| UrlError::InvalidHost {
            host: self.host.clone(),
            reason,
        })?;

        let port = match self.port {
            Some(0) => return Err(UrlError::InvalidPort("0".into())),
            Some(port) => port,
            None => match host::default_port(&scheme) {
                0 => return Err(UrlError::UnknownScheme(scheme)),
                port => port,
            },
        };

        check_component("userinfo", &self.user_info, |c| c == '/' || c == '?' || c == '#')?;
        check_component("path", &self.path, |c| c == '?' || c == '#')?;
        check_component("query", &self.query, |c| c == '#')?;
        check_component("fragment", &self.fragment, |_| false)?;
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(UrlError::InvalidComponent {
                component: "path",
                value: self.path,
            });
        }

        Ok(Url {
            scheme,
            user_info: self.user_info,
            host,
            port,
            path: self.path,
            query: self.query,
            fragment: self.fragment,
        })
    }
}

/// `[a-z][a-z0-9+.-]*`, already lowercased
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '-'))
}

fn parse_port(port: &str) -> Result<u16, UrlError> {
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UrlError::InvalidPort(port.to_string()));
    }
    port.parse().map_err(|_| UrlError::InvalidPort(port.to_string()))
}

fn check_component(
    component: &'static str,
    value: &str,
    forbidden: impl Fn(char) -> bool,
) -> Result<(), UrlError> {
    if value.chars().any(forbidden) {
        return Err(UrlError::InvalidComponent {
            component,
            value: value.to_string(),
        });
    }
    if !has_valid_percent_encoding(value) {
        return Err(UrlError::BadPercentEncoding(value.to_string()));
    }
    Ok(())
}

/// Every '%' must be followed by two hex digits. The octets are not decoded.
fn has_valid_percent_encoding(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
