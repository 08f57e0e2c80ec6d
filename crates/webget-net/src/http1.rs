//! HTTP/1.1 Framing
//!
//! GET request serialization and complete response parsing for a single
//! exchange over a connection that closes afterwards.

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::Response;

/// HTTP/1.1 request
#[derive(Debug, Clone)]
pub struct Http1Request {
    /// HTTP method
    pub method: String,
    /// Request target (e.g., "/api/users?page=2")
    pub target: String,
    /// HTTP version
    pub version: HttpVersion,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

/// HTTP version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpVersion {
    Http10,
    #[default]
    Http11,
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpVersion::Http10 => write!(f, "HTTP/1.0"),
            HttpVersion::Http11 => write!(f, "HTTP/1.1"),
        }
    }
}

impl Http1Request {
    /// Create a GET request
    pub fn get(target: &str) -> Self {
        Self {
            method: "GET".into(),
            target: target.to_string(),
            version: HttpVersion::Http11,
            headers: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        let request_line = format!("{} {} {}\r\n", self.method, self.target, self.version);
        buf.extend_from_slice(request_line.as_bytes());
        for (name, value) in &self.headers {
            buf.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        buf.extend_from_slice(b"\r\n");

        buf
    }

    /// Write to a stream
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.serialize())?;
        writer.flush()
    }
}

/// Failed exchange. `status` is set when a status line was read before the
/// failure.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct Http1Error {
    pub status: Option<u16>,
    #[source]
    pub source: io::Error,
}

impl Http1Error {
    fn before_status(source: io::Error) -> Self {
        Self { status: None, source }
    }
}

/// Longest status, header, chunk-size or trailer line accepted
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Total size of the status line and headers accepted
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

fn unexpected_eof(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, msg.to_string())
}

/// `read_line` that gives up once a line exceeds [`MAX_LINE_LEN`]
fn read_line_capped<R: BufRead>(reader: &mut R, line: &mut String) -> io::Result<usize> {
    let n = reader.by_ref().take(MAX_LINE_LEN as u64 + 1).read_line(line)?;
    if n > MAX_LINE_LEN {
        return Err(invalid_data("Line too long"));
    }
    Ok(n)
}

/// Append exactly `len` bytes to `body`, growing it only as data arrives
fn read_exact_into<R: Read>(reader: &mut R, len: u64, body: &mut Vec<u8>) -> io::Result<()> {
    let n = reader.by_ref().take(len).read_to_end(body)?;
    if (n as u64) < len {
        return Err(unexpected_eof("Body shorter than announced"));
    }
    Ok(())
}

/// HTTP/1.1 response parser
pub struct Http1Parser {
    /// Current state
    state: ParseState,
    /// HTTP version
    version: HttpVersion,
    /// Status code
    status: u16,
    /// Reason phrase
    reason: String,
    /// Parsed headers
    headers: Vec<(String, String)>,
    /// Bytes consumed by the status line and headers so far
    head_len: usize,
    /// Body bytes
    body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StatusLine,
    Headers,
    Body,
    Complete,
}

impl Http1Parser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            version: HttpVersion::Http11,
            status: 0,
            reason: String::new(),
            headers: Vec::new(),
            head_len: 0,
            body: Vec::new(),
        }
    }

    /// Parse one complete response from a reader
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Response, Http1Error> {
        let mut parser = Self::new();
        match parser.run(reader) {
            Ok(()) => Ok(parser.finish()),
            Err(source) => Err(Http1Error {
                status: parser.status_if_read(),
                source,
            }),
        }
    }

    fn run<R: BufRead>(&mut self, reader: &mut R) -> io::Result<()> {
        let mut line = String::new();
        while self.state != ParseState::Complete {
            match self.state {
                ParseState::StatusLine => {
                    line.clear();
                    if self.read_head_line(reader, &mut line)? == 0 {
                        return Err(unexpected_eof("Connection closed before status line"));
                    }
                    self.parse_status_line(&line)?;
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    line.clear();
                    if self.read_head_line(reader, &mut line)? == 0 {
                        return Err(unexpected_eof("Connection closed in headers"));
                    }
                    if line == "\r\n" || line == "\n" {
                        self.state = ParseState::Body;
                    } else {
                        self.parse_header_line(&line)?;
                    }
                }
                ParseState::Body => {
                    self.read_body(reader)?;
                    self.state = ParseState::Complete;
                }
                ParseState::Complete => {}
            }
        }
        Ok(())
    }

    fn read_head_line<R: BufRead>(
        &mut self,
        reader: &mut R,
        line: &mut String,
    ) -> io::Result<usize> {
        let n = read_line_capped(reader, line)?;
        self.head_len += n;
        if self.head_len > MAX_HEADER_BYTES {
            return Err(invalid_data("Response headers too large"));
        }
        Ok(n)
    }

    fn status_if_read(&self) -> Option<u16> {
        (self.state != ParseState::StatusLine).then_some(self.status)
    }

    fn finish(self) -> Response {
        Response {
            version: self.version,
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            body: self.body,
        }
    }

    fn parse_status_line(&mut self, line: &str) -> io::Result<()> {
        let line = line.trim_end();
        let mut parts = line.splitn(3, ' ');

        let version_str = parts.next().ok_or_else(|| invalid_data("Missing HTTP version"))?;
        self.version = match version_str {
            "HTTP/1.0" => HttpVersion::Http10,
            "HTTP/1.1" => HttpVersion::Http11,
            _ => return Err(invalid_data("Invalid HTTP version")),
        };

        // Exactly three digits, 100-999
        let status_str = parts.next().ok_or_else(|| invalid_data("Missing status code"))?;
        if status_str.len() != 3 || !status_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_data("Invalid status code"));
        }
        self.status = status_str.parse().map_err(|_| invalid_data("Invalid status code"))?;
        if self.status < 100 {
            return Err(invalid_data("Invalid status code"));
        }

        self.reason = parts.next().unwrap_or("").to_string();
        Ok(())
    }

    fn parse_header_line(&mut self, line: &str) -> io::Result<()> {
        let line = line.trim_end();
        let colon_pos = line.find(':').ok_or_else(|| invalid_data("Malformed header line"))?;
        let name = line[..colon_pos].trim();
        if name.is_empty() {
            return Err(invalid_data("Empty header name"));
        }
        let value = line[colon_pos + 1..].trim();
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn read_body<R: BufRead>(&mut self, reader: &mut R) -> io::Result<()> {
        // 1xx, 204 and 304 never carry a body
        if self.status < 200 || self.status == 204 || self.status == 304 {
            return Ok(());
        }

        let chunked = self
            .header("transfer-encoding")
            .map(|v| v.eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);
        if chunked {
            return self.read_chunked_body(reader);
        }

        if let Some(len) = self.header("content-length") {
            let len: u64 = len.parse().map_err(|_| invalid_data("Invalid Content-Length"))?;
            return read_exact_into(reader, len, &mut self.body);
        }

        // No framing: the body runs until the server closes
        match reader.read_to_end(&mut self.body) {
            Ok(_) => Ok(()),
            // TLS peers often close without close_notify
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn read_chunked_body<R: BufRead>(&mut self, reader: &mut R) -> io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if read_line_capped(reader, &mut line)? == 0 {
                return Err(unexpected_eof("Truncated chunked body"));
            }

            // Chunk extensions follow ';'
            let size_str = line.split(';').next().unwrap_or("").trim();
            let size = u64::from_str_radix(size_str, 16)
                .map_err(|_| invalid_data("Invalid chunk size"))?;

            if size == 0 {
                // Skip trailers up to the final empty line
                loop {
                    line.clear();
                    if read_line_capped(reader, &mut line)? == 0 || line.trim_end().is_empty() {
                        return Ok(());
                    }
                }
            }

            if (self.body.len() as u64).checked_add(size).is_none() {
                return Err(invalid_data("Chunked body too large"));
            }
            read_exact_into(reader, size, &mut self.body)?;

            // Trailing CRLF
            line.clear();
            read_line_capped(reader, &mut line)?;
        }
    }
}

impl Default for Http1Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one GET for `target` and read back the complete response
pub fn get<S: Read + Write>(
    stream: &mut S,
    host: &str,
    target: &str,
    user_agent: &str,
) -> Result<Response, Http1Error> {
    let request = Http1Request::get(target)
        .header("Host", host)
        .header("User-Agent", user_agent)
        .header("Connection", "close");

    request.write_to(stream).map_err(Http1Error::before_status)?;

    let mut reader = BufReader::new(stream);
    Http1Parser::parse(&mut reader)
}
