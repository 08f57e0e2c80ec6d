//! TCP Connection Layer
//!
//! Blocking TCP connections. Every candidate address for a host is tried in
//! resolution order; the first that accepts wins.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream as StdTcpStream, ToSocketAddrs};

/// TCP connection configuration
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// TCP nodelay (disable Nagle's algorithm)
    pub nodelay: bool,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self { nodelay: true }
    }
}

/// TCP connection wrapper
pub struct TcpConnection {
    /// Underlying stream
    stream: StdTcpStream,
    /// Remote address
    remote_addr: SocketAddr,
}

impl TcpConnection {
    /// Connect to host:port with default config
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        Self::connect_with_config(host, port, &TcpConfig::default())
    }

    /// Resolve and connect with custom config
    pub fn connect_with_config(host: &str, port: u16, config: &TcpConfig) -> io::Result<Self> {
        let mut last_err = None;
        for addr in resolve_host(host, port)? {
            match Self::connect_to_addr(addr, config) {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    tracing::trace!("connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "No address found")
        }))
    }

    /// Connect to a SocketAddr
    pub fn connect_to_addr(addr: SocketAddr, config: &TcpConfig) -> io::Result<Self> {
        let stream = StdTcpStream::connect(addr)?;
        stream.set_nodelay(config.nodelay)?;

        Ok(Self {
            stream,
            remote_addr: addr,
        })
    }

    /// Get remote address
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Take the inner stream (for TLS upgrade)
    pub fn into_inner(self) -> StdTcpStream {
        self.stream
    }

    /// Shutdown the connection
    pub fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        self.stream.shutdown(how)
    }
}

impl Read for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Resolve a host to all of its candidate addresses
pub fn resolve_host(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "DNS resolution failed"));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_config_default() {
        let config = TcpConfig::default();
        assert!(config.nodelay);
    }

    #[test]
    fn test_resolve_host_literal() {
        let addrs = resolve_host("127.0.0.1", 80).unwrap();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].port(), 80);
    }

    #[test]
    fn test_connect_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let conn = TcpConnection::connect("127.0.0.1", port).unwrap();
        assert_eq!(conn.remote_addr().port(), port);
        conn.shutdown(Shutdown::Both).unwrap();
    }

    #[test]
    fn test_connect_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(TcpConnection::connect("127.0.0.1", port).is_err());
    }
}
