//! Transport Selection
//!
//! Opens a plain or TLS byte stream to a host. A [`Transport`] closes itself
//! when dropped, so every exit path of a fetch releases its socket.

use std::io::{self, Read, Write};
use std::net::Shutdown;

use crate::error::FetchError;
use crate::tcp::{TcpConfig, TcpConnection};
use crate::tls::{TlsConfig, TlsStream};

/// Connected byte stream
pub enum Transport {
    Plain(TcpConnection),
    Tls(Box<TlsStream>),
}

impl Transport {
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }

    /// Best-effort close; errors are only traced
    fn close(&mut self) {
        let result = match self {
            Transport::Plain(tcp) => tcp.shutdown(Shutdown::Both),
            Transport::Tls(tls) => tls.shutdown(),
        };
        if let Err(e) = result {
            tracing::trace!("error closing transport: {}", e);
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.read(buf),
            Transport::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.write(buf),
            Transport::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(tcp) => tcp.flush(),
            Transport::Tls(tls) => tls.flush(),
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Connect to `host:port`, optionally over TLS.
///
/// Resolution and TCP failures are [`FetchError::Connect`]; anything that
/// goes wrong from the start of the TLS handshake on is [`FetchError::Auth`].
pub fn connect(
    host: &str,
    port: u16,
    use_tls: bool,
    verify_certificate: bool,
    tcp_config: &TcpConfig,
) -> Result<Transport, FetchError> {
    let tcp = TcpConnection::connect_with_config(host, port, tcp_config).map_err(|source| {
        FetchError::Connect {
            host: host.to_string(),
            port,
            source,
        }
    })?;

    if !use_tls {
        return Ok(Transport::Plain(tcp));
    }

    let tls_config = TlsConfig::verified(verify_certificate);
    let tls = TlsStream::connect(tcp, host, &tls_config).map_err(|source| FetchError::Auth {
        host: host.to_string(),
        source,
    })?;
    tracing::debug!("{} established with {}", tls.protocol_version().unwrap_or("TLS"), host);
    Ok(Transport::Tls(Box::new(tls)))
}
