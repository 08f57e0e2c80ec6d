//! TLS Layer
//!
//! Client-side TLS using rustls with the Mozilla root store. Verification
//! is fail-closed: the chain and the host name must both check out. It can
//! only be switched off wholesale, never partially.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{self, CryptoProvider};
use rustls::{
    ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme,
    StreamOwned,
};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

use crate::tcp::TcpConnection;

/// TLS configuration
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// ALPN protocols offered to the server
    pub alpn_protocols: Vec<String>,
    /// Verify the certificate chain and host name
    pub verify_certs: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            alpn_protocols: vec!["http/1.1".into()],
            verify_certs: true,
        }
    }
}

impl TlsConfig {
    /// Default config with verification on or off
    pub fn verified(verify_certs: bool) -> Self {
        Self {
            verify_certs,
            ..Default::default()
        }
    }
}

/// Accepts any server certificate. Signatures are still checked so the
/// handshake itself stays well-formed.
#[derive(Debug)]
struct NoVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Create the rustls client configuration
fn create_client_config(config: &TlsConfig) -> Result<Arc<ClientConfig>, rustls::Error> {
    let provider = Arc::new(crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?;

    let mut tls_config = if config.verify_certs {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(root_store).with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerification(provider)))
            .with_no_client_auth()
    };

    tls_config.alpn_protocols = config
        .alpn_protocols
        .iter()
        .map(|s| s.as_bytes().to_vec())
        .collect();

    Ok(Arc::new(tls_config))
}

/// TLS stream wrapper over TCP using rustls
pub struct TlsStream {
    /// Rustls stream owning the connection
    stream: StreamOwned<ClientConnection, TcpStream>,
}

impl TlsStream {
    /// Run the client handshake over an established TCP connection.
    ///
    /// The handshake completes before this returns, so certificate and
    /// name-mismatch failures surface here rather than on first read.
    pub fn connect(tcp: TcpConnection, server_name: &str, config: &TlsConfig) -> io::Result<Self> {
        let tls_config = create_client_config(config).map_err(io::Error::other)?;

        // SNI and certificate name; IP literals become IP address names
        let name: ServerName<'static> = ServerName::try_from(server_name.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid server name"))?;

        let mut conn = ClientConnection::new(tls_config, name).map_err(io::Error::other)?;
        let mut sock = tcp.into_inner();

        while conn.is_handshaking() {
            if let Err(e) = conn.complete_io(&mut sock) {
                let _ = sock.shutdown(Shutdown::Both);
                return Err(e);
            }
        }

        Ok(Self {
            stream: StreamOwned::new(conn, sock),
        })
    }

    /// Get negotiated protocol version
    pub fn protocol_version(&self) -> Option<&'static str> {
        self.stream.conn.protocol_version().map(|v| match v {
            rustls::ProtocolVersion::TLSv1_2 => "TLSv1.2",
            rustls::ProtocolVersion::TLSv1_3 => "TLSv1.3",
            _ => "Unknown",
        })
    }

    /// Send close_notify, then close the socket
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.stream.conn.send_close_notify();
        let flushed = self.stream.flush();
        let closed = self.stream.sock.shutdown(Shutdown::Both);
        flushed.and(closed)
    }
}

impl Read for TlsStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TlsStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
