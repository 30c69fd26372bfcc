use crate::{QuorumGateError, Result};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::path::Path;
use std::sync::Arc;

/// Build a rustls server configuration from PEM certificate and key files.
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>> {
    let cert_pem = std::fs::read(cert_path).map_err(|e| {
        QuorumGateError::TlsError(format!(
            "Failed to read certificate {}: {}",
            cert_path.display(),
            e
        ))
    })?;
    let key_pem = std::fs::read(key_path).map_err(|e| {
        QuorumGateError::TlsError(format!("Failed to read key {}: {}", key_path.display(), e))
    })?;

    let certs = parse_certificates(&cert_pem)?;
    let key = PrivateKeyDer::from_pem_slice(&key_pem)
        .map_err(|e| QuorumGateError::TlsError(format!("Failed to parse private key: {}", e)))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| QuorumGateError::TlsError(format!("Unsupported protocol versions: {}", e)))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| QuorumGateError::TlsError(format!("Invalid certificate or key: {}", e)))?;

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

fn parse_certificates(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| QuorumGateError::TlsError(format!("Failed to parse certificates: {}", e)))?;

    if certs.is_empty() {
        return Err(QuorumGateError::TlsError(
            "No certificates found in PEM input".to_string(),
        ));
    }

    Ok(certs)
}
