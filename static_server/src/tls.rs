use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use rustls::crypto::{ring::default_provider, CryptoProvider};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::ServerConfig;
use rustls_pemfile::{certs, pkcs8_private_keys};

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("lecture de {}", path.display()))
}

/// Charge un certificat et une clé PKCS#8 au format PEM.
pub fn rustls_config(cert_path: &Path, key_path: &Path) -> Result<ServerConfig> {
    // déjà installé si appelé deux fois
    let _ = CryptoProvider::install_default(default_provider());

    let cert_pem = read_pem(cert_path)?;
    let key_pem  = read_pem(key_path)?;

    let chain: Vec<CertificateDer<'static>> = certs(&mut &*cert_pem)
        .collect::<Result<_, _>>()
        .with_context(|| format!("certificat illisible : {}", cert_path.display()))?;
    if chain.is_empty() {
        return Err(anyhow!("aucun certificat dans {}", cert_path.display()));
    }

    let key = pkcs8_private_keys(&mut &*key_pem)
        .next()
        .ok_or_else(|| anyhow!("aucune clé PKCS#8 dans {}", key_path.display()))??;

    let cfg = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, PrivateKeyDer::Pkcs8(key))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_files_are_reported() {
        let cert = Path::new("/nonexistent/cert.pem");
        let err = rustls_config(cert, Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cert.pem"));
    }

    #[test]
    fn pem_without_certificate_is_rejected() {
        let mut cert = tempfile::NamedTempFile::new().unwrap();
        writeln!(cert, "pas un certificat").unwrap();
        let key = tempfile::NamedTempFile::new().unwrap();

        let err = rustls_config(cert.path(), key.path()).unwrap_err();
        assert!(err.to_string().contains("aucun certificat"));
    }
}
