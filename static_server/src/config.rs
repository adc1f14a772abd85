//! Configuration du serveur, lue dans l'environnement (et `.env`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

pub const DEFAULT_BIND: &str = "0.0.0.0:8444";
pub const DEFAULT_BACKEND: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tls {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    /// Dossier généré par `trunk build`.
    pub dist: PathBuf,
    pub backend: String,
    pub tls: Option<Tls>,
}

fn default_dist() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../frontend/dist")
}

impl ServerConfig {
    /// `lookup` renvoie la valeur d'une variable ; les valeurs vides comptent comme absentes.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = var("FORMADMIN_BACKEND").unwrap_or_else(|| DEFAULT_BACKEND.into());
        if !backend.starts_with("http://") && !backend.starts_with("https://") {
            bail!("FORMADMIN_BACKEND doit être une URL http(s) : {backend}");
        }

        let tls = match (var("FORMADMIN_TLS_CERT"), var("FORMADMIN_TLS_KEY")) {
            (Some(cert), Some(key)) => Some(Tls { cert: cert.into(), key: key.into() }),
            (None, None) => None,
            _ => bail!("FORMADMIN_TLS_CERT et FORMADMIN_TLS_KEY vont ensemble"),
        };

        Ok(Self {
            bind: var("FORMADMIN_BIND").unwrap_or_else(|| DEFAULT_BIND.into()),
            dist: var("FORMADMIN_DIST").map(PathBuf::from).unwrap_or_else(default_dist),
            backend: backend.trim_end_matches('/').to_string(),
            tls,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.backend, DEFAULT_BACKEND);
        assert!(cfg.dist.ends_with("frontend/dist"));
        assert_eq!(cfg.tls, None);
    }

    #[test]
    fn overrides_and_trailing_slash() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("FORMADMIN_BIND", "127.0.0.1:9000"),
            ("FORMADMIN_BACKEND", "https://api.ecole.tn/"),
            ("FORMADMIN_DIST", "/srv/formadmin"),
            ("FORMADMIN_TLS_CERT", "certs/cert.pem"),
            ("FORMADMIN_TLS_KEY", "certs/key.pem"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:9000");
        assert_eq!(cfg.backend, "https://api.ecole.tn");
        assert_eq!(cfg.dist, PathBuf::from("/srv/formadmin"));
        assert_eq!(
            cfg.tls,
            Some(Tls { cert: "certs/cert.pem".into(), key: "certs/key.pem".into() })
        );
    }

    #[test]
    fn half_tls_config_is_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[("FORMADMIN_TLS_CERT", "c.pem")])).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[("FORMADMIN_BIND", "  ")])).unwrap();
        assert_eq!(cfg.bind, DEFAULT_BIND);
    }

    #[test]
    fn backend_must_be_http() {
        let env = lookup(&[("FORMADMIN_BACKEND", "localhost:3000")]);
        assert!(ServerConfig::from_lookup(env).is_err());
    }
}
