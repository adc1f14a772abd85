//! Constantes de configuration, figées à la compilation.

use log::LevelFilter;

/// Préfixe commun de l'API REST (servi derrière le proxy `/api`).
pub const API_BASE: &str = match option_env!("FORMADMIN_API_BASE") {
    Some(base) => base,
    None => "/api",
};

/// Clé du jeton dans le `localStorage`.
pub const TOKEN_KEY: &str = "jwtToken";

/// Niveau de log de la console (`FORMADMIN_LOG=debug trunk build`).
pub fn log_level() -> LevelFilter {
    option_env!("FORMADMIN_LOG")
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
