use thiserror::Error;

/// Échec d'un appel à l'API, quelle que soit la façon dont le backend le signale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("erreur réseau : {0}")]
    Network(String),
    /// Statut HTTP hors 2xx.
    #[error("HTTP {status} : {}", .message.as_deref().unwrap_or("sans message"))]
    Http { status: u16, message: Option<String> },
    /// Réponse 2xx portant `success: false`.
    #[error("requête refusée : {}", .message.as_deref().unwrap_or("sans message"))]
    Rejected { message: Option<String> },
    #[error("réponse illisible : {0}")]
    Decode(String),
    #[error("stockage indisponible : {0}")]
    Storage(String),
}

impl ApiError {
    /// Message fourni par le serveur, s'il y en a un.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } | ApiError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Texte à afficher : message du serveur tel quel, sinon `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(err: gloo_net::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Erreurs détectées localement, avant tout appel réseau.
///
/// Le `Display` est le message montré à l'utilisateur.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("La date de début doit être antérieure à la date de fin.")]
    DateOrder,
    #[error("Date invalide : « {0} ».")]
    InvalidDate(String),
    #[error("Le champ « {0} » est obligatoire.")]
    MissingField(&'static str),
    #[error("Veuillez sélectionner un coordinateur.")]
    MissingCoordinator,
    #[error("Veuillez sélectionner au moins un formateur.")]
    NoTrainerSelected,
    #[error("Veuillez entrer votre ancien mot de passe pour le changer.")]
    MissingOldPassword,
}
