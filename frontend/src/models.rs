//! Structures échangées avec l'API (noms de champs alignés sur le backend).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/*                                   rôles                                    */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Comptable,
    Coordinateur,
    Formateur,
    /// Rôle inconnu du front : on garde le libellé brut.
    Other(String),
    #[default]
    Unknown,
}

impl Role {
    /// Rôles proposés à l'inscription.
    pub const ASSIGNABLE: [Role; 4] =
        [Role::Admin, Role::Comptable, Role::Formateur, Role::Coordinateur];

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Comptable => "COMPTABLE",
            Role::Coordinateur => "COORDINATEUR",
            Role::Formateur => "FORMATEUR",
            Role::Other(raw) => raw,
            Role::Unknown => "",
        }
    }

    /// Classe CSS du badge de rôle.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Role::Admin => "badge role-admin",
            Role::Comptable => "badge role-comptable",
            Role::Coordinateur => "badge role-coordinateur",
            Role::Formateur => "badge role-formateur",
            _ => "badge role-other",
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ADMIN" => Role::Admin,
            "COMPTABLE" => Role::Comptable,
            "COORDINATEUR" => Role::Coordinateur,
            "FORMATEUR" => Role::Formateur,
            "" => Role::Unknown,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/*                                utilisateurs                                */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    #[serde(default)]
    pub rib: String,
    #[serde(default)]
    pub banque: String,
    #[serde(default)]
    pub n_cin: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserWire")]
pub struct User {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub role: Role,
    pub est_actif: bool,
    #[serde(rename = "coordonneesBancaires", skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
}

/// Forme reçue : `id`, ou `sub` quand le backend renvoie la charge utile du JWT.
#[derive(Deserialize)]
struct UserWire {
    id: Option<i64>,
    sub: Option<i64>,
    #[serde(default)]
    nom: String,
    #[serde(default)]
    prenom: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    est_actif: bool,
    #[serde(rename = "coordonneesBancaires", default)]
    bank: Option<BankDetails>,
}

impl TryFrom<UserWire> for User {
    type Error = String;

    fn try_from(wire: UserWire) -> Result<Self, Self::Error> {
        let id = wire.id.or(wire.sub).ok_or("utilisateur sans `id` ni `sub`")?;
        Ok(User {
            id,
            nom: wire.nom,
            prenom: wire.prenom,
            email: wire.email,
            role: wire.role,
            est_actif: wire.est_actif,
            bank: wire.bank,
        })
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom)
    }

    pub fn rib(&self) -> &str {
        self.bank.as_ref().map(|b| b.rib.as_str()).unwrap_or("")
    }

    pub fn banque(&self) -> &str {
        self.bank.as_ref().map(|b| b.banque.as_str()).unwrap_or("")
    }

    pub fn n_cin(&self) -> &str {
        self.bank.as_ref().map(|b| b.n_cin.as_str()).unwrap_or("")
    }

    /// Fusionne une réponse partielle du backend dans l'utilisateur courant.
    ///
    /// Les champs absents de la réponse sont conservés ; les coordonnées
    /// bancaires sont fusionnées champ par champ, qu'elles arrivent imbriquées
    /// (`coordonneesBancaires`) ou à plat (`rib`, `banque`).
    pub fn merged(&self, patch: &UserPatch) -> User {
        let mut next = self.clone();
        if let Some(v) = &patch.nom {
            next.nom = v.clone();
        }
        if let Some(v) = &patch.prenom {
            next.prenom = v.clone();
        }
        if let Some(v) = &patch.email {
            next.email = v.clone();
        }
        if let Some(v) = &patch.role {
            next.role = v.clone();
        }
        if let Some(v) = patch.est_actif {
            next.est_actif = v;
        }

        let nested = patch.bank.clone().unwrap_or_default();
        let rib = nested.rib.or_else(|| patch.rib.clone());
        let banque = nested.banque.or_else(|| patch.banque.clone());
        let n_cin = nested.n_cin.or_else(|| patch.n_cin.clone());

        if rib.is_some() || banque.is_some() || n_cin.is_some() {
            let bank = next.bank.get_or_insert_with(BankDetails::default);
            if let Some(v) = rib {
                bank.rib = v;
            }
            if let Some(v) = banque {
                bank.banque = v;
            }
            if let Some(v) = n_cin {
                bank.n_cin = v;
            }
        }
        next
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BankPatch {
    pub rib: Option<String>,
    pub banque: Option<String>,
    pub n_cin: Option<String>,
}

/// Réponse partielle de `PUT /users/me` et de `PUT /users/status`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub est_actif: Option<bool>,
    #[serde(rename = "coordonneesBancaires")]
    pub bank: Option<BankPatch>,
    pub rib: Option<String>,
    pub banque: Option<String>,
    pub n_cin: Option<String>,
}

/* -------------------------------------------------------------------------- */
/*                         authentification / profil                          */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub password: String,
    pub n_cin: String,
    pub rib: String,
    pub banque: String,
    pub role: Role,
}

/// Seul le message est lu ; l'utilisateur créé n'est pas exploité.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterReply {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rib: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banque: Option<String>,
    #[serde(rename = "oldPassword", skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProfileUpdate::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub est_actif: bool,
}

/* -------------------------------------------------------------------------- */
/*                                  sessions                                  */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Niveau {
    #[default]
    Licence,
    Master,
}

impl Niveau {
    pub const ALL: [Niveau; 2] = [Niveau::Licence, Niveau::Master];

    pub fn as_str(self) -> &'static str {
        match self {
            Niveau::Licence => "Licence",
            Niveau::Master => "Master",
        }
    }
}

impl FromStr for Niveau {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Niveau::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("niveau inconnu : {s}"))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semestre {
    S1,
    S2,
    S3,
    S4,
    #[default]
    S5,
    S6,
}

impl Semestre {
    pub const ALL: [Semestre; 6] = [
        Semestre::S1,
        Semestre::S2,
        Semestre::S3,
        Semestre::S4,
        Semestre::S5,
        Semestre::S6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Semestre::S1 => "S1",
            Semestre::S2 => "S2",
            Semestre::S3 => "S3",
            Semestre::S4 => "S4",
            Semestre::S5 => "S5",
            Semestre::S6 => "S6",
        }
    }
}

impl FromStr for Semestre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Semestre::ALL
            .into_iter()
            .find(|sem| sem.as_str() == s)
            .ok_or_else(|| format!("semestre inconnu : {s}"))
    }
}

/// Formateur affecté à une session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTrainer {
    pub id_formateur: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formateur: Option<User>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    #[serde(default)]
    pub promotion: String,
    #[serde(default)]
    pub classe: String,
    #[serde(default)]
    pub specialite: String,
    #[serde(default)]
    pub niveau: Niveau,
    #[serde(default)]
    pub semestre: Semestre,
    #[serde(default)]
    pub date_debut: String,
    #[serde(default)]
    pub date_fin: String,
    #[serde(default)]
    pub id_coordinateur: Option<i64>,
    #[serde(rename = "sessionFormateurs", default)]
    pub trainers: Vec<SessionTrainer>,
}

impl Session {
    pub fn trainer_ids(&self) -> Vec<i64> {
        self.trainers.iter().map(|t| t.id_formateur).collect()
    }

    pub fn has_trainer(&self, user_id: i64) -> bool {
        self.trainers.iter().any(|t| t.id_formateur == user_id)
    }

    /// Période affichée, `AAAA-MM-JJ au AAAA-MM-JJ`.
    pub fn period(&self) -> String {
        format!("{} au {}", day_part(&self.date_debut), day_part(&self.date_fin))
    }
}

/// Partie date d'un horodatage ISO (`2024-09-01T00:00:00.000Z` → `2024-09-01`).
pub fn day_part(raw: &str) -> &str {
    raw.split('T').next().unwrap_or(raw)
}

/// Corps de `POST /sessions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewSession {
    pub promotion: String,
    pub classe: String,
    pub specialite: String,
    pub niveau: Niveau,
    pub semestre: Semestre,
    pub date_debut: String,
    pub date_fin: String,
    pub id_coordinateur: i64,
}

/// Corps de `PATCH /sessions/:id` : uniquement les champs modifiés.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau: Option<Niveau>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semestre: Option<Semestre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_debut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_fin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_coordinateur: Option<i64>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self == &SessionPatch::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrainerAssignment {
    #[serde(rename = "formateurIds")]
    pub formateur_ids: Vec<i64>,
}
