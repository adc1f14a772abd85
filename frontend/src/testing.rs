//! Doublures de test : stockage mémoire et backend en mémoire.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::Api;
use crate::error::ApiError;
use crate::models::*;
use crate::session::AuthSession;
use crate::storage::TokenStore;

#[derive(Default)]
pub struct MemoryStore {
    token: RefCell<Option<String>>,
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

pub fn memory_session() -> AuthSession {
    AuthSession::new(Rc::new(MemoryStore::default()))
}

/// Appels reçus par le faux backend, dans l'ordre.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Login(String),
    Register(String),
    CurrentUser,
    UpdateProfile(ProfileUpdate),
    ListUsers,
    UpdateStatus(StatusChange),
    DeleteUser(i64),
    ListSessions,
    CreateSession(NewSession),
    UpdateSession(i64, SessionPatch),
    DeleteSession(i64),
    AssignTrainers(i64, Vec<i64>),
}

#[derive(Default)]
pub struct FakeApi {
    pub users: RefCell<Vec<User>>,
    pub sessions: RefCell<Vec<Session>>,
    pub calls: RefCell<Vec<Call>>,
    /// Échec à renvoyer au prochain appel de l'opération nommée.
    failures: RefCell<HashMap<&'static str, ApiError>>,
    pub token: RefCell<Option<String>>,
    pub current: RefCell<Option<User>>,
    pub profile_reply: RefCell<UserPatch>,
}

impl FakeApi {
    pub fn with_users(users: Vec<User>) -> Self {
        let api = Self::default();
        *api.users.borrow_mut() = users;
        api
    }

    pub fn with_sessions(self, sessions: Vec<Session>) -> Self {
        *self.sessions.borrow_mut() = sessions;
        self
    }

    pub fn fail(&self, op: &'static str, err: ApiError) {
        self.failures.borrow_mut().insert(op, err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Appels hors lectures de listes.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListUsers | Call::ListSessions | Call::CurrentUser))
            .collect()
    }

    fn record(&self, op: &'static str, call: Call) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(call);
        match self.failures.borrow_mut().remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn session(&self, id: i64) -> Result<Session, ApiError> {
        self.sessions
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ApiError::Http { status: 404, message: Some("Session introuvable".into()) })
    }
}

#[async_trait(?Send)]
impl Api for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        self.record("login", Call::Login(credentials.email.clone()))?;
        self.token
            .borrow()
            .clone()
            .ok_or(ApiError::Rejected { message: Some("Identifiants invalides".into()) })
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterReply, ApiError> {
        self.record("register", Call::Register(registration.email.clone()))?;
        Ok(RegisterReply { message: Some("Utilisateur créé".into()) })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.record("current_user", Call::CurrentUser)?;
        self.current
            .borrow()
            .clone()
            .ok_or(ApiError::Http { status: 401, message: Some("Unauthorized".into()) })
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserPatch, ApiError> {
        self.record("update_profile", Call::UpdateProfile(update.clone()))?;
        Ok(self.profile_reply.borrow().clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("list_users", Call::ListUsers)?;
        Ok(self.users.borrow().clone())
    }

    /// Répond comme le backend : seul le nouveau statut est renvoyé.
    async fn update_status(&self, change: &StatusChange) -> Result<UserPatch, ApiError> {
        self.record("update_status", Call::UpdateStatus(*change))?;
        let mut users = self.users.borrow_mut();
        let user = users
            .iter_mut()
            .find(|u| u.id == change.user_id)
            .ok_or(ApiError::Http { status: 404, message: None })?;
        user.est_actif = change.est_actif;
        Ok(UserPatch { est_actif: Some(change.est_actif), ..UserPatch::default() })
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.record("delete_user", Call::DeleteUser(user_id))?;
        self.users.borrow_mut().retain(|u| u.id != user_id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.record("list_sessions", Call::ListSessions)?;
        Ok(self.sessions.borrow().clone())
    }

    async fn create_session(&self, new: &NewSession) -> Result<(), ApiError> {
        self.record("create_session", Call::CreateSession(new.clone()))?;
        let id = self.sessions.borrow().iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let created = Session {
            id,
            promotion: new.promotion.clone(),
            classe: new.classe.clone(),
            specialite: new.specialite.clone(),
            niveau: new.niveau,
            semestre: new.semestre,
            date_debut: new.date_debut.clone(),
            date_fin: new.date_fin.clone(),
            id_coordinateur: Some(new.id_coordinateur),
            trainers: Vec::new(),
        };
        self.sessions.borrow_mut().push(created);
        Ok(())
    }

    async fn update_session(
        &self,
        session_id: i64,
        patch: &SessionPatch,
    ) -> Result<(), ApiError> {
        self.record("update_session", Call::UpdateSession(session_id, patch.clone()))?;
        let mut s = self.session(session_id)?;
        s.promotion = patch.promotion.clone().unwrap_or(s.promotion);
        s.classe = patch.classe.clone().unwrap_or(s.classe);
        s.specialite = patch.specialite.clone().unwrap_or(s.specialite);
        s.niveau = patch.niveau.unwrap_or(s.niveau);
        s.semestre = patch.semestre.unwrap_or(s.semestre);
        s.date_debut = patch.date_debut.clone().unwrap_or(s.date_debut);
        s.date_fin = patch.date_fin.clone().unwrap_or(s.date_fin);
        s.id_coordinateur = patch.id_coordinateur.or(s.id_coordinateur);
        self.replace(s);
        Ok(())
    }

    async fn delete_session(&self, session_id: i64) -> Result<(), ApiError> {
        self.record("delete_session", Call::DeleteSession(session_id))?;
        self.sessions.borrow_mut().retain(|s| s.id != session_id);
        Ok(())
    }

    async fn assign_trainers(
        &self,
        session_id: i64,
        assignment: &TrainerAssignment,
    ) -> Result<(), ApiError> {
        let ids = assignment.formateur_ids.clone();
        self.record("assign_trainers", Call::AssignTrainers(session_id, ids.clone()))?;
        let mut s = self.session(session_id)?;
        s.trainers = ids
            .into_iter()
            .map(|id_formateur| SessionTrainer { id_formateur, formateur: None })
            .collect();
        self.replace(s);
        Ok(())
    }
}

impl FakeApi {
    fn replace(&self, session: Session) {
        if let Some(slot) = self.sessions.borrow_mut().iter_mut().find(|s| s.id == session.id) {
            *slot = session;
        }
    }
}

/* ---------------- fixtures ---------------- */

pub fn user(id: i64, role: Role, est_actif: bool) -> User {
    User {
        id,
        nom: format!("Nom{id}"),
        prenom: format!("Prenom{id}"),
        email: format!("user{id}@ecole.tn"),
        role,
        est_actif,
        bank: None,
    }
}

pub fn session(id: i64, coordinator: i64, trainers: &[i64]) -> Session {
    Session {
        id,
        promotion: format!("P202{id}"),
        classe: "L3-A".into(),
        specialite: "Informatique".into(),
        niveau: Niveau::Licence,
        semestre: Semestre::S5,
        date_debut: "2024-09-01T00:00:00.000Z".into(),
        date_fin: "2025-01-31T00:00:00.000Z".into(),
        id_coordinateur: Some(coordinator),
        trainers: trainers
            .iter()
            .map(|&id_formateur| SessionTrainer { id_formateur, formateur: None })
            .collect(),
    }
}
