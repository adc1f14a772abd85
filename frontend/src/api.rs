use async_trait::async_trait;
use gloo_net::http::{Method, Request};
use log::{debug, error};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{
    Credentials, LoginReply, NewSession, ProfileUpdate, RegisterReply, Registration, Role, Session,
    SessionPatch, StatusChange, TrainerAssignment, User, UserPatch,
};
use crate::session::AuthSession;

/* -------------------------------------------------------------------------- */
/*                          contrat d'accès au backend                        */
/* -------------------------------------------------------------------------- */

/// Une méthode par opération du backend. Aucun cache, aucune relance.
#[async_trait(?Send)]
pub trait Api {
    /// Renvoie le jeton porteur.
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<RegisterReply, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserPatch, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    /// Réponse partielle : seuls les champs renvoyés sont connus.
    async fn update_status(&self, change: &StatusChange) -> Result<UserPatch, ApiError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), ApiError>;

    // Les mutations de sessions sont suivies d'un rechargement : leur corps
    // de réponse n'est pas lu.
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError>;
    async fn create_session(&self, session: &NewSession) -> Result<(), ApiError>;
    async fn update_session(
        &self,
        session_id: i64,
        patch: &SessionPatch,
    ) -> Result<(), ApiError>;
    async fn delete_session(&self, session_id: i64) -> Result<(), ApiError>;
    async fn assign_trainers(
        &self,
        session_id: i64,
        assignment: &TrainerAssignment,
    ) -> Result<(), ApiError>;

    /// Filtre côté client sur la liste complète.
    async fn users_by_role(&self, role: &Role) -> Result<Vec<User>, ApiError> {
        let users = self.list_users().await?;
        Ok(users.into_iter().filter(|u| &u.role == role).collect())
    }
}

/* -------------------------------------------------------------------------- */
/*                      normalisation des réponses                            */
/* -------------------------------------------------------------------------- */

/// Ramène statut HTTP et `success: false` à un seul signal d'échec.
pub fn normalize(status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed = serde_json::from_str::<Value>(body).ok();

    if !(200..300).contains(&status) {
        return Err(ApiError::Http {
            status,
            message: parsed.as_ref().and_then(server_message),
        });
    }

    let value = match parsed {
        Some(v) => v,
        None if body.trim().is_empty() => Value::Null,
        None => return Err(ApiError::Decode(format!("corps non JSON ({} octets)", body.len()))),
    };

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected { message: server_message(&value) });
    }
    Ok(value)
}

/* `message` peut être une chaîne ou une liste (erreurs de validation) */
fn server_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(" ; "))
        }
        _ => None,
    }
}

/// `GET /users/current-user` répond `{ user: {...} }` ou l'utilisateur nu.
pub fn unwrap_user(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            map.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<U: DeserializeOwned>(value: Value) -> Result<U, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Réponse partielle d'une mise à jour d'utilisateur ; un corps vide vaut « rien de changé ».
pub fn patch_reply(body: Value) -> Result<UserPatch, ApiError> {
    match unwrap_user(body) {
        Value::Null => Ok(UserPatch::default()),
        other => decode(other),
    }
}

/* -------------------------------------------------------------------------- */
/*                          implémentation HTTP                               */
/* -------------------------------------------------------------------------- */

pub struct HttpApi {
    base: String,
    auth: AuthSession,
}

impl HttpApi {
    pub fn new(base: impl Into<String>, auth: AuthSession) -> Self {
        Self { base: base.into(), auth }
    }

    /* Appel JSON générique ; le jeton est relu à chaque requête */
    async fn call<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        authenticated: bool,
    ) -> Result<Value, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base);
        let builder = match method {
            Method::POST => Request::post(&url),
            Method::PUT => Request::put(&url),
            Method::PATCH => Request::patch(&url),
            Method::DELETE => Request::delete(&url),
            _ => Request::get(&url),
        };

        let builder = match (authenticated, self.auth.token()) {
            (true, Some(token)) => builder.header("Authorization", &format!("Bearer {token}")),
            _ => builder,
        };

        let resp = match body {
            Some(b) => builder.json(b)?.send().await,
            None => builder.send().await,
        }
        .inspect_err(|e| error!("{method} {path} : {e}"))?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!("{method} {path} -> {status}");

        normalize(status, &text).inspect_err(|e| error!("{method} {path} : {e}"))
    }

    async fn fetch<T, U>(&self, method: Method, path: &str, body: Option<&T>) -> Result<U, ApiError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        decode(self.call(method, path, body, true).await?)
    }
}

#[async_trait(?Send)]
impl Api for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let body = self.call(Method::POST, "/users/auth/login", Some(credentials), false).await?;
        let reply: LoginReply = decode(body)?;
        reply
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Rejected { message: reply.message })
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterReply, ApiError> {
        let path = "/users/auth/register";
        let body = self.call(Method::POST, path, Some(registration), false).await?;
        decode(body)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let body = self.call::<()>(Method::GET, "/users/current-user", None, true).await?;
        decode(unwrap_user(body))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserPatch, ApiError> {
        let body = self.call(Method::PUT, "/users/me", Some(update), true).await?;
        patch_reply(body)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch::<(), _>(Method::GET, "/users", None).await
    }

    async fn update_status(&self, change: &StatusChange) -> Result<UserPatch, ApiError> {
        let body = self.call(Method::PUT, "/users/status", Some(change), true).await?;
        patch_reply(body)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.call::<()>(Method::DELETE, &format!("/users/{user_id}"), None, true).await?;
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.fetch::<(), _>(Method::GET, "/sessions", None).await
    }

    async fn create_session(&self, session: &NewSession) -> Result<(), ApiError> {
        self.call(Method::POST, "/sessions", Some(session), true).await?;
        Ok(())
    }

    async fn update_session(
        &self,
        session_id: i64,
        patch: &SessionPatch,
    ) -> Result<(), ApiError> {
        let path = format!("/sessions/{session_id}");
        self.call(Method::PATCH, &path, Some(patch), true).await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: i64) -> Result<(), ApiError> {
        self.call::<()>(Method::DELETE, &format!("/sessions/{session_id}"), None, true).await?;
        Ok(())
    }

    async fn assign_trainers(
        &self,
        session_id: i64,
        assignment: &TrainerAssignment,
    ) -> Result<(), ApiError> {
        let path = format!("/sessions/{session_id}/affecter-formateurs");
        self.call(Method::POST, &path, Some(assignment), true).await?;
        Ok(())
    }
}
