//! Persistance du jeton d'authentification.

use gloo::storage::{LocalStorage, Storage};
use log::warn;

use crate::error::ApiError;

pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<(), ApiError>;
    fn clear(&self);
}

/// `localStorage` du navigateur, valeur brute (pas d'encodage JSON).
pub struct BrowserStore {
    key: &'static str,
}

impl BrowserStore {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl TokenStore for BrowserStore {
    fn load(&self) -> Option<String> {
        LocalStorage::raw()
            .get_item(self.key)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }

    fn save(&self, token: &str) -> Result<(), ApiError> {
        LocalStorage::raw()
            .set_item(self.key, token)
            .map_err(|e| ApiError::Storage(format!("{e:?}")))
    }

    fn clear(&self) {
        if let Err(e) = LocalStorage::raw().remove_item(self.key) {
            warn!("suppression du jeton impossible : {e:?}");
        }
    }
}
