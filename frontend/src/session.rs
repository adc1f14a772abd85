use std::rc::Rc;

use yew::prelude::*;

use crate::api::{Api, HttpApi};
use crate::config;
use crate::error::ApiError;
use crate::storage::{BrowserStore, TokenStore};

/* ---------------- propriétaire unique du jeton ---------------- */

/// Seul point de lecture, d'écriture et d'effacement du jeton porteur.
#[derive(Clone)]
pub struct AuthSession {
    store: Rc<dyn TokenStore>,
}

impl AuthSession {
    pub fn new(store: Rc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn sign_in(&self, token: &str) -> Result<(), ApiError> {
        self.store.save(token)
    }

    pub fn sign_out(&self) {
        self.store.clear();
    }
}

impl PartialEq for AuthSession {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

/* ---------------- services injectés dans l'arbre ---------------- */

#[derive(Clone)]
pub struct Services {
    pub api: Rc<dyn Api>,
    pub auth: AuthSession,
}

impl Services {
    pub fn browser() -> Self {
        let auth = AuthSession::new(Rc::new(BrowserStore::new(config::TOKEN_KEY)));
        let api = Rc::new(HttpApi::new(config::API_BASE, auth.clone()));
        Self { api, auth }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.api, &other.api) && self.auth == other.auth
    }
}

/* ---------------- hook pratique -------------------- */
#[hook]
pub fn use_services() -> Services {
    use_context::<Services>().expect("ServicesProvider manquant")
}

/* -------------- props du provider ----------------- */
#[derive(Properties, PartialEq)]
pub struct ServicesProviderProps {
    #[prop_or_default]
    pub children: Children,
}

/* -------------- provider global ------------------- */
#[function_component(ServicesProvider)]
pub fn services_provider(props: &ServicesProviderProps) -> Html {
    let services = use_state(Services::browser);

    html! {
        <ContextProvider<Services> context={(*services).clone()}>
            { for props.children.iter() }
        </ContextProvider<Services>>
    }
}
