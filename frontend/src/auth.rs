use log::{info, warn};
use web_sys::HtmlInputElement;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::models::{Credentials, User};
use crate::session::{use_services, AuthSession};

pub const SESSION_EXPIRED: &str = "Session expirée ou invalide. Veuillez vous reconnecter.";
pub const REGISTERED: &str =
    "Inscription réussie. Veuillez contacter l'administrateur pour l'activation.";
pub const LOGIN_FAILED: &str = "Échec de la connexion. Veuillez réessayer.";

/* -------------------------------------------------------------------------- */
/*                         états de la porte d'entrée                         */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthState {
    Loading,
    SignedIn(User),
    SignedOut { screen: Screen, notice: Option<Notice> },
}

impl AuthState {
    pub fn login(notice: Option<Notice>) -> Self {
        AuthState::SignedOut { screen: Screen::Login, notice }
    }

    pub fn register() -> Self {
        AuthState::SignedOut { screen: Screen::Register, notice: None }
    }

    /// Retour à la connexion après une inscription acceptée.
    pub fn registered() -> Self {
        Self::login(Some(Notice::Info(REGISTERED.into())))
    }
}

/* -------------------------------------------------------------------------- */
/*                                transitions                                 */
/* -------------------------------------------------------------------------- */

/// Résout l'utilisateur courant à partir du jeton stocké.
///
/// Un jeton refusé est effacé et l'écran de connexion affiche l'invite à se
/// reconnecter.
pub async fn resolve(api: &dyn Api, auth: &AuthSession) -> AuthState {
    if !auth.is_signed_in() {
        return AuthState::login(None);
    }
    match api.current_user().await {
        Ok(user) => {
            info!("session ouverte pour {} ({})", user.email, user.role);
            AuthState::SignedIn(user)
        }
        Err(e) => {
            warn!("jeton invalide ou expiré : {e}");
            auth.sign_out();
            AuthState::login(Some(Notice::Error(SESSION_EXPIRED.into())))
        }
    }
}

/// Connexion : le jeton n'est stocké qu'en cas de succès.
///
/// `Err` porte le message à afficher sur l'écran de connexion.
pub async fn sign_in(
    api: &dyn Api,
    auth: &AuthSession,
    credentials: &Credentials,
) -> Result<AuthState, String> {
    let token = api
        .login(credentials)
        .await
        .map_err(|e| e.user_message(LOGIN_FAILED))?;
    auth.sign_in(&token).map_err(|e| e.to_string())?;
    Ok(resolve(api, auth).await)
}

/// Déconnexion synchrone : jeton et état utilisateur disparaissent ensemble.
pub fn sign_out(auth: &AuthSession) -> AuthState {
    auth.sign_out();
    AuthState::login(None)
}

/* -------------------------------------------------------------------------- */
/*                               composant login                              */
/* -------------------------------------------------------------------------- */

#[derive(Properties, PartialEq)]
pub struct LoginFormProps {
    pub on_success: Callback<AuthState>,
    pub on_register: Callback<()>,
}

#[function_component(LoginForm)]
pub fn login_form(props: &LoginFormProps) -> Html {
    let services      = use_services();
    let email_ref     = use_node_ref();
    let password_ref  = use_node_ref();
    let error         = use_state(|| None::<String>);
    let loading       = use_state(|| false);

    /* ------------------ callback du <form onsubmit=…> --------------------- */
    let onsubmit = {
        let email_ref    = email_ref.clone();
        let password_ref = password_ref.clone();
        let error        = error.clone();
        let loading      = loading.clone();
        let on_success   = props.on_success.clone();

        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();

            let value_of = |r: &NodeRef| {
                r.cast::<HtmlInputElement>().map(|i| i.value()).unwrap_or_default()
            };
            let credentials = Credentials {
                email: value_of(&email_ref),
                password: value_of(&password_ref),
            };

            error.set(None);
            loading.set(true);

            let services   = services.clone();
            let error      = error.clone();
            let loading    = loading.clone();
            let on_success = on_success.clone();
            spawn_local(async move {
                let outcome = sign_in(&*services.api, &services.auth, &credentials).await;
                loading.set(false);
                match outcome {
                    Ok(state) => on_success.emit(state),
                    Err(msg) => {
                        warn!("échec de connexion pour {}", credentials.email);
                        error.set(Some(msg));
                    }
                }
            });
        })
    };

    let on_register = {
        let cb = props.on_register.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            cb.emit(());
        })
    };

    /* ---------------------------- rendu ---------------------------------- */
    html! {
        <div class="login-container">
            <h2>{"Connexion"}</h2>

            <form {onsubmit}>
                if let Some(msg) = &*error {
                    <p class="error-message">{ msg }</p>
                }
                <div>
                    <label for="email">{"Email :"}</label>
                    <input id="email" ref={email_ref} type="email"
                        required=true disabled={*loading} />
                </div>
                <div>
                    <label for="password">{"Mot de passe :"}</label>
                    <input id="password" ref={password_ref} type="password"
                        required=true disabled={*loading} />
                </div>
                <button type="submit" disabled={*loading}>
                    { if *loading { "Connexion en cours..." } else { "Se connecter" } }
                </button>
            </form>

            <p class="switch-screen">
                {"Pas encore de compte ? "}
                <a href="#" onclick={on_register}>{"S'inscrire ici"}</a>
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::Role;
    use crate::testing::{memory_session, user, Call, FakeApi};
    use futures::executor::block_on;

    fn creds() -> Credentials {
        Credentials { email: "admin@ecole.tn".into(), password: "secret".into() }
    }

    #[test]
    fn no_token_means_login_screen() {
        let api = FakeApi::default();
        let auth = memory_session();
        assert_eq!(block_on(resolve(&api, &auth)), AuthState::login(None));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn valid_token_resolves_the_user() {
        let api = FakeApi::default();
        *api.current.borrow_mut() = Some(user(1, Role::Admin, true));
        let auth = memory_session();
        auth.sign_in("tok").unwrap();

        let state = block_on(resolve(&api, &auth));
        assert_eq!(state, AuthState::SignedIn(user(1, Role::Admin, true)));
        assert_eq!(auth.token().as_deref(), Some("tok"));
    }

    #[test]
    fn rejected_token_is_cleared_with_expiry_notice() {
        let api = FakeApi::default();
        let auth = memory_session();
        auth.sign_in("expired").unwrap();

        let state = block_on(resolve(&api, &auth));
        assert_eq!(state, AuthState::login(Some(Notice::Error(SESSION_EXPIRED.into()))));
        assert_eq!(auth.token(), None);
        assert_eq!(api.calls(), vec![Call::CurrentUser]);
    }

    #[test]
    fn inactive_account_message_is_shown_and_no_token_stored() {
        let api = FakeApi::default();
        api.fail("login", ApiError::Rejected { message: Some("Compte inactif".into()) });
        let auth = memory_session();

        let outcome = block_on(sign_in(&api, &auth, &creds()));
        assert_eq!(outcome, Err("Compte inactif".to_string()));
        assert_eq!(auth.token(), None);
        assert_eq!(api.calls(), vec![Call::Login("admin@ecole.tn".into())]);
    }

    #[test]
    fn network_failure_falls_back_to_generic_message() {
        let api = FakeApi::default();
        api.fail("login", ApiError::Network("offline".into()));
        let outcome = block_on(sign_in(&api, &memory_session(), &creds()));
        assert_eq!(outcome, Err(LOGIN_FAILED.to_string()));
    }

    #[test]
    fn successful_login_stores_token_and_signs_in() {
        let api = FakeApi::default();
        *api.token.borrow_mut() = Some("jwt-123".into());
        *api.current.borrow_mut() = Some(user(4, Role::Comptable, true));
        let auth = memory_session();

        let state = block_on(sign_in(&api, &auth, &creds())).unwrap();
        assert_eq!(state, AuthState::SignedIn(user(4, Role::Comptable, true)));
        assert_eq!(auth.token().as_deref(), Some("jwt-123"));
        assert_eq!(api.calls(), vec![Call::Login("admin@ecole.tn".into()), Call::CurrentUser]);
    }

    #[test]
    fn logout_clears_token_synchronously() {
        let auth = memory_session();
        auth.sign_in("tok").unwrap();
        assert_eq!(sign_out(&auth), AuthState::login(None));
        assert!(!auth.is_signed_in());
    }

    #[test]
    fn registration_returns_to_login_with_info() {
        assert_eq!(
            AuthState::registered(),
            AuthState::SignedOut {
                screen: Screen::Login,
                notice: Some(Notice::Info(REGISTERED.into())),
            }
        );
    }
}
