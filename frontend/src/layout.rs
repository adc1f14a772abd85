use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::auth::{self, AuthState, LoginForm, Notice, Screen};
use crate::dashboard::DashboardPage;
use crate::models::User;
use crate::register::RegisterForm;
use crate::session::use_services;

fn notice_html(notice: &Option<Notice>) -> Html {
    match notice {
        Some(Notice::Info(msg)) => html!(<p class="info-message">{ msg }</p>),
        Some(Notice::Error(msg)) => html!(<p class="error-message">{ msg }</p>),
        None => html!(),
    }
}

/// Porte d'entrée : connexion, inscription ou tableau de bord du rôle.
#[function_component(AppShell)]
pub fn app_shell() -> Html {
    let services = use_services();
    let state    = use_state(|| AuthState::Loading);

    /* ------------ résolution du jeton stocké (au montage) ---------------- */
    {
        let state    = state.clone();
        let services = services.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                state.set(auth::resolve(&*services.api, &services.auth).await);
            });
            || ()
        });
    }

    let set_state = {
        let state = state.clone();
        Callback::from(move |next: AuthState| state.set(next))
    };

    let on_register = {
        let state = state.clone();
        Callback::from(move |_: ()| state.set(AuthState::register()))
    };

    let on_register_done = {
        let state = state.clone();
        Callback::from(move |registered: bool| {
            state.set(if registered { AuthState::registered() } else { AuthState::login(None) })
        })
    };

    let on_logout = {
        let state = state.clone();
        let auth  = services.auth.clone();
        Callback::from(move |_: ()| state.set(auth::sign_out(&auth)))
    };

    let on_user_update = {
        let state = state.clone();
        Callback::from(move |user: User| state.set(AuthState::SignedIn(user)))
    };

    /* ---------------- rendu conditionnel ------------------------------- */
    match &*state {
        AuthState::Loading => html!(<p>{"Chargement…"}</p>),
        AuthState::SignedOut { screen: Screen::Login, notice } => html! {
            <div class="auth-page">
                { notice_html(notice) }
                <LoginForm on_success={set_state} {on_register} />
            </div>
        },
        AuthState::SignedOut { screen: Screen::Register, notice } => html! {
            <div class="auth-page">
                { notice_html(notice) }
                <RegisterForm on_complete={on_register_done} />
            </div>
        },
        AuthState::SignedIn(user) => html! {
            <DashboardPage user={user.clone()} {on_logout} {on_user_update} />
        },
    }
}
