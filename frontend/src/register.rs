use gloo_timers::callback::Timeout;
use log::{error, info};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::error::ValidationError;
use crate::models::{Registration, Role};
use crate::session::use_services;

pub const REGISTER_FAILED: &str = "Erreur lors de l'inscription. Vérifiez les données.";

/// Délai d'affichage du panneau de succès avant retour à la connexion.
const REDIRECT_MS: u32 = 3_000;

/* ---------------- validation locale ---------------- */

pub fn validate(form: &Registration) -> Result<(), ValidationError> {
    let required = [
        ("Nom", &form.nom),
        ("Prénom", &form.prenom),
        ("Email", &form.email),
        ("Mot de passe", &form.password),
        ("N° CIN", &form.n_cin),
        ("RIB", &form.rib),
        ("Banque", &form.banque),
    ];
    match required.iter().find(|(_, v)| v.trim().is_empty()) {
        Some((label, _)) => Err(ValidationError::MissingField(*label)),
        None => Ok(()),
    }
}

/// Envoie l'inscription ; `Err` porte le message à afficher.
pub async fn submit(api: &dyn Api, form: &Registration) -> Result<(), String> {
    validate(form).map_err(|e| e.to_string())?;
    match api.register(form).await {
        Ok(reply) => {
            info!("inscription de {} : {}", form.email, reply.message.unwrap_or_default());
            Ok(())
        }
        Err(e) => {
            error!("inscription : {e}");
            Err(e.user_message(REGISTER_FAILED))
        }
    }
}

/* ---------------- composant ---------------- */

#[derive(Properties, PartialEq)]
pub struct RegisterFormProps {
    /// Appelé après le panneau de succès, ou via « Se connecter ».
    pub on_complete: Callback<bool>,
}

#[function_component(RegisterForm)]
pub fn register_form(props: &RegisterFormProps) -> Html {
    let services = use_services();
    let form     = use_state(|| Registration { role: Role::Admin, ..Registration::default() });
    let error    = use_state(|| None::<String>);
    let loading  = use_state(|| false);
    let success  = use_state(|| false);

    /* ------- retour automatique après succès ------- */
    {
        let on_complete = props.on_complete.clone();
        use_effect_with(*success, move |done| {
            let timer = done.then(|| Timeout::new(REDIRECT_MS, move || on_complete.emit(true)));
            move || drop(timer)
        });
    }

    let field = |apply: fn(&mut Registration, String)| {
        let form = form.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*form).clone();
            apply(&mut next, input.value());
            form.set(next);
        })
    };

    let on_role = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let mut next = (*form).clone();
            next.role = Role::from(select.value());
            form.set(next);
        })
    };

    let onsubmit = {
        let services = services.clone();
        let form     = form.clone();
        let error    = error.clone();
        let loading  = loading.clone();
        let success  = success.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            error.set(None);
            loading.set(true);

            let api      = services.api.clone();
            let payload  = (*form).clone();
            let error    = error.clone();
            let loading  = loading.clone();
            let success  = success.clone();
            spawn_local(async move {
                let outcome = submit(&*api, &payload).await;
                loading.set(false);
                match outcome {
                    Ok(()) => success.set(true),
                    Err(msg) => error.set(Some(msg)),
                }
            });
        })
    };

    let back_to_login = {
        let cb = props.on_complete.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            cb.emit(false);
        })
    };

    if *success {
        return html! {
            <div class="success-container">
                <h2>{"Inscription réussie"}</h2>
                <p>
                    {"Votre compte a été créé. "}
                    {"Il est en attente d'activation par un administrateur."}
                </p>
                <p>{"Redirection vers la page de connexion..."}</p>
            </div>
        };
    }

    html! {
        <div class="register-container">
            <h2>{"Inscription"}</h2>
            if let Some(msg) = &*error {
                <p class="error-message">{ msg }</p>
            }
            <form {onsubmit} class="register-form">
                <input type="text" placeholder="Nom" value={form.nom.clone()}
                    oninput={field(|f, v| f.nom = v)} required=true />
                <input type="text" placeholder="Prénom" value={form.prenom.clone()}
                    oninput={field(|f, v| f.prenom = v)} required=true />
                <input type="email" placeholder="Email" value={form.email.clone()}
                    oninput={field(|f, v| f.email = v)} required=true />
                <input type="password" placeholder="Mot de passe" value={form.password.clone()}
                    oninput={field(|f, v| f.password = v)} required=true />
                <input type="text" placeholder="N° CIN" value={form.n_cin.clone()}
                    oninput={field(|f, v| f.n_cin = v)} required=true />
                <input type="text" placeholder="RIB" value={form.rib.clone()}
                    oninput={field(|f, v| f.rib = v)} required=true />
                <input type="text" placeholder="Nom de la banque" value={form.banque.clone()}
                    oninput={field(|f, v| f.banque = v)} required=true />

                <label for="role">{"Sélectionnez le rôle :"}</label>
                <select id="role" onchange={on_role} required=true>
                    { for Role::ASSIGNABLE.iter().map(|r| html! {
                        <option value={r.as_str().to_string()} selected={&form.role == r}>
                            { r.as_str() }
                        </option>
                    }) }
                </select>

                <button type="submit" disabled={*loading}>
                    { if *loading { "Enregistrement en cours..." } else { "S'inscrire" } }
                </button>
            </form>
            <p class="switch-screen">
                {"Déjà un compte ? "}
                <a href="#" onclick={back_to_login}>{"Se connecter"}</a>
            </p>
        </div>
    }
}
