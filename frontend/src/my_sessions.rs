use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::models::{Role, Session, User};
use crate::session::use_services;

const LOAD_FAILED: &str = "Erreur lors du chargement de vos sessions.";

/// Sessions où l'utilisateur est coordinateur ou formateur affecté.
pub fn owned_by(user: &User, sessions: Vec<Session>) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|s| match user.role {
            Role::Coordinateur => s.id_coordinateur == Some(user.id),
            Role::Formateur => s.has_trainer(user.id),
            _ => false,
        })
        .collect()
}

pub async fn fetch_own(api: &dyn Api, user: &User) -> Result<Vec<Session>, String> {
    match api.list_sessions().await {
        Ok(all) => {
            let mine = owned_by(user, all);
            info!("{} sessions pour {}", mine.len(), user.email);
            Ok(mine)
        }
        Err(e) => {
            error!("sessions de {} : {e}", user.email);
            Err(e.user_message(LOAD_FAILED))
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct MySessionsProps {
    pub user: User,
}

#[function_component(MySessions)]
pub fn my_sessions(props: &MySessionsProps) -> Html {
    let services = use_services();
    let sessions = use_state(Vec::<Session>::new);
    let error    = use_state(|| None::<String>);
    let loading  = use_state(|| true);

    {
        let sessions = sessions.clone();
        let error    = error.clone();
        let loading  = loading.clone();
        let api      = services.api.clone();
        let user     = props.user.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_own(&*api, &user).await {
                    Ok(list) => sessions.set(list),
                    Err(msg) => error.set(Some(msg)),
                }
                loading.set(false);
            });
            || ()
        });
    }

    if *loading {
        return html!(<p>{"Chargement de vos sessions..."}</p>);
    }

    html! {
        <div class="view-content">
            <h2>{ format!("Mes sessions ({})", sessions.len()) }</h2>
            if let Some(msg) = &*error {
                <p class="error-message">{ msg }</p>
            }
            if sessions.is_empty() && error.is_none() {
                <p>{"Aucune session ne vous est attribuée."}</p>
            } else {
                <table class="sessions-table">
                    <thead>
                        <tr>
                            <th>{"Promotion"}</th>
                            <th>{"Classe"}</th>
                            <th>{"Spécialité"}</th>
                            <th>{"Niveau"}</th>
                            <th>{"Semestre"}</th>
                            <th>{"Période"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for sessions.iter().map(|s| html! {
                            <tr key={s.id}>
                                <td>{ &s.promotion }</td>
                                <td>{ &s.classe }</td>
                                <td>{ &s.specialite }</td>
                                <td>{ s.niveau.as_str() }</td>
                                <td>{ s.semestre.as_str() }</td>
                                <td>{ s.period() }</td>
                            </tr>
                        }) }
                    </tbody>
                </table>
            }
        </div>
    }
}
