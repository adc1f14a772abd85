use std::rc::Rc;

use log::{error, info};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::models::{Role, StatusChange, User};
use crate::session::use_services;

const LOAD_FAILED: &str = "Erreur lors du chargement des utilisateurs.";

/* -------------------------------------------------------------------------- */
/*                      états partagés & helpers front                        */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserFilter {
    All,
    /// Comptes inactifs, en attente d'activation.
    Pending,
    Active,
}

impl UserFilter {
    fn keeps(self, user: &User) -> bool {
        match self {
            UserFilter::All => true,
            UserFilter::Pending => !user.est_actif,
            UserFilter::Active => user.est_actif,
        }
    }

    fn title(self) -> &'static str {
        match self {
            UserFilter::All => "Tous les utilisateurs",
            UserFilter::Pending => "Utilisateurs en attente",
            UserFilter::Active => "Utilisateurs actifs",
        }
    }
}

/// Boutons activés sur une ligne.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowControls {
    pub toggle: bool,
    pub delete: bool,
}

/// Résultat d'une requête, appliqué à l'état courant du tableau.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectoryAction {
    Loaded(Result<Vec<User>, String>),
    StatusChanged { user_id: i64, est_actif: bool, message: String },
    Removed { user_id: i64, message: String },
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserDirectory {
    pub actor: User,
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub status_message: Option<String>,
}

impl UserDirectory {
    pub fn new(actor: User) -> Self {
        Self { actor, users: Vec::new(), loading: true, error: None, status_message: None }
    }

    /// Seul un ADMIN modifie ou supprime ; les comptables consultent.
    pub fn can_manage(&self) -> bool {
        self.actor.role == Role::Admin
    }

    /// `None` quand la colonne Actions n'est pas affichée.
    pub fn controls(&self, row: &User) -> Option<RowControls> {
        if !self.can_manage() {
            return None;
        }
        let own_row = row.id == self.actor.id;
        Some(RowControls { toggle: !own_row, delete: !own_row })
    }

    pub fn visible(&self, filter: UserFilter) -> Vec<&User> {
        self.users.iter().filter(|u| filter.keeps(u)).collect()
    }

    fn row(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn toggle_prompt(&self, user_id: i64) -> Option<String> {
        let row = self.row(user_id)?;
        let verb = if row.est_actif { "DÉSACTIVER" } else { "ACTIVER" };
        Some(format!("Voulez-vous vraiment {verb} cet utilisateur ?"))
    }

    pub fn delete_prompt(&self, user_id: i64) -> Option<String> {
        let row = self.row(user_id)?;
        Some(format!(
            "Êtes-vous sûr de vouloir SUPPRIMER l'utilisateur {} ? \
             Cette action est irréversible.",
            row.full_name()
        ))
    }

    /* ------------------------------ réducteur ------------------------------- */

    /// Applique un résultat serveur à l'état courant, pas à celui du départ de la requête.
    pub fn apply(&mut self, action: DirectoryAction) {
        match action {
            DirectoryAction::Loaded(Ok(users)) => {
                self.users = users;
                self.error = None;
                self.status_message = None;
                self.loading = false;
            }
            DirectoryAction::Loaded(Err(message)) => {
                self.users.clear();
                self.error = Some(message);
                self.status_message = None;
                self.loading = false;
            }
            DirectoryAction::StatusChanged { user_id, est_actif, message } => {
                if let Some(u) = self.users.iter_mut().find(|u| u.id == user_id) {
                    u.est_actif = est_actif;
                }
                self.status_message = Some(message);
            }
            DirectoryAction::Removed { user_id, message } => {
                self.users.retain(|u| u.id != user_id);
                self.status_message = Some(message);
            }
            DirectoryAction::Failed(message) => {
                self.status_message = None;
                self.error = Some(message);
            }
        }
    }

    /* ------------------------------ requêtes -------------------------------- */

    pub async fn fetch_users(api: &dyn Api) -> DirectoryAction {
        match api.list_users().await {
            Ok(users) => {
                info!("{} utilisateurs chargés", users.len());
                DirectoryAction::Loaded(Ok(users))
            }
            Err(e) => {
                error!("users: {e}");
                DirectoryAction::Loaded(Err(e.user_message(LOAD_FAILED)))
            }
        }
    }

    /// Inverse `est_actif` ; `None` si la ligne n'est pas modifiable.
    pub async fn request_toggle(&self, api: &dyn Api, user_id: i64) -> Option<DirectoryAction> {
        let row = self.row(user_id)?;
        if !self.controls(row).is_some_and(|c| c.toggle) {
            return None;
        }

        let change = StatusChange { user_id, est_actif: !row.est_actif };
        let action = match api.update_status(&change).await {
            Ok(patch) => {
                let who = row.merged(&patch).full_name();
                DirectoryAction::StatusChanged {
                    user_id,
                    est_actif: patch.est_actif.unwrap_or(change.est_actif),
                    message: format!("Statut de {who} mis à jour."),
                }
            }
            Err(e) => {
                error!("status {user_id}: {e}");
                DirectoryAction::Failed(e.user_message("Échec de la mise à jour du statut."))
            }
        };
        Some(action)
    }

    pub async fn request_delete(&self, api: &dyn Api, user_id: i64) -> Option<DirectoryAction> {
        let row = self.row(user_id)?;
        if !self.controls(row).is_some_and(|c| c.delete) {
            return None;
        }

        let action = match api.delete_user(user_id).await {
            Ok(()) => DirectoryAction::Removed {
                user_id,
                message: format!("Utilisateur {} supprimé avec succès.", row.full_name()),
            },
            Err(e) => {
                error!("delete {user_id}: {e}");
                let message = e.user_message("Échec de la suppression de l'utilisateur.");
                DirectoryAction::Failed(message)
            }
        };
        Some(action)
    }

    /* ------------------------ requête puis application ----------------------- */

    pub async fn load(mut self, api: &dyn Api) -> Self {
        let action = Self::fetch_users(api).await;
        self.apply(action);
        self
    }

    /// Corrige la ligne localement, sans recharger.
    pub async fn toggle_status(mut self, api: &dyn Api, user_id: i64) -> Self {
        let action = self.request_toggle(api, user_id).await;
        if let Some(action) = action {
            self.apply(action);
        }
        self
    }

    /// Retire la ligne localement.
    pub async fn delete(mut self, api: &dyn Api, user_id: i64) -> Self {
        let action = self.request_delete(api, user_id).await;
        if let Some(action) = action {
            self.apply(action);
        }
        self
    }
}

impl Reducible for UserDirectory {
    type Action = DirectoryAction;

    fn reduce(self: Rc<Self>, action: DirectoryAction) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/* -------------------------------------------------------------------------- */
/*                             composant principal                            */
/* -------------------------------------------------------------------------- */

#[derive(Properties, PartialEq)]
pub struct ManageUsersProps {
    pub actor: User,
    pub filter: UserFilter,
}

#[function_component(ManageUsers)]
pub fn manage_users(props: &ManageUsersProps) -> Html {
    let services  = use_services();
    let directory = use_reducer(|| UserDirectory::new(props.actor.clone()));

    /* -------------- chargement initial -------------- */
    {
        let dispatcher = directory.dispatcher();
        let api = services.api.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                dispatcher.dispatch(UserDirectory::fetch_users(&*api).await);
            });
            || ()
        });
    }

    /* -------------- handlers -------------- */

    let on_toggle = {
        let directory = directory.clone();
        let api = services.api.clone();
        Callback::from(move |uid: i64| {
            let Some(prompt) = directory.toggle_prompt(uid) else {
                return;
            };
            if !gloo_dialogs::confirm(&prompt) {
                return;
            }
            let snapshot   = (*directory).clone();
            let dispatcher = directory.dispatcher();
            let api        = api.clone();
            spawn_local(async move {
                if let Some(action) = snapshot.request_toggle(&*api, uid).await {
                    dispatcher.dispatch(action);
                }
            });
        })
    };

    let on_delete = {
        let directory = directory.clone();
        let api = services.api.clone();
        Callback::from(move |uid: i64| {
            let Some(prompt) = directory.delete_prompt(uid) else {
                return;
            };
            if !gloo_dialogs::confirm(&prompt) {
                return;
            }
            let snapshot   = (*directory).clone();
            let dispatcher = directory.dispatcher();
            let api        = api.clone();
            spawn_local(async move {
                if let Some(action) = snapshot.request_delete(&*api, uid).await {
                    dispatcher.dispatch(action);
                }
            });
        })
    };

    /* ---------------------- rendu ---------------------- */
    if directory.loading {
        return html!(<p>{"Chargement de tous les utilisateurs..."}</p>);
    }

    let rows   = directory.visible(props.filter);
    let manage = directory.can_manage();
    let on_row = |cb: &Callback<i64>, uid: i64| {
        let cb = cb.clone();
        Callback::from(move |_: MouseEvent| cb.emit(uid))
    };

    html! {
        <div class="view-content">
            <h2>{ format!("{} ({})", props.filter.title(), rows.len()) }</h2>
            <p>
                {"Accès : administrateurs et comptables. "}
                {"Modification et suppression : administrateurs uniquement."}
            </p>

            if let Some(msg) = &directory.status_message {
                <p class="success-message">{ msg }</p>
            }
            if let Some(msg) = &directory.error {
                <p class="error-message">{ msg }</p>
            }

            <table class="users-table">
                <thead>
                    <tr>
                        <th>{"ID"}</th>
                        <th>{"Nom & Prénom"}</th>
                        <th>{"Email"}</th>
                        <th>{"Rôle"}</th>
                        <th>{"Statut"}</th>
                        if manage { <th>{"Actions"}</th> }
                    </tr>
                </thead>
                <tbody>
                    { for rows.into_iter().map(|u| {
                        let (status_class, status_label) = if u.est_actif {
                            ("status active", "Actif")
                        } else {
                            ("status inactive", "Inactif")
                        };
                        let toggle_class = if u.est_actif {
                            "deactivate-button"
                        } else {
                            "activate-button"
                        };
                        let actions = directory.controls(u).map(|c| {
                            let toggle = on_row(&on_toggle, u.id);
                            let delete = on_row(&on_delete, u.id);
                            html! {
                                <td>
                                    <button
                                        class={toggle_class}
                                        disabled={!c.toggle}
                                        onclick={toggle}
                                    >
                                        { if u.est_actif { "Désactiver" } else { "Activer" } }
                                    </button>
                                    <button
                                        class="delete-button"
                                        disabled={!c.delete}
                                        onclick={delete}
                                    >
                                        {"Supprimer"}
                                    </button>
                                </td>
                            }
                        });
                        html! {
                            <tr key={u.id}>
                                <td>{ u.id }</td>
                                <td>{ u.full_name() }</td>
                                <td>{ &u.email }</td>
                                <td>
                                    <span class={u.role.badge_class()}>{ u.role.as_str() }</span>
                                </td>
                                <td><span class={status_class}>{ status_label }</span></td>
                                { for actions }
                            </tr>
                        }
                    }) }
                </tbody>
            </table>
        </div>
    }
}
