use std::rc::Rc;

use chrono::NaiveDate;
use log::{error, info, warn};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::error::ValidationError;
use crate::models::{
    day_part, Niveau, NewSession, Role, Semestre, Session, SessionPatch, TrainerAssignment, User,
};
use crate::session::use_services;

const LOAD_FAILED: &str = "Erreur lors du chargement des sessions.";
const SAVE_FAILED: &str = "Erreur lors de l'enregistrement de la session.";
const DELETE_FAILED: &str = "Erreur lors de la suppression de la session.";
const ASSIGN_FAILED: &str = "Erreur lors de l'affectation des formateurs.";
const NOTHING_CHANGED: &str = "Aucune modification à sauvegarder.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/* -------------------------------------------------------------------------- */
/*                           formulaire de session                            */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionForm {
    pub promotion: String,
    pub classe: String,
    pub specialite: String,
    pub niveau: Niveau,
    pub semestre: Semestre,
    /// `AAAA-MM-JJ`, valeur d'un `<input type="date">`.
    pub date_debut: String,
    pub date_fin: String,
    pub id_coordinateur: Option<i64>,
}

fn parse_day(raw: &str, label: &'static str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField(label));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// `Some(v)` si `v` est renseigné et diffère de l'original.
fn changed(value: &str, original: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && value != original).then(|| value.to_string())
}

impl SessionForm {
    pub fn blank(coordinator: Option<i64>) -> Self {
        Self { id_coordinateur: coordinator, ..Self::default() }
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            promotion: session.promotion.clone(),
            classe: session.classe.clone(),
            specialite: session.specialite.clone(),
            niveau: session.niveau,
            semestre: session.semestre,
            date_debut: day_part(&session.date_debut).to_string(),
            date_fin: day_part(&session.date_fin).to_string(),
            id_coordinateur: session.id_coordinateur,
        }
    }

    /// Dates lisibles, début strictement avant fin, coordinateur choisi.
    pub fn validate(&self) -> Result<i64, ValidationError> {
        let debut = parse_day(&self.date_debut, "Date de début")?;
        let fin = parse_day(&self.date_fin, "Date de fin")?;
        if debut >= fin {
            return Err(ValidationError::DateOrder);
        }
        self.id_coordinateur.ok_or(ValidationError::MissingCoordinator)
    }

    pub fn to_new(&self) -> Result<NewSession, ValidationError> {
        let required = [
            ("Promotion", &self.promotion),
            ("Classe", &self.classe),
            ("Spécialité", &self.specialite),
        ];
        if let Some((label, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::MissingField(*label));
        }
        let id_coordinateur = self.validate()?;
        Ok(NewSession {
            promotion: self.promotion.trim().to_string(),
            classe: self.classe.trim().to_string(),
            specialite: self.specialite.trim().to_string(),
            niveau: self.niveau,
            semestre: self.semestre,
            date_debut: self.date_debut.trim().to_string(),
            date_fin: self.date_fin.trim().to_string(),
            id_coordinateur,
        })
    }

    /// Seuls les champs renseignés et modifiés partent dans le PATCH.
    pub fn to_patch(&self, original: &Session) -> Result<SessionPatch, ValidationError> {
        let id_coordinateur = self.validate()?;
        let coordinator_changed = Some(id_coordinateur) != original.id_coordinateur;
        Ok(SessionPatch {
            promotion: changed(&self.promotion, &original.promotion),
            classe: changed(&self.classe, &original.classe),
            specialite: changed(&self.specialite, &original.specialite),
            niveau: (self.niveau != original.niveau).then_some(self.niveau),
            semestre: (self.semestre != original.semestre).then_some(self.semestre),
            date_debut: changed(&self.date_debut, day_part(&original.date_debut)),
            date_fin: changed(&self.date_fin, day_part(&original.date_fin)),
            id_coordinateur: coordinator_changed.then_some(id_coordinateur),
        })
    }
}

/* -------------------------------------------------------------------------- */
/*                                  modales                                   */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq)]
pub enum EditorMode {
    Create,
    Edit(Session),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Editor {
    pub mode: EditorMode,
    pub form: SessionForm,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignDialog {
    pub session: Session,
    pub selected: Vec<i64>,
    pub error: Option<String>,
}

impl AssignDialog {
    pub fn toggle(&mut self, trainer_id: i64) {
        match self.selected.iter().position(|&id| id == trainer_id) {
            Some(pos) => {
                self.selected.remove(pos);
            }
            None => self.selected.push(trainer_id),
        }
    }

    pub fn is_selected(&self, trainer_id: i64) -> bool {
        self.selected.contains(&trainer_id)
    }
}

/* -------------------------------------------------------------------------- */
/*                               état de la vue                               */
/* -------------------------------------------------------------------------- */

/// Résultat appliqué à l'état courant du tableau.
pub enum BoardAction {
    /// Retouche synchrone : modales, champs du formulaire.
    Edit(Box<dyn FnOnce(&mut SessionBoard)>),
    Loaded {
        coordinators: Result<Vec<User>, String>,
        trainers: Result<Vec<User>, String>,
        sessions: Result<Vec<Session>, String>,
    },
    Saved { message: String, sessions: Result<Vec<Session>, String> },
    Removed { message: String, sessions: Result<Vec<Session>, String> },
    Assigned { message: String, sessions: Result<Vec<Session>, String> },
    EditorError(String),
    AssignError(String),
    /// Erreur serveur, routée vers la modale ouverte ou le bandeau.
    Failed(String),
}

impl BoardAction {
    pub fn edit(apply: impl FnOnce(&mut SessionBoard) + 'static) -> Self {
        BoardAction::Edit(Box::new(apply))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionBoard {
    pub sessions: Vec<Session>,
    pub coordinators: Vec<User>,
    pub trainers: Vec<User>,
    pub loading: bool,
    /// Bandeau de page, utilisé quand aucune modale n'est ouverte.
    pub error: Option<String>,
    pub message: Option<String>,
    pub editor: Option<Editor>,
    pub assign: Option<AssignDialog>,
}

impl SessionBoard {
    pub fn new() -> Self {
        Self { loading: true, ..Self::default() }
    }

    /* ------------------------------ réducteur ------------------------------- */

    /// Applique un résultat à l'état courant, modales ouvertes entre-temps comprises.
    pub fn apply(&mut self, action: BoardAction) {
        match action {
            BoardAction::Edit(edit) => edit(self),
            BoardAction::Loaded { coordinators, trainers, sessions } => {
                self.error = None;
                match coordinators {
                    Ok(list) => self.coordinators = list,
                    Err(msg) => self.error = Some(msg),
                }
                match trainers {
                    Ok(list) => self.trainers = list,
                    Err(msg) => self.error = Some(msg),
                }
                self.take_sessions(sessions);
            }
            BoardAction::Saved { message, sessions } => {
                self.editor = None;
                self.message = Some(message);
                self.take_sessions(sessions);
            }
            BoardAction::Removed { message, sessions } => {
                self.error = None;
                self.message = Some(message);
                self.take_sessions(sessions);
            }
            BoardAction::Assigned { message, sessions } => {
                self.assign = None;
                self.message = Some(message);
                self.take_sessions(sessions);
            }
            BoardAction::EditorError(msg) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.error = Some(msg);
                }
            }
            BoardAction::AssignError(msg) => {
                if let Some(dialog) = self.assign.as_mut() {
                    dialog.error = Some(msg);
                }
            }
            BoardAction::Failed(msg) => {
                self.message = None;
                self.report(msg);
            }
        }
    }

    fn take_sessions(&mut self, sessions: Result<Vec<Session>, String>) {
        match sessions {
            Ok(list) => self.sessions = list,
            Err(msg) => self.error = Some(msg),
        }
        self.loading = false;
    }

    /// Erreur serveur : dans la modale ouverte, sinon dans le bandeau.
    fn report(&mut self, msg: String) {
        if let Some(editor) = self.editor.as_mut() {
            editor.error = Some(msg);
        } else if let Some(dialog) = self.assign.as_mut() {
            dialog.error = Some(msg);
        } else {
            self.error = Some(msg);
        }
    }

    /* ------------------------------ chargement ------------------------------ */

    pub async fn fetch_all(api: &dyn Api) -> BoardAction {
        let coordinators = api.users_by_role(&Role::Coordinateur).await.map_err(|e| {
            error!("coordinateurs : {e}");
            e.user_message(LOAD_FAILED)
        });
        let trainers = api.users_by_role(&Role::Formateur).await.map_err(|e| {
            error!("formateurs : {e}");
            e.user_message(LOAD_FAILED)
        });
        let sessions = Self::fetch_sessions(api).await;
        BoardAction::Loaded { coordinators, trainers, sessions }
    }

    /// Recharge la liste des sessions ; appelé après chaque mutation.
    async fn fetch_sessions(api: &dyn Api) -> Result<Vec<Session>, String> {
        match api.list_sessions().await {
            Ok(list) => {
                info!("{} sessions chargées", list.len());
                Ok(list)
            }
            Err(e) => {
                error!("sessions : {e}");
                Err(e.user_message(LOAD_FAILED))
            }
        }
    }

    pub async fn load(mut self, api: &dyn Api) -> Self {
        self.loading = true;
        let action = Self::fetch_all(api).await;
        self.apply(action);
        self
    }

    fn session(&self, session_id: i64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn coordinator_name(&self, session: &Session) -> String {
        match session.id_coordinateur {
            Some(id) => self
                .coordinators
                .iter()
                .find(|c| c.id == id)
                .map(User::full_name)
                .unwrap_or_else(|| format!("ID: {id}")),
            None => "-".into(),
        }
    }

    pub fn trainer_names(&self, session: &Session) -> String {
        let names: Vec<String> = session
            .trainers
            .iter()
            .map(|t| match &t.formateur {
                Some(u) => u.full_name(),
                None => self
                    .trainers
                    .iter()
                    .find(|u| u.id == t.id_formateur)
                    .map(User::full_name)
                    .unwrap_or_else(|| format!("ID: {}", t.id_formateur)),
            })
            .collect();
        if names.is_empty() { "Aucun".into() } else { names.join(", ") }
    }

    /* ------------------------------- édition -------------------------------- */

    pub fn open_create(&mut self) {
        self.message = None;
        let first = self.coordinators.first().map(|c| c.id);
        self.editor = Some(Editor {
            mode: EditorMode::Create,
            form: SessionForm::blank(first),
            error: None,
        });
    }

    pub fn open_edit(&mut self, session_id: i64) {
        self.message = None;
        if let Some(s) = self.session(session_id).cloned() {
            let form = SessionForm::from_session(&s);
            self.editor = Some(Editor { mode: EditorMode::Edit(s), form, error: None });
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub fn edit_field(&mut self, apply: impl FnOnce(&mut SessionForm)) {
        if let Some(editor) = self.editor.as_mut() {
            apply(&mut editor.form);
        }
    }

    /// Sans coordinateur disponible, impossible de soumettre.
    pub fn can_submit(&self) -> bool {
        self.editor.is_some() && !self.coordinators.is_empty()
    }

    /// `None` quand aucune modale n'est soumissible.
    pub async fn request_submit(&self, api: &dyn Api) -> Option<BoardAction> {
        let editor = self.editor.as_ref()?;
        if !self.can_submit() {
            return None;
        }

        let outcome = match &editor.mode {
            EditorMode::Create => match editor.form.to_new() {
                Err(e) => Err(e.to_string()),
                Ok(new) => api
                    .create_session(&new)
                    .await
                    .map(|()| "Session créée avec succès !".to_string())
                    .map_err(|e| {
                        error!("création de session : {e}");
                        e.user_message(SAVE_FAILED)
                    }),
            },
            EditorMode::Edit(original) => match editor.form.to_patch(original) {
                Err(e) => Err(e.to_string()),
                Ok(patch) if patch.is_empty() => Err(NOTHING_CHANGED.to_string()),
                Ok(patch) => api
                    .update_session(original.id, &patch)
                    .await
                    .map(|()| "Session modifiée avec succès !".to_string())
                    .map_err(|e| {
                        error!("session {} : {e}", original.id);
                        e.user_message(SAVE_FAILED)
                    }),
            },
        };

        let action = match outcome {
            Ok(message) => {
                let sessions = Self::fetch_sessions(api).await;
                BoardAction::Saved { message, sessions }
            }
            Err(msg) => {
                warn!("session non enregistrée : {msg}");
                BoardAction::EditorError(msg)
            }
        };
        Some(action)
    }

    pub async fn submit(mut self, api: &dyn Api) -> Self {
        let action = self.request_submit(api).await;
        if let Some(action) = action {
            self.apply(action);
        }
        self
    }

    /* ------------------------------ suppression ----------------------------- */

    pub fn delete_prompt(&self, session_id: i64) -> Option<String> {
        let s = self.session(session_id)?;
        Some(format!("Voulez-vous vraiment supprimer la session \"{}\" ?", s.promotion))
    }

    /// La ligne ne disparaît qu'au rechargement qui suit la confirmation serveur.
    pub async fn request_delete(&self, api: &dyn Api, session_id: i64) -> Option<BoardAction> {
        let promotion = &self.session(session_id)?.promotion;
        let action = match api.delete_session(session_id).await {
            Ok(()) => BoardAction::Removed {
                message: format!("Session \"{promotion}\" supprimée avec succès."),
                sessions: Self::fetch_sessions(api).await,
            },
            Err(e) => {
                error!("suppression de la session {session_id} : {e}");
                BoardAction::Failed(e.user_message(DELETE_FAILED))
            }
        };
        Some(action)
    }

    pub async fn delete(mut self, api: &dyn Api, session_id: i64) -> Self {
        let action = self.request_delete(api, session_id).await;
        if let Some(action) = action {
            self.apply(action);
        }
        self
    }

    /* ------------------------------ affectation ----------------------------- */

    pub fn open_assign(&mut self, session_id: i64) {
        self.message = None;
        if let Some(s) = self.session(session_id).cloned() {
            let selected = s.trainer_ids();
            self.assign = Some(AssignDialog { session: s, selected, error: None });
        }
    }

    pub fn close_assign(&mut self) {
        self.assign = None;
    }

    pub fn toggle_trainer(&mut self, trainer_id: i64) {
        if let Some(dialog) = self.assign.as_mut() {
            dialog.toggle(trainer_id);
        }
    }

    /// Remplace l'ensemble des formateurs de la session en un seul appel.
    pub async fn request_assignment(&self, api: &dyn Api) -> Option<BoardAction> {
        let dialog = self.assign.as_ref()?;
        if dialog.selected.is_empty() {
            let msg = ValidationError::NoTrainerSelected.to_string();
            return Some(BoardAction::AssignError(msg));
        }

        let session = &dialog.session;
        let assignment = TrainerAssignment { formateur_ids: dialog.selected.clone() };
        let action = match api.assign_trainers(session.id, &assignment).await {
            Ok(()) => BoardAction::Assigned {
                message: format!(
                    "Affectation des formateurs à la session {} réussie !",
                    session.promotion
                ),
                sessions: Self::fetch_sessions(api).await,
            },
            Err(e) => {
                error!("affectation session {} : {e}", session.id);
                BoardAction::Failed(e.user_message(ASSIGN_FAILED))
            }
        };
        Some(action)
    }

    pub async fn submit_assignment(mut self, api: &dyn Api) -> Self {
        let action = self.request_assignment(api).await;
        if let Some(action) = action {
            self.apply(action);
        }
        self
    }
}

impl Reducible for SessionBoard {
    type Action = BoardAction;

    fn reduce(self: Rc<Self>, action: BoardAction) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/* -------------------------------------------------------------------------- */
/*                             composant principal                            */
/* -------------------------------------------------------------------------- */

#[function_component(ManageSessions)]
pub fn manage_sessions() -> Html {
    let services = use_services();
    let board    = use_reducer(SessionBoard::new);

    /* -------------- chargement initial -------------- */
    {
        let dispatcher = board.dispatcher();
        let api = services.api.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                dispatcher.dispatch(SessionBoard::fetch_all(&*api).await);
            });
            || ()
        });
    }

    // Mutation synchrone de l'état local.
    let local = |apply: fn(&mut SessionBoard)| {
        let dispatcher = board.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(BoardAction::edit(apply)))
    };

    let by_id = |apply: fn(&mut SessionBoard, i64)| {
        let dispatcher = board.dispatcher();
        Callback::from(move |id: i64| {
            dispatcher.dispatch(BoardAction::edit(move |b| apply(b, id)));
        })
    };

    let text_field = {
        let dispatcher = board.dispatcher();
        move |apply: fn(&mut SessionForm, String)| {
            let dispatcher = dispatcher.clone();
            Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                let value = input.value();
                dispatcher.dispatch(BoardAction::edit(move |b| b.edit_field(|f| apply(f, value))));
            })
        }
    };

    let select_field = {
        let dispatcher = board.dispatcher();
        move |apply: fn(&mut SessionForm, String)| {
            let dispatcher = dispatcher.clone();
            Callback::from(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                let value = select.value();
                dispatcher.dispatch(BoardAction::edit(move |b| b.edit_field(|f| apply(f, value))));
            })
        }
    };

    let on_create         = local(|b| b.open_create());
    let on_close_editor   = local(|b| b.close_editor());
    let on_close_assign   = local(|b| b.close_assign());
    let on_edit           = by_id(|b, sid| b.open_edit(sid));
    let on_open_assign    = by_id(|b, sid| b.open_assign(sid));
    let on_toggle_trainer = by_id(|b, tid| b.toggle_trainer(tid));

    let on_submit = {
        let board = board.clone();
        let api = services.api.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let snapshot   = (*board).clone();
            let dispatcher = board.dispatcher();
            let api        = api.clone();
            spawn_local(async move {
                if let Some(action) = snapshot.request_submit(&*api).await {
                    dispatcher.dispatch(action);
                }
            });
        })
    };

    let on_submit_assign = {
        let board = board.clone();
        let api = services.api.clone();
        Callback::from(move |_: MouseEvent| {
            let snapshot   = (*board).clone();
            let dispatcher = board.dispatcher();
            let api        = api.clone();
            spawn_local(async move {
                if let Some(action) = snapshot.request_assignment(&*api).await {
                    dispatcher.dispatch(action);
                }
            });
        })
    };

    let on_delete = {
        let board = board.clone();
        let api = services.api.clone();
        Callback::from(move |sid: i64| {
            let Some(prompt) = board.delete_prompt(sid) else {
                return;
            };
            if !gloo_dialogs::confirm(&prompt) {
                return;
            }
            let snapshot   = (*board).clone();
            let dispatcher = board.dispatcher();
            let api        = api.clone();
            spawn_local(async move {
                if let Some(action) = snapshot.request_delete(&*api, sid).await {
                    dispatcher.dispatch(action);
                }
            });
        })
    };

    /* ---------------------- rendu ---------------------- */
    if board.loading && board.sessions.is_empty() {
        return html!(<p>{"Chargement des sessions..."}</p>);
    }

    let on_row = |cb: &Callback<i64>, id: i64| {
        let cb = cb.clone();
        Callback::from(move |_: MouseEvent| cb.emit(id))
    };

    let editor_html = board.editor.as_ref().map(|editor| {
        let f = &editor.form;
        let title = match editor.mode {
            EditorMode::Create => "Nouvelle session",
            EditorMode::Edit(_) => "Modifier la session",
        };
        let on_niveau = select_field(|f, v| {
            if let Ok(n) = v.parse() {
                f.niveau = n;
            }
        });
        let on_semestre = select_field(|f, v| {
            if let Ok(s) = v.parse() {
                f.semestre = s;
            }
        });
        let on_coordinator = select_field(|f, v| f.id_coordinateur = v.parse().ok());
        html! {
            <div class="modal-overlay">
                <div class="modal">
                    <h3>{ title }</h3>
                    if let Some(msg) = &editor.error {
                        <p class="error-message">{ msg }</p>
                    }
                    <form onsubmit={on_submit.clone()}>
                        <label>{"Promotion"}</label>
                        <input type="text" value={f.promotion.clone()}
                            oninput={text_field(|f, v| f.promotion = v)} />
                        <label>{"Classe"}</label>
                        <input type="text" value={f.classe.clone()}
                            oninput={text_field(|f, v| f.classe = v)} />
                        <label>{"Spécialité"}</label>
                        <input type="text" value={f.specialite.clone()}
                            oninput={text_field(|f, v| f.specialite = v)} />

                        <label>{"Niveau"}</label>
                        <select onchange={on_niveau}>
                            { for Niveau::ALL.iter().map(|n| html! {
                                <option value={n.as_str()} selected={*n == f.niveau}>
                                    { n.as_str() }
                                </option>
                            }) }
                        </select>
                        <label>{"Semestre"}</label>
                        <select onchange={on_semestre}>
                            { for Semestre::ALL.iter().map(|s| html! {
                                <option value={s.as_str()} selected={*s == f.semestre}>
                                    { s.as_str() }
                                </option>
                            }) }
                        </select>

                        <label>{"Date de début"}</label>
                        <input type="date" value={f.date_debut.clone()}
                            oninput={text_field(|f, v| f.date_debut = v)} />
                        <label>{"Date de fin"}</label>
                        <input type="date" value={f.date_fin.clone()}
                            oninput={text_field(|f, v| f.date_fin = v)} />

                        <label>{"Coordinateur"}</label>
                        if board.coordinators.is_empty() {
                            <p class="error-message">{"Aucun coordinateur disponible."}</p>
                        } else {
                            <select onchange={on_coordinator}>
                                { for board.coordinators.iter().map(|c| html! {
                                    <option
                                        value={c.id.to_string()}
                                        selected={f.id_coordinateur == Some(c.id)}
                                    >
                                        { c.full_name() }
                                    </option>
                                }) }
                            </select>
                        }

                        <div class="modal-actions">
                            <button type="submit" disabled={!board.can_submit()}>
                                {"Enregistrer"}
                            </button>
                            <button type="button" onclick={on_close_editor.clone()}>
                                {"Annuler"}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        }
    });

    let assign_html = board.assign.as_ref().map(|dialog| html! {
        <div class="modal-overlay">
            <div class="modal">
                <h3>{ format!("Affecter des formateurs : {}", dialog.session.promotion) }</h3>
                if let Some(msg) = &dialog.error {
                    <p class="error-message">{ msg }</p>
                }
                if board.trainers.is_empty() {
                    <p>{"Aucun formateur disponible."}</p>
                }
                <ul class="trainer-list">
                    { for board.trainers.iter().map(|t| {
                        let tid = t.id;
                        let cb = on_toggle_trainer.clone();
                        html! {
                            <li key={tid}>
                                <label>
                                    <input type="checkbox" checked={dialog.is_selected(tid)}
                                        onchange={Callback::from(move |_: Event| cb.emit(tid))} />
                                    { t.full_name() }
                                </label>
                            </li>
                        }
                    }) }
                </ul>
                <div class="modal-actions">
                    <button onclick={on_submit_assign.clone()}>{"Affecter"}</button>
                    <button onclick={on_close_assign.clone()}>{"Annuler"}</button>
                </div>
            </div>
        </div>
    });

    html! {
        <div class="view-content">
            <h2>{ format!("Gestion des sessions ({})", board.sessions.len()) }</h2>

            if let Some(msg) = &board.message {
                <p class="success-message">{ msg }</p>
            }
            if let Some(msg) = &board.error {
                <p class="error-message">{ msg }</p>
            }

            <button class="create-button" onclick={on_create}>{"Créer une session"}</button>

            <table class="sessions-table">
                <thead>
                    <tr>
                        <th>{"Promotion"}</th>
                        <th>{"Classe"}</th>
                        <th>{"Spécialité"}</th>
                        <th>{"Niveau"}</th>
                        <th>{"Semestre"}</th>
                        <th>{"Période"}</th>
                        <th>{"Coordinateur"}</th>
                        <th>{"Formateurs"}</th>
                        <th>{"Actions"}</th>
                    </tr>
                </thead>
                <tbody>
                    { for board.sessions.iter().map(|s| {
                        let sid    = s.id;
                        let edit   = on_row(&on_edit, sid);
                        let assign = on_row(&on_open_assign, sid);
                        let delete = on_row(&on_delete, sid);
                        html! {
                            <tr key={sid}>
                                <td>{ &s.promotion }</td>
                                <td>{ &s.classe }</td>
                                <td>{ &s.specialite }</td>
                                <td>{ s.niveau.as_str() }</td>
                                <td>{ s.semestre.as_str() }</td>
                                <td>{ s.period() }</td>
                                <td>{ board.coordinator_name(s) }</td>
                                <td>{ board.trainer_names(s) }</td>
                                <td>
                                    <button onclick={edit}>{"Modifier"}</button>
                                    <button onclick={assign}>{"Formateurs"}</button>
                                    <button class="delete-button" onclick={delete}>
                                        {"Supprimer"}
                                    </button>
                                </td>
                            </tr>
                        }
                    }) }
                </tbody>
            </table>

            { for editor_html }
            { for assign_html }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::{session, user, Call, FakeApi};
    use futures::executor::block_on;

    fn backend() -> FakeApi {
        FakeApi::with_users(vec![
            user(1, Role::Comptable, true),
            user(2, Role::Formateur, true),
            user(3, Role::Coordinateur, true),
            user(5, Role::Formateur, true),
        ])
        .with_sessions(vec![session(10, 3, &[]), session(11, 3, &[2])])
    }

    fn loaded(api: &FakeApi) -> SessionBoard {
        block_on(SessionBoard::new().load(api))
    }

    fn dated(debut: &str, fin: &str) -> SessionForm {
        SessionForm {
            promotion: "P2026".into(),
            classe: "M1".into(),
            specialite: "Réseaux".into(),
            date_debut: debut.into(),
            date_fin: fin.into(),
            id_coordinateur: Some(3),
            ..SessionForm::default()
        }
    }

    #[test]
    fn load_splits_coordinators_and_trainers() {
        let board = loaded(&backend());
        assert!(!board.loading);
        assert_eq!(board.sessions.len(), 2);
        assert_eq!(board.coordinators.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(board.trainers.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn create_defaults_to_first_coordinator_licence_s5() {
        let mut board = loaded(&backend());
        board.open_create();
        let form = &board.editor.as_ref().unwrap().form;
        assert_eq!(form.id_coordinateur, Some(3));
        assert_eq!(form.niveau, Niveau::Licence);
        assert_eq!(form.semestre, Semestre::S5);
    }

    #[test]
    fn dates_out_of_order_never_reach_the_server() {
        let api = backend();
        let mut board = loaded(&api);
        board.open_create();
        board.edit_field(|f| *f = dated("2025-02-01", "2025-01-01"));

        let board = block_on(board.submit(&api));
        assert!(api.mutations().is_empty());
        let editor = board.editor.unwrap();
        assert_eq!(editor.error, Some(ValidationError::DateOrder.to_string()));

        assert_eq!(dated("2025-01-01", "2025-01-01").to_new(), Err(ValidationError::DateOrder));
        assert_eq!(
            dated("2025-13-01", "2025-01-01").to_new(),
            Err(ValidationError::InvalidDate("2025-13-01".into()))
        );
    }

    #[test]
    fn create_sends_full_body_then_refetches() {
        let api = backend();
        let mut board = loaded(&api);
        board.open_create();
        board.edit_field(|f| *f = dated("2025-02-01", "2025-06-30"));

        let board = block_on(board.submit(&api));
        assert!(board.editor.is_none());
        assert_eq!(board.message.as_deref(), Some("Session créée avec succès !"));
        assert_eq!(board.sessions.len(), 3);
        match &api.mutations()[..] {
            [Call::CreateSession(new)] => {
                assert_eq!(new.id_coordinateur, 3);
                assert_eq!(new.date_debut, "2025-02-01");
            }
            other => panic!("appels inattendus : {other:?}"),
        }
        assert_eq!(api.calls().last(), Some(&Call::ListSessions));
    }

    #[test]
    fn editing_only_classe_patches_only_classe() {
        let api = backend();
        let mut board = loaded(&api);
        board.open_edit(10);
        assert_eq!(board.editor.as_ref().unwrap().form.date_debut, "2024-09-01");
        board.edit_field(|f| f.classe = "L3-B".into());

        let board = block_on(board.submit(&api));
        let expected = SessionPatch { classe: Some("L3-B".into()), ..SessionPatch::default() };
        assert_eq!(api.mutations(), vec![Call::UpdateSession(10, expected.clone())]);
        assert_eq!(serde_json::to_value(&expected).unwrap(), serde_json::json!({"classe": "L3-B"}));
        assert_eq!(board.message.as_deref(), Some("Session modifiée avec succès !"));
        assert_eq!(board.sessions.iter().find(|s| s.id == 10).unwrap().classe, "L3-B");
    }

    #[test]
    fn cleared_field_is_not_sent() {
        let original = session(10, 3, &[]);
        let mut form = SessionForm::from_session(&original);
        form.specialite.clear();
        form.semestre = Semestre::S6;
        let patch = form.to_patch(&original).unwrap();
        assert_eq!(patch, SessionPatch { semestre: Some(Semestre::S6), ..SessionPatch::default() });
    }

    #[test]
    fn unchanged_edit_sends_nothing() {
        let api = backend();
        let mut board = loaded(&api);
        board.open_edit(10);
        let board = block_on(board.submit(&api));
        assert!(api.mutations().is_empty());
        assert_eq!(board.editor.unwrap().error.as_deref(), Some(NOTHING_CHANGED));
    }

    #[test]
    fn no_coordinator_disables_submit() {
        let api = FakeApi::with_users(vec![user(2, Role::Formateur, true)]);
        let mut board = loaded(&api);
        board.open_create();
        assert!(!board.can_submit());
        board.edit_field(|f| {
            *f = SessionForm { id_coordinateur: None, ..dated("2025-01-01", "2025-02-01") };
        });
        let board = block_on(board.submit(&api));
        assert!(api.mutations().is_empty());
        assert!(board.editor.is_some());
        assert_eq!(
            SessionForm { id_coordinateur: None, ..dated("2025-01-01", "2025-02-01") }.to_new(),
            Err(ValidationError::MissingCoordinator)
        );
    }

    #[test]
    fn server_error_lands_in_the_open_modal() {
        let api = backend();
        let duplicate = Some("Promotion déjà existante".to_string());
        api.fail("create_session", ApiError::Http { status: 400, message: duplicate });
        let mut board = loaded(&api);
        board.open_create();
        board.edit_field(|f| *f = dated("2025-02-01", "2025-06-30"));

        let board = block_on(board.submit(&api));
        assert_eq!(board.editor.unwrap().error.as_deref(), Some("Promotion déjà existante"));
        assert_eq!(board.error, None);
        assert_eq!(board.sessions.len(), 2);
    }

    #[test]
    fn assignment_replaces_the_set_and_is_idempotent() {
        let api = backend();
        let mut board = loaded(&api);

        for _ in 0..2 {
            board.open_assign(10);
            for tid in [2, 5] {
                if !board.assign.as_ref().unwrap().is_selected(tid) {
                    board.toggle_trainer(tid);
                }
            }
            board = block_on(board.submit_assignment(&api));
            let s = board.sessions.iter().find(|s| s.id == 10).unwrap();
            assert_eq!(s.trainer_ids(), vec![2, 5]);
            assert!(board.assign.is_none());
        }
        assert_eq!(
            api.mutations(),
            vec![Call::AssignTrainers(10, vec![2, 5]), Call::AssignTrainers(10, vec![2, 5])]
        );
        assert_eq!(
            board.message.as_deref(),
            Some("Affectation des formateurs à la session P20210 réussie !")
        );
    }

    #[test]
    fn assignment_preselects_and_rejects_empty_selection() {
        let api = backend();
        let mut board = loaded(&api);
        board.open_assign(11);
        assert_eq!(board.assign.as_ref().unwrap().selected, vec![2]);
        board.toggle_trainer(2);

        let board = block_on(board.submit_assignment(&api));
        assert!(api.mutations().is_empty());
        assert_eq!(
            board.assign.unwrap().error,
            Some(ValidationError::NoTrainerSelected.to_string())
        );
    }

    #[test]
    fn delete_refetches_and_failure_goes_to_banner() {
        let api = backend();
        let board = block_on(loaded(&api).delete(&api, 11));
        assert_eq!(board.sessions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![10]);
        assert_eq!(board.message.as_deref(), Some("Session \"P20211\" supprimée avec succès."));

        api.fail("delete_session", ApiError::Network("down".into()));
        let board = block_on(board.delete(&api, 10));
        assert_eq!(board.sessions.len(), 1);
        assert_eq!(board.error.as_deref(), Some(DELETE_FAILED));
    }

    #[test]
    fn delete_reply_keeps_the_editor_opened_meanwhile() {
        let api = backend();
        let start = Rc::new(loaded(&api));

        // Suppression lancée, puis modale ouverte avant sa réponse.
        let removed = block_on(start.request_delete(&api, 11)).unwrap();
        let editing = start.reduce(BoardAction::edit(|b| {
            b.open_edit(10);
            b.edit_field(|f| f.classe = "L3-B".into());
        }));
        let saved = block_on(editing.request_submit(&api)).unwrap();

        let state = editing.reduce(removed);
        assert_eq!(state.sessions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![10]);
        assert_eq!(state.editor.as_ref().unwrap().form.classe, "L3-B");
        assert_eq!(state.message.as_deref(), Some("Session \"P20211\" supprimée avec succès."));

        let state = state.reduce(saved);
        assert!(state.editor.is_none());
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state.sessions[0].classe, "L3-B");
        assert_eq!(state.message.as_deref(), Some("Session modifiée avec succès !"));
    }

    #[test]
    fn late_failure_goes_to_the_dialog_open_now() {
        let api = backend();
        let start = Rc::new(loaded(&api));
        api.fail("delete_session", ApiError::Network("down".into()));
        let failed = block_on(start.request_delete(&api, 10)).unwrap();

        let state = start.reduce(BoardAction::edit(|b| b.open_assign(11))).reduce(failed);
        assert_eq!(state.assign.as_ref().unwrap().error.as_deref(), Some(DELETE_FAILED));
        assert_eq!(state.error, None);
        assert_eq!(state.sessions.len(), 2);
    }

    #[test]
    fn coordinator_column_falls_back_to_id() {
        let board = loaded(&backend());
        assert_eq!(board.coordinator_name(&session(1, 3, &[])), "Nom3 Prenom3");
        assert_eq!(board.coordinator_name(&session(1, 42, &[])), "ID: 42");
        assert_eq!(board.trainer_names(&session(1, 3, &[2, 9])), "Nom2 Prenom2, ID: 9");
    }
}
