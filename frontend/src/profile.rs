use log::{error, info};
use web_sys::HtmlInputElement;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::Api;
use crate::error::ValidationError;
use crate::models::{ProfileUpdate, User};
use crate::session::use_services;

pub const NOTHING_CHANGED: &str = "Aucune modification à sauvegarder.";
pub const UPDATED: &str = "Profil mis à jour avec succès !";
const UPDATE_FAILED: &str = "Erreur lors de la mise à jour du profil.";

/* ---------------- formulaire ---------------- */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub email: String,
    pub rib: String,
    pub banque: String,
    pub old_password: String,
    pub new_password: String,
}

fn changed(value: &str, current: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && value != current).then(|| value.to_string())
}

impl ProfileForm {
    pub fn for_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            rib: user.rib().to_string(),
            banque: user.banque().to_string(),
            ..Self::default()
        }
    }

    /// `Ok(None)` : rien à envoyer.
    pub fn build_update(&self, user: &User) -> Result<Option<ProfileUpdate>, ValidationError> {
        let mut update = ProfileUpdate {
            email: changed(&self.email, &user.email),
            rib: changed(&self.rib, user.rib()),
            banque: changed(&self.banque, user.banque()),
            ..ProfileUpdate::default()
        };
        if !self.new_password.is_empty() {
            if self.old_password.is_empty() {
                return Err(ValidationError::MissingOldPassword);
            }
            update.password = Some(self.new_password.clone());
            update.old_password = Some(self.old_password.clone());
        }
        Ok((!update.is_empty()).then_some(update))
    }
}

/* ---------------- état de l'éditeur ---------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileEditor {
    pub user: User,
    pub form: ProfileForm,
    pub saving: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ProfileEditor {
    pub fn new(user: User) -> Self {
        let form = ProfileForm::for_user(&user);
        Self { user, form, saving: false, error: None, message: None }
    }

    /// Envoie les champs modifiés et fusionne la réponse dans l'utilisateur.
    pub async fn submit(mut self, api: &dyn Api) -> Self {
        self.error = None;
        self.message = None;

        let update = match self.form.build_update(&self.user) {
            Err(e) => {
                self.error = Some(e.to_string());
                return self;
            }
            Ok(None) => {
                self.message = Some(NOTHING_CHANGED.into());
                return self;
            }
            Ok(Some(update)) => update,
        };

        self.saving = true;
        match api.update_profile(&update).await {
            Ok(patch) => {
                info!("profil de {} mis à jour", self.user.email);
                self.user = self.user.merged(&patch);
                self.form = ProfileForm::for_user(&self.user);
                self.message = Some(UPDATED.into());
            }
            Err(e) => {
                error!("profil : {e}");
                self.error = Some(e.user_message(UPDATE_FAILED));
            }
        }
        self.saving = false;
        self
    }
}

/* ---------------- composant ---------------- */

#[derive(Properties, PartialEq)]
pub struct ProfileProps {
    pub user: User,
    /// Reçoit l'utilisateur fusionné après une mise à jour réussie.
    pub on_user_update: Callback<User>,
}

#[function_component(Profile)]
pub fn profile(props: &ProfileProps) -> Html {
    let services = use_services();
    let editor   = use_state(|| ProfileEditor::new(props.user.clone()));

    let field = |apply: fn(&mut ProfileForm, String)| {
        let editor = editor.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*editor).clone();
            apply(&mut next.form, input.value());
            editor.set(next);
        })
    };

    let onsubmit = {
        let editor = editor.clone();
        let api = services.api.clone();
        let on_user_update = props.on_user_update.clone();
        Callback::from(move |ev: SubmitEvent| {
            ev.prevent_default();
            let mut current = (*editor).clone();
            current.saving = true;
            editor.set(current.clone());

            let editor = editor.clone();
            let api = api.clone();
            let on_user_update = on_user_update.clone();
            spawn_local(async move {
                let before = current.user.clone();
                let done = current.submit(&*api).await;
                if done.user != before {
                    on_user_update.emit(done.user.clone());
                }
                editor.set(done);
            });
        })
    };

    let user = &editor.user;
    let form = &editor.form;

    html! {
        <div class="profile-view">
            <h2>{"Mon profil"}</h2>

            if let Some(msg) = &editor.message {
                <p class="success-message">{ msg }</p>
            }
            if let Some(msg) = &editor.error {
                <p class="error-message">{ msg }</p>
            }

            <div class="profile-readonly">
                <p>{"Nom : "}<strong>{ &user.nom }</strong></p>
                <p>{"Prénom : "}<strong>{ &user.prenom }</strong></p>
                <p>{"N° CIN : "}<strong>{ user.n_cin() }</strong></p>
                <p>
                    {"Rôle : "}
                    <span class={user.role.badge_class()}>{ user.role.as_str() }</span>
                </p>
            </div>

            <form {onsubmit} class="profile-form">
                <label for="email">{"Email"}</label>
                <input id="email" type="email" value={form.email.clone()}
                    oninput={field(|f, v| f.email = v)} />
                <label for="rib">{"RIB"}</label>
                <input id="rib" type="text" value={form.rib.clone()}
                    oninput={field(|f, v| f.rib = v)} />
                <label for="banque">{"Banque"}</label>
                <input id="banque" type="text" value={form.banque.clone()}
                    oninput={field(|f, v| f.banque = v)} />

                <label for="old-password">{"Ancien mot de passe"}</label>
                <input id="old-password" type="password" value={form.old_password.clone()}
                    oninput={field(|f, v| f.old_password = v)} />
                <label for="new-password">{"Nouveau mot de passe"}</label>
                <input id="new-password" type="password" value={form.new_password.clone()}
                    oninput={field(|f, v| f.new_password = v)} />

                <button type="submit" disabled={editor.saving}>
                    { if editor.saving { "Enregistrement..." } else { "Enregistrer" } }
                </button>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::{BankDetails, BankPatch, Role, UserPatch};
    use crate::testing::{user, Call, FakeApi};
    use futures::executor::block_on;

    fn formateur() -> User {
        User {
            bank: Some(BankDetails {
                rib: "111".into(),
                banque: "STB".into(),
                n_cin: "0999".into(),
            }),
            ..user(7, Role::Formateur, true)
        }
    }

    #[test]
    fn nothing_changed_sends_no_request() {
        let api = FakeApi::default();
        let done = block_on(ProfileEditor::new(formateur()).submit(&api));
        assert_eq!(done.message.as_deref(), Some(NOTHING_CHANGED));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn new_password_requires_the_old_one() {
        let api = FakeApi::default();
        let mut editor = ProfileEditor::new(formateur());
        editor.form.new_password = "nouveau".into();
        let done = block_on(editor.submit(&api));
        assert_eq!(done.error, Some(ValidationError::MissingOldPassword.to_string()));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn only_changed_fields_are_sent() {
        let mut form = ProfileForm::for_user(&formateur());
        form.rib = "222".into();
        form.banque = "  ".into();
        form.old_password = "ancien".into();
        form.new_password = "nouveau".into();

        let update = form.build_update(&formateur()).unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"rib": "222", "password": "nouveau", "oldPassword": "ancien"})
        );
    }

    #[test]
    fn nested_bank_reply_is_merged_field_by_field() {
        let api = FakeApi::default();
        *api.profile_reply.borrow_mut() = UserPatch {
            bank: Some(BankPatch { banque: Some("BIAT".into()), ..BankPatch::default() }),
            ..UserPatch::default()
        };
        let mut editor = ProfileEditor::new(formateur());
        editor.form.banque = "BIAT".into();

        let done = block_on(editor.submit(&api));
        let sent = ProfileUpdate { banque: Some("BIAT".into()), ..ProfileUpdate::default() };
        assert_eq!(api.calls(), vec![Call::UpdateProfile(sent)]);
        assert_eq!(done.user.banque(), "BIAT");
        assert_eq!(done.user.rib(), "111");
        assert_eq!(done.user.n_cin(), "0999");
        assert_eq!(done.message.as_deref(), Some(UPDATED));
    }

    #[test]
    fn flat_reply_updates_email_and_rib() {
        let api = FakeApi::default();
        *api.profile_reply.borrow_mut() = UserPatch {
            email: Some("neuf@ecole.tn".into()),
            rib: Some("333".into()),
            ..UserPatch::default()
        };
        let mut editor = ProfileEditor::new(formateur());
        editor.form.email = "neuf@ecole.tn".into();
        editor.form.rib = "333".into();

        let done = block_on(editor.submit(&api));
        assert_eq!(done.user.email, "neuf@ecole.tn");
        assert_eq!(done.user.rib(), "333");
        assert_eq!(done.user.nom, "Nom7");
        assert_eq!(done.form.email, "neuf@ecole.tn");
    }

    #[test]
    fn empty_reply_keeps_current_values() {
        let api = FakeApi::default();
        let mut editor = ProfileEditor::new(formateur());
        editor.form.email = "neuf@ecole.tn".into();

        let done = block_on(editor.submit(&api));
        assert_eq!(done.user, formateur());
        assert_eq!(done.message.as_deref(), Some(UPDATED));
        assert_eq!(done.error, None);
    }

    #[test]
    fn wrong_old_password_shows_server_message() {
        let api = FakeApi::default();
        let refused = Some("Ancien mot de passe incorrect".to_string());
        api.fail("update_profile", ApiError::Http { status: 401, message: refused });
        let mut editor = ProfileEditor::new(formateur());
        editor.form.old_password = "faux".into();
        editor.form.new_password = "nouveau".into();

        let done = block_on(editor.submit(&api));
        assert_eq!(done.error.as_deref(), Some("Ancien mot de passe incorrect"));
        assert_eq!(done.user, formateur());
    }
}
