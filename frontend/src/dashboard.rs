use yew::prelude::*;

use crate::logout::Logout;
use crate::manage_sessions::ManageSessions;
use crate::manage_users::{ManageUsers, UserFilter};
use crate::models::{Role, User};
use crate::my_sessions::MySessions;
use crate::profile::Profile;
use crate::sidebar::Sidebar;

/* -------------------------------------------------------------------------- */
/*                            vues et tableaux de bord                         */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    AllUsers,
    PendingUsers,
    ActiveUsers,
    Sessions,
    MySessions,
    Profile,
}

impl View {
    pub fn label(self) -> &'static str {
        match self {
            View::AllUsers => "Tous les utilisateurs",
            View::PendingUsers => "Utilisateurs en attente",
            View::ActiveUsers => "Utilisateurs actifs",
            View::Sessions => "Sessions / Paiements",
            View::MySessions => "Mes sessions",
            View::Profile => "Mon profil",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dashboard {
    Admin,
    Comptable,
    Coordinateur,
    Formateur,
    Other,
}

const BY_ROLE: [(Role, Dashboard); 4] = [
    (Role::Admin, Dashboard::Admin),
    (Role::Comptable, Dashboard::Comptable),
    (Role::Coordinateur, Dashboard::Coordinateur),
    (Role::Formateur, Dashboard::Formateur),
];

impl Dashboard {
    pub fn for_role(role: &Role) -> Dashboard {
        BY_ROLE
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, d)| *d)
            .unwrap_or(Dashboard::Other)
    }

    /// Entrées de la barre latérale ; la première est la vue par défaut.
    pub fn views(self) -> &'static [View] {
        match self {
            Dashboard::Admin => {
                &[View::AllUsers, View::PendingUsers, View::ActiveUsers, View::Profile]
            }
            Dashboard::Comptable => &[View::Sessions, View::AllUsers, View::Profile],
            Dashboard::Coordinateur | Dashboard::Formateur => &[View::Profile, View::MySessions],
            Dashboard::Other => &[],
        }
    }

    pub fn default_view(self) -> Option<View> {
        self.views().first().copied()
    }

    pub fn title(self, user: &User) -> String {
        match self {
            Dashboard::Admin => "Panneau d'Administration".into(),
            Dashboard::Comptable => format!("Espace Comptable ({} {})", user.prenom, user.nom),
            Dashboard::Coordinateur => "Tableau de Bord Coordinateur".into(),
            Dashboard::Formateur => "Tableau de Bord Formateur".into(),
            Dashboard::Other => format!("Espace Utilisateur : {}", user.role),
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Dashboard::Admin => "Administration",
            _ => "Navigation",
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                              composant Dashboard                           */
/* -------------------------------------------------------------------------- */

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub user: User,
    pub on_logout: Callback<()>,
    pub on_user_update: Callback<User>,
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &DashboardProps) -> Html {
    let kind = Dashboard::for_role(&props.user.role);
    let view = use_state(|| kind.default_view());

    let on_select = {
        let view = view.clone();
        Callback::from(move |v: View| view.set(Some(v)))
    };

    let directory = |filter: UserFilter| html!(<ManageUsers actor={props.user.clone()} {filter} />);

    let content = match *view {
        Some(View::AllUsers) => directory(UserFilter::All),
        Some(View::PendingUsers) => directory(UserFilter::Pending),
        Some(View::ActiveUsers) => directory(UserFilter::Active),
        Some(View::Sessions) => html!(<ManageSessions />),
        Some(View::MySessions) => html!(<MySessions user={props.user.clone()} />),
        Some(View::Profile) => html! {
            <Profile user={props.user.clone()} on_user_update={props.on_user_update.clone()} />
        },
        None => html! {
            <div class="user-info">
                <h2>{ format!("Bienvenue, ID : {}", props.user.id) }</h2>
                <p>{"Email : "}<strong>{ &props.user.email }</strong></p>
            </div>
        },
    };

    html! {
        <div class="dashboard-layout">
            <header class="dashboard-header">
                <h1>{ kind.title(&props.user) }</h1>
                <div class="header-logout">
                    <span class="connected-as">
                        { format!("Connecté en tant que : {}", props.user.email) }
                    </span>
                    <Logout on_logout={props.on_logout.clone()} />
                </div>
            </header>

            <div class="main-content-area">
                if let Some(current) = *view {
                    <Sidebar heading={kind.heading()} views={kind.views()} {current} {on_select} />
                }
                <main class="view-container">
                    { content }
                </main>
            </div>
        </div>
    }
}
