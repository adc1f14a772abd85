use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod auth;
mod config;
mod error;
mod logger;
mod models;
mod session;
mod storage;

// Vues
mod dashboard;
mod layout;
mod logout;
mod manage_sessions;
mod manage_users;
mod my_sessions;
mod profile;
mod register;
mod sidebar;

#[cfg(test)]
mod testing;

/* -------------------- routing -------------------- */

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(route: Route) -> Html {
    match route {
        Route::Home => html!(<layout::AppShell />),
        Route::NotFound => html!(<h1>{"404 – Not Found"}</h1>),
    }
}

/* -------------------- entry point ---------------- */

#[function_component(App)]
fn app() -> Html {
    html! {
        <session::ServicesProvider>
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </session::ServicesProvider>
    }
}

fn main() {
    logger::init();
    yew::Renderer::<App>::new().render();
}
