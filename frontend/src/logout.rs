use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LogoutProps {
    pub on_logout: Callback<()>,
}

#[function_component(Logout)]
pub fn logout(props: &LogoutProps) -> Html {
    let onclick = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_: MouseEvent| on_logout.emit(()))
    };

    html! { <button class="logout-button" {onclick}>{ "Déconnexion" }</button> }
}
