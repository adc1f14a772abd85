use yew::prelude::*;

use crate::dashboard::View;

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub heading: &'static str,
    pub views: &'static [View],
    pub current: View,
    pub on_select: Callback<View>,
}

/// Barre latérale commune à tous les tableaux de bord.
#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    html! {
        <nav class="sidebar">
            <h3>{ props.heading }</h3>
            <ul class="nav-list">
                { for props.views.iter().map(|&view| {
                    let on_select = props.on_select.clone();
                    let onclick = Callback::from(move |e: MouseEvent| {
                        e.prevent_default();
                        on_select.emit(view);
                    });
                    let class = classes!("nav-link", (view == props.current).then_some("active"));
                    html! {
                        <li class="nav-item">
                            <a href="#" {class} {onclick}>{ view.label() }</a>
                        </li>
                    }
                }) }
            </ul>
        </nav>
    }
}
