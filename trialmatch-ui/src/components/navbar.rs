use trialmatch_core::View;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct NavbarProps {
    pub current: View,
    pub on_navigate: Callback<View>,
}

#[function_component(Navbar)]
pub fn navbar(props: &NavbarProps) -> Html {
    let active = props.current.nav_group();

    html! {
        <nav class="tm-navbar">
            <span class="tm-brand">{"Clinical Trial Matcher"}</span>
            <div class="tm-nav-items" role="tablist">
                {
                    for View::NAV.into_iter().map(|view| {
                        let on_navigate = props.on_navigate.clone();
                        let onclick = Callback::from(move |_: MouseEvent| on_navigate.emit(view));
                        html! {
                            <button
                                type="button"
                                class={classes!("tm-nav-item", (view == active).then_some("is-active"))}
                                aria-selected={(view == active).to_string()}
                                {onclick}
                            >
                                { view.label() }
                            </button>
                        }
                    })
                }
            </div>
        </nav>
    }
}
