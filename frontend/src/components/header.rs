use pigeon_shared::models::User;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub user: Option<User>,
    pub syncing: bool,
    pub on_sync: Callback<()>,
    pub on_show_progress: Callback<()>,
    pub on_logout: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_sync = {
        let on_sync = props.on_sync.clone();
        let on_show_progress = props.on_show_progress.clone();
        let syncing = props.syncing;
        Callback::from(move |_| {
            if syncing {
                on_show_progress.emit(());
            } else {
                on_sync.emit(());
            }
        })
    };
    let on_logout = props.on_logout.reform(|_: MouseEvent| ());

    html! {
        <header class="header">
            <div class="header-brand">
                <Link<Route> to={Route::Mail}>{ "Pigeon" }</Link<Route>>
            </div>
            <div class="header-actions">
                <button class="btn btn-primary" onclick={on_sync}>
                    { if props.syncing { "Syncing..." } else { "Sync" } }
                </button>
                if let Some(user) = &props.user {
                    <div class="header-user">
                        if let Some(picture) = &user.picture {
                            <img class="avatar" src={picture.clone()} alt={user.name.clone()} />
                        }
                        <span title={user.email.clone()}>{ &user.name }</span>
                    </div>
                }
                <button class="btn btn-secondary" onclick={on_logout}>{ "Log out" }</button>
            </div>
        </header>
    }
}
