use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;
use crate::services::token::TokenStore;

#[function_component(Landing)]
pub fn landing() -> Html {
    let target = if TokenStore::is_authenticated() {
        Route::Mail
    } else {
        Route::Login
    };

    html! {
        <div class="container landing">
            <h1>{ "Pigeon" }</h1>
            <p>{ "Your Gmail, sorted into folders by AI." }</p>
            <p>
                { "Pigeon syncs your mailbox, files every mail into the folder it belongs to \
                   and tells you why." }
            </p>
            <Link<Route> to={target}>
                <button class="btn btn-primary">{ "Get started" }</button>
            </Link<Route>>
        </div>
    }
}
