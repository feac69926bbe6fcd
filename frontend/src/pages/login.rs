use yew::prelude::*;

use crate::services::api::ApiService;

#[function_component(Login)]
pub fn login() -> Html {
    let onclick = Callback::from(|_: MouseEvent| {
        let url = ApiService::google_login_url();
        if let Err(e) = gloo::utils::window().location().set_href(&url) {
            tracing::error!("Failed to redirect to {}: {:?}", url, e);
        }
    });

    html! {
        <div class="container login">
            <h2>{ "Sign in" }</h2>
            <p>{ "Pigeon needs read access to your Gmail account to sort it." }</p>
            <button class="btn btn-primary" {onclick}>{ "Continue with Gmail" }</button>
        </div>
    }
}
