mod components;
mod hooks;
mod pages;
mod router;
mod services;
mod store;

use yew::prelude::*;
use yew_router::BrowserRouter;

use crate::components::toast::ToastContainer;
use crate::router::{switch, Route};
use crate::store::auth::{AuthContext, AuthState};
use crate::store::toast::{ToastContext, ToastState};

#[function_component(App)]
fn app() -> Html {
    let auth = use_reducer(AuthState::default);
    let toasts = use_reducer(ToastState::default);

    html! {
        <BrowserRouter>
            <ContextProvider<AuthContext> context={auth}>
                <ContextProvider<ToastContext> context={toasts}>
                    <div id="app">
                        <yew_router::Switch<Route> render={switch} />
                        <ToastContainer />
                    </div>
                </ContextProvider<ToastContext>>
            </ContextProvider<AuthContext>>
        </BrowserRouter>
    }
}

fn main() {
    // Initialize tracing
    tracing_wasm::set_as_global_default();

    yew::Renderer::<App>::new().render();
}
