use yew::prelude::*;
use yew_router::prelude::*;

use crate::pages::{
    callback::OAuthCallback, landing::Landing, login::Login, mail::MailPage, not_found::NotFound,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Landing,
    #[at("/login")]
    Login,
    #[at("/callback")]
    Callback,
    #[at("/mail")]
    Mail,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(routes: Route) -> Html {
    match routes {
        Route::Landing => html! { <Landing /> },
        Route::Login => html! { <Login /> },
        Route::Callback => html! { <OAuthCallback /> },
        Route::Mail => html! { <MailPage /> },
        Route::NotFound => html! { <NotFound /> },
    }
}
