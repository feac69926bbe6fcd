use pigeon_shared::api::OAuthCallbackQuery;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::hooks::use_toaster;
use crate::router::Route;
use crate::services::api::ApiService;
use crate::services::token::TokenStore;
use crate::store::auth::{AuthAction, AuthContext};

/// Landing spot of the OAuth redirect: `/callback?access_token=..&refresh_token=..`.
#[function_component(OAuthCallback)]
pub fn oauth_callback() -> Html {
    let location = use_location();
    let navigator = use_navigator();
    let auth = use_context::<AuthContext>();
    let toaster = use_toaster();

    use_effect_with((), move |_| {
        let tokens = location
            .and_then(|location| location.query::<OAuthCallbackQuery>().ok())
            .and_then(|query| query.access_token.zip(query.refresh_token));

        match tokens {
            Some((access_token, refresh_token)) => {
                TokenStore::store(&access_token, &refresh_token);
                wasm_bindgen_futures::spawn_local(async move {
                    match ApiService::me().await {
                        Ok(user) => {
                            tracing::info!("Signed in as {}", user.email);
                            if let Some(auth) = &auth {
                                auth.dispatch(AuthAction::LoggedIn(user));
                            }
                            if let Some(navigator) = &navigator {
                                navigator.replace(&Route::Mail);
                            }
                        }
                        Err(e) => {
                            tracing::error!("Failed to load user after sign in: {}", e);
                            TokenStore::clear();
                            toaster.error("Sign in failed. Please try again.");
                            if let Some(navigator) = &navigator {
                                navigator.replace(&Route::Login);
                            }
                        }
                    }
                });
            }
            None => {
                toaster.error("Sign in failed: no tokens were returned.");
                if let Some(navigator) = &navigator {
                    navigator.replace(&Route::Login);
                }
            }
        }
        || ()
    });

    html! {
        <div class="container">
            <div class="loading">
                <div class="spinner"></div>
                <p>{ "Signing you in..." }</p>
            </div>
        </div>
    }
}
