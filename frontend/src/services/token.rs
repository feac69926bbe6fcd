//! Access and refresh token persistence in `localStorage`.

use gloo::storage::{LocalStorage, Storage};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub struct TokenStore;

impl TokenStore {
    pub fn access_token() -> Option<String> {
        LocalStorage::get(ACCESS_TOKEN_KEY).ok()
    }

    pub fn refresh_token() -> Option<String> {
        LocalStorage::get(REFRESH_TOKEN_KEY).ok()
    }

    pub fn is_authenticated() -> bool {
        Self::access_token().is_some()
    }

    pub fn store(access_token: &str, refresh_token: &str) {
        Self::set_access_token(access_token);
        if let Err(e) = LocalStorage::set(REFRESH_TOKEN_KEY, refresh_token) {
            tracing::error!("Failed to store refresh token: {:?}", e);
        }
    }

    pub fn set_access_token(access_token: &str) {
        if let Err(e) = LocalStorage::set(ACCESS_TOKEN_KEY, access_token) {
            tracing::error!("Failed to store access token: {:?}", e);
        }
    }

    pub fn clear() {
        LocalStorage::delete(ACCESS_TOKEN_KEY);
        LocalStorage::delete(REFRESH_TOKEN_KEY);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_store_and_clear_tokens() {
        TokenStore::store("access", "refresh");
        assert!(TokenStore::is_authenticated());
        assert_eq!(TokenStore::refresh_token().as_deref(), Some("refresh"));

        TokenStore::set_access_token("rotated");
        assert_eq!(TokenStore::access_token().as_deref(), Some("rotated"));

        TokenStore::clear();
        assert!(!TokenStore::is_authenticated());
        assert_eq!(TokenStore::refresh_token(), None);
    }
}
