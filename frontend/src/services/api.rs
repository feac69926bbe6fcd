use gloo_net::http::{Method, Request, RequestBuilder, Response};
use pigeon_shared::api::{
    decode_response, endpoints, join_url, ApiResponse, ClassifyResponse, CreateFolderRequest,
    FoldersResponse, ListMailsQuery, ListMailsResponse, MoveMailsRequest,
    TokenRefreshRequest, TokenRefreshResponse, UpdateMailRequest, DEFAULT_API_BASE_URL,
};
use pigeon_shared::error::{ClientError, ClientResult};
use pigeon_shared::models::{Folder, Mail, SyncStatus, User, VirtualFolder, VirtualFolderCounts};
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::services::token::TokenStore;

/// Set `PIGEON_API_URL` at build time to point at another backend.
pub fn api_base_url() -> &'static str {
    option_env!("PIGEON_API_URL").unwrap_or(DEFAULT_API_BASE_URL)
}

pub struct ApiService;

impl ApiService {
    /// Where the browser goes to start the Google OAuth flow.
    pub fn google_login_url() -> String {
        join_url(api_base_url(), endpoints::GOOGLE_LOGIN)
    }

    async fn send(
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&serde_json::Value>,
    ) -> ClientResult<Response> {
        let mut builder = RequestBuilder::new(&join_url(api_base_url(), path)).method(method);
        if !query.is_empty() {
            builder = builder.query(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        if let Some(token) = TokenStore::access_token() {
            builder = builder.header("Authorization", &format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(ClientError::transport)?;

        request.send().await.map_err(ClientError::transport)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await.map_err(ClientError::transport)?;
        decode_response(status, &text)
    }

    /// Returns `Ok(false)` when there is no refresh token to try.
    async fn refresh_access_token() -> ClientResult<bool> {
        let Some(refresh_token) = TokenStore::refresh_token() else {
            return Ok(false);
        };

        let response = Request::post(&join_url(api_base_url(), endpoints::TOKEN_REFRESH))
            .json(&TokenRefreshRequest { refresh_token })
            .map_err(ClientError::transport)?
            .send()
            .await
            .map_err(ClientError::transport)?;

        match Self::decode::<TokenRefreshResponse>(response)
            .await
            .and_then(ApiResponse::into_result)
        {
            Ok(token) => {
                TokenStore::set_access_token(&token.access_token);
                tracing::debug!("Access token refreshed, expires in {}s", token.expires_in);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                TokenStore::clear();
                Err(ClientError::Unauthorized)
            }
        }
    }

    /// One retry after a successful refresh when the first attempt gets a 401.
    async fn request<T: DeserializeOwned>(
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<ApiResponse<T>> {
        let mut response = Self::send(method.clone(), path, query, body.as_ref()).await?;

        if response.status() == 401 && Self::refresh_access_token().await? {
            response = Self::send(method, path, query, body.as_ref()).await?;
        }

        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(path: &str) -> ClientResult<T> {
        Self::request(Method::GET, path, &[], None)
            .await?
            .into_result()
    }

    async fn command(
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Option<String>> {
        Self::request::<serde_json::Value>(method, path, &[], body)
            .await?
            .into_ack()
    }

    // Auth

    pub async fn me() -> ClientResult<User> {
        Self::get(endpoints::ME).await
    }

    // Folders

    pub async fn list_folders() -> ClientResult<Vec<Folder>> {
        let response: FoldersResponse = Self::get(endpoints::FOLDERS).await?;
        Ok(response.folders)
    }

    pub async fn create_folder(request: CreateFolderRequest) -> ClientResult<Folder> {
        request.validate()?;
        Self::request(Method::POST, endpoints::FOLDERS, &[], Some(to_body(&request)?))
            .await?
            .into_result()
    }

    // Mails

    pub async fn list_mails(query: &ListMailsQuery) -> ClientResult<ListMailsResponse> {
        Self::request(Method::GET, endpoints::MAILS, &query.to_pairs(), None)
            .await?
            .into_result()
    }

    /// Counts come from `total_count` of a one-item page per virtual folder.
    pub async fn virtual_counts() -> ClientResult<VirtualFolderCounts> {
        let mut counts = VirtualFolderCounts::default();
        for folder in VirtualFolder::ALL {
            let page = Self::list_mails(&ListMailsQuery::count_only(folder)).await?;
            counts.set(folder, page.pagination.total_count);
        }
        Ok(counts)
    }

    pub async fn get_mail(id: i64) -> ClientResult<Mail> {
        Self::get(&endpoints::mail(id)).await
    }

    pub async fn update_mail(id: i64, update: UpdateMailRequest) -> ClientResult<Option<String>> {
        Self::command(Method::PATCH, &endpoints::mail(id), Some(to_body(&update)?)).await
    }

    pub async fn delete_mail(id: i64) -> ClientResult<Option<String>> {
        Self::command(Method::DELETE, &endpoints::mail(id), None).await
    }

    pub async fn move_mails(request: MoveMailsRequest) -> ClientResult<Option<String>> {
        request.validate()?;
        Self::command(Method::POST, endpoints::MOVE_MAILS, Some(to_body(&request)?)).await
    }

    // Sync

    pub async fn start_sync() -> ClientResult<Option<String>> {
        Self::command(Method::POST, endpoints::SYNC_START, None).await
    }

    pub async fn stop_sync() -> ClientResult<Option<String>> {
        Self::command(Method::POST, endpoints::SYNC_STOP, None).await
    }

    pub async fn sync_status() -> ClientResult<SyncStatus> {
        Self::get(endpoints::SYNC_STATUS).await
    }

    // Classifier

    pub async fn classify_unclassified() -> ClientResult<Option<String>> {
        let envelope: ApiResponse<ClassifyResponse> =
            Self::request(Method::POST, endpoints::CLASSIFY_UNCLASSIFIED, &[], None).await?;
        let count = envelope.data.as_ref().and_then(|data| data.classified_count);
        let message = envelope.into_ack()?;
        Ok(message.or_else(|| count.map(|n| format!("Classified {} mails", n))))
    }
}

fn to_body<T: Serialize>(value: &T) -> ClientResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Invalid(e.to_string()))
}
