//! HTTP access to the Pigeon API.

use async_trait::async_trait;
use pigeon_shared::api::{
    decode_response, endpoints, join_url, ApiResponse, ClassifyResponse, CreateFolderRequest,
    FoldersResponse, ListMailsQuery, ListMailsResponse, MoveMailsRequest, RenameFolderRequest,
    TokenRefreshRequest, TokenRefreshResponse, UpdateMailRequest,
};
use pigeon_shared::error::{ClientError, ClientResult};
use pigeon_shared::models::{Folder, Mail, SyncStatus, User, VirtualFolder, VirtualFolderCounts};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use validator::Validate;

use crate::config::CliConfig;

/// Operations the terminal client needs from the backend.
#[async_trait]
pub trait PigeonApi: Send + Sync {
    async fn sync_status(&self) -> ClientResult<SyncStatus>;
    async fn start_sync(&self) -> ClientResult<()>;
    async fn stop_sync(&self) -> ClientResult<()>;
    async fn classify_unclassified(&self) -> ClientResult<Option<String>>;

    async fn list_mails(&self, query: &ListMailsQuery) -> ClientResult<ListMailsResponse>;
    async fn list_folders(&self) -> ClientResult<Vec<Folder>>;

    /// Counts come from `total_count` of a one-item page per virtual folder.
    async fn virtual_counts(&self) -> ClientResult<VirtualFolderCounts> {
        let mut counts = VirtualFolderCounts::default();
        for folder in VirtualFolder::ALL {
            let page = self.list_mails(&ListMailsQuery::count_only(folder)).await?;
            counts.set(folder, page.pagination.total_count);
        }
        Ok(counts)
    }
}

/// Bearer and refresh token held for the lifetime of the process
#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// reqwest-backed client that speaks the `{status, data, message}` envelope.
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: RwLock<Tokens>,
}

impl HttpClient {
    pub fn new(config: &CliConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ClientError::transport)?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            tokens: RwLock::new(Tokens {
                access: config.access_token.clone(),
                refresh: config.refresh_token.clone(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn access_token(&self) -> Option<String> {
        self.tokens.read().ok().and_then(|t| t.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().ok().and_then(|t| t.refresh.clone())
    }

    fn clear_tokens(&self) {
        if let Ok(mut tokens) = self.tokens.write() {
            *tokens = Tokens::default();
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> ClientResult<reqwest::Response> {
        let mut builder = self
            .client
            .request(method, join_url(&self.base_url, path))
            .query(query);
        if let Some(token) = self.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(ClientError::transport)
    }

    /// Swap the refresh token for a new access token.
    ///
    /// Returns `Ok(false)` when there is no refresh token to try.
    async fn refresh_access_token(&self) -> ClientResult<bool> {
        let Some(refresh_token) = self.refresh_token() else {
            return Ok(false);
        };

        tracing::debug!("Access token rejected, refreshing");
        let body = to_body(&TokenRefreshRequest { refresh_token })?;
        let response = self
            .client
            .post(join_url(&self.base_url, endpoints::TOKEN_REFRESH))
            .json(&body)
            .send()
            .await
            .map_err(ClientError::transport)?;

        let refreshed = Self::decode::<TokenRefreshResponse>(response)
            .await
            .and_then(ApiResponse::into_result);

        match refreshed {
            Ok(token) => {
                if let Ok(mut tokens) = self.tokens.write() {
                    tokens.access = Some(token.access_token);
                }
                tracing::info!(
                    "Access token refreshed (expires in {}s); it is only kept for this run",
                    token.expires_in
                );
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.clear_tokens();
                Err(ClientError::Unauthorized)
            }
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await.map_err(ClientError::transport)?;
        decode_response(status.as_u16(), &text)
    }

    /// Send once, and once more after a successful token refresh on 401.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<ApiResponse<T>> {
        let mut response = self
            .send(method.clone(), path, query, body.as_ref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.refresh_access_token().await? {
            response = self.send(method, path, query, body.as_ref()).await?;
        }

        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, &[], None)
            .await?
            .into_result()
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Option<String>> {
        self.request::<serde_json::Value>(method, path, &[], body)
            .await?
            .into_ack()
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.get(endpoints::ME).await
    }

    pub async fn get_mail(&self, id: i64) -> ClientResult<Mail> {
        self.get(&endpoints::mail(id)).await
    }

    pub async fn update_mail(
        &self,
        id: i64,
        update: &UpdateMailRequest,
    ) -> ClientResult<Option<String>> {
        self.command(Method::PATCH, &endpoints::mail(id), Some(to_body(update)?))
            .await
    }

    pub async fn delete_mail(&self, id: i64) -> ClientResult<Option<String>> {
        self.command(Method::DELETE, &endpoints::mail(id), None).await
    }

    pub async fn move_mails(&self, request: &MoveMailsRequest) -> ClientResult<Option<String>> {
        request.validate()?;
        self.command(Method::POST, endpoints::MOVE_MAILS, Some(to_body(request)?))
            .await
    }

    pub async fn create_folder(&self, request: &CreateFolderRequest) -> ClientResult<Folder> {
        request.validate()?;
        self.request(Method::POST, endpoints::FOLDERS, &[], Some(to_body(request)?))
            .await?
            .into_result()
    }

    pub async fn rename_folder(
        &self,
        id: i64,
        request: &RenameFolderRequest,
    ) -> ClientResult<Folder> {
        request.validate()?;
        self.request(Method::PATCH, &endpoints::folder(id), &[], Some(to_body(request)?))
            .await?
            .into_result()
    }

    pub async fn delete_folder(&self, id: i64) -> ClientResult<Option<String>> {
        self.command(Method::DELETE, &endpoints::folder(id), None).await
    }
}

#[async_trait]
impl PigeonApi for HttpClient {
    async fn sync_status(&self) -> ClientResult<SyncStatus> {
        self.get(endpoints::SYNC_STATUS).await
    }

    async fn start_sync(&self) -> ClientResult<()> {
        self.command(Method::POST, endpoints::SYNC_START, None)
            .await
            .map(|_| ())
    }

    async fn stop_sync(&self) -> ClientResult<()> {
        self.command(Method::POST, endpoints::SYNC_STOP, None)
            .await
            .map(|_| ())
    }

    async fn classify_unclassified(&self) -> ClientResult<Option<String>> {
        let envelope: ApiResponse<ClassifyResponse> = self
            .request(Method::POST, endpoints::CLASSIFY_UNCLASSIFIED, &[], None)
            .await?;
        let count = envelope.data.as_ref().and_then(|data| data.classified_count);
        let message = envelope.into_ack()?;
        Ok(message.or_else(|| count.map(|n| format!("Classified {} mails", n))))
    }

    async fn list_mails(&self, query: &ListMailsQuery) -> ClientResult<ListMailsResponse> {
        self.request(Method::GET, endpoints::MAILS, &query.to_pairs(), None)
            .await?
            .into_result()
    }

    async fn list_folders(&self) -> ClientResult<Vec<Folder>> {
        let response: FoldersResponse = self.get(endpoints::FOLDERS).await?;
        Ok(response.folders)
    }
}

fn to_body<T: Serialize>(value: &T) -> ClientResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Invalid(e.to_string()))
}
