use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::error::{ClientError, ClientResult};
use crate::models::{Folder, MailListItem, MailboxSelection, Pagination, VirtualFolder};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Relative endpoint paths, joined onto the API base URL.
pub mod endpoints {
    pub const GOOGLE_LOGIN: &str = "/auth/google/login/";
    pub const ME: &str = "/auth/me/";
    pub const TOKEN_REFRESH: &str = "/auth/token/refresh/";

    pub const FOLDERS: &str = "/folders/";
    pub const MAILS: &str = "/mails/";
    pub const MOVE_MAILS: &str = "/mails/move/";

    pub const SYNC_START: &str = "/sync/start/";
    pub const SYNC_STOP: &str = "/sync/stop/";
    pub const SYNC_STATUS: &str = "/sync/status/";

    pub const CLASSIFY_UNCLASSIFIED: &str = "/classifier/classify-unclassified/";

    pub fn folder(id: i64) -> String {
        format!("/folders/{}/", id)
    }

    pub fn mail(id: i64) -> String {
        format!("/mails/{}/", id)
    }
}

/// Join a base URL and an endpoint path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Every endpoint wraps its payload in this envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: EnvelopeStatus,
    pub data: Option<T>,
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// Stand-in for a 2xx response with an empty body (e.g. 204 No Content).
    pub fn empty_success() -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: None,
            message: None,
            code: None,
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    fn into_error(self) -> ClientError {
        ClientError::Api {
            code: self.code,
            message: self
                .message
                .unwrap_or_else(|| "The server reported an error".to_string()),
        }
    }

    /// Unwrap the payload, turning `status: "error"` and empty payloads into errors.
    pub fn into_result(self) -> ClientResult<T> {
        match self.status {
            EnvelopeStatus::Success => self.data.ok_or(ClientError::MissingData),
            EnvelopeStatus::Error => Err(self.into_error()),
        }
    }

    /// For commands whose body is not relied upon: only the status matters.
    pub fn into_ack(self) -> ClientResult<Option<String>> {
        match self.status {
            EnvelopeStatus::Success => Ok(self.message),
            EnvelopeStatus::Error => Err(self.into_error()),
        }
    }
}

/// Decode a raw body into an envelope.
///
/// Error responses from the backend still use the envelope, so callers try this
/// before falling back to the bare HTTP status.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> ClientResult<ApiResponse<T>> {
    serde_json::from_str(body).map_err(ClientError::decode)
}

/// Interpret a finished exchange: status code plus raw body.
///
/// 401 is always `Unauthorized`; an empty 2xx body counts as success.
pub fn decode_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> ClientResult<ApiResponse<T>> {
    if status == 401 {
        return Err(ClientError::Unauthorized);
    }
    let success = (200..300).contains(&status);
    if success && body.trim().is_empty() {
        return Ok(ApiResponse::empty_success());
    }

    match decode_envelope::<T>(body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !success => Err(ClientError::from_status(status)),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Query string the backend appends when redirecting back after OAuth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCallbackQuery {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

// ============================================================================
// Folders
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldersResponse {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFolderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

// ============================================================================
// Mails
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMailsResponse {
    pub mails: Vec<MailListItem>,
    pub pagination: Pagination,
}

/// Filters accepted by `GET /mails/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMailsQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_classified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListMailsQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            folder_id: None,
            is_read: None,
            is_starred: None,
            is_classified: None,
            search: None,
        }
    }
}

impl ListMailsQuery {
    /// Build the query for a mailbox selection and page.
    pub fn for_selection(selection: MailboxSelection, page: u32) -> Self {
        let query = Self {
            page: page.max(1),
            ..Self::default()
        };
        match selection {
            MailboxSelection::Folder(id) => Self {
                folder_id: Some(id),
                ..query
            },
            MailboxSelection::Virtual(folder) => query.with_virtual_filter(folder),
        }
    }

    pub fn with_virtual_filter(self, folder: VirtualFolder) -> Self {
        match folder {
            VirtualFolder::All => self,
            VirtualFolder::Unread => Self {
                is_read: Some(false),
                ..self
            },
            VirtualFolder::Starred => Self {
                is_starred: Some(true),
                ..self
            },
            VirtualFolder::Unclassified => Self {
                is_classified: Some(false),
                ..self
            },
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search.trim().to_string())
        };
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Query pairs in a stable order, ready for either HTTP client.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(id) = self.folder_id {
            pairs.push(("folder_id", id.to_string()));
        }
        if let Some(v) = self.is_read {
            pairs.push(("is_read", v.to_string()));
        }
        if let Some(v) = self.is_starred {
            pairs.push(("is_starred", v.to_string()));
        }
        if let Some(v) = self.is_classified {
            pairs.push(("is_classified", v.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    /// One-item page used only to read `pagination.total_count`.
    pub fn count_only(folder: VirtualFolder) -> Self {
        Self {
            page_size: 1,
            ..Self::default()
        }
        .with_virtual_filter(folder)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMailRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveMailsRequest {
    #[validate(length(min = 1))]
    pub mail_ids: Vec<i64>,
    pub folder_id: i64,
}

// ============================================================================
// Classifier
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub classified_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SyncStatus;

    #[test]
    fn test_envelope_success() {
        let body = r#"{"status": "success", "data": {"folders": []}}"#;
        let envelope: ApiResponse<FoldersResponse> = decode_envelope(body).unwrap();
        assert!(envelope.is_success());
        assert!(envelope.into_result().unwrap().folders.is_empty());
    }

    #[test]
    fn test_envelope_error_becomes_api_error() {
        let body = r#"{"status": "error", "code": "not_found", "message": "No sync"}"#;
        let envelope: ApiResponse<SyncStatus> = decode_envelope(body).unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err(),
            ClientError::Api {
                code: Some("not_found".to_string()),
                message: "No sync".to_string(),
            }
        );
    }

    #[test]
    fn test_envelope_success_without_data() {
        let body = r#"{"status": "success"}"#;
        let envelope: ApiResponse<SyncStatus> = decode_envelope(body).unwrap();
        assert_eq!(envelope.into_result().unwrap_err(), ClientError::MissingData);
    }

    #[test]
    fn test_ack_ignores_payload() {
        let body = r#"{"status": "success", "data": {"anything": 1}, "message": "Started"}"#;
        let envelope: ApiResponse<serde_json::Value> = decode_envelope(body).unwrap();
        assert_eq!(envelope.into_ack().unwrap(), Some("Started".to_string()));
    }

    #[test]
    fn test_decode_response_status_handling() {
        let unauthorized = decode_response::<SyncStatus>(401, r#"{"status": "error"}"#);
        assert_eq!(unauthorized.unwrap_err(), ClientError::Unauthorized);

        let no_content = decode_response::<serde_json::Value>(204, "");
        assert!(no_content.unwrap().is_success());

        let gateway = decode_response::<SyncStatus>(502, "<html>Bad Gateway</html>");
        assert_eq!(gateway.unwrap_err(), ClientError::Http { status: 502 });

        let enveloped = decode_response::<SyncStatus>(
            409,
            r#"{"status": "error", "code": "sync_running", "message": "Already syncing"}"#,
        );
        assert_eq!(
            enveloped.unwrap().into_result().unwrap_err(),
            ClientError::Api {
                code: Some("sync_running".to_string()),
                message: "Already syncing".to_string(),
            }
        );

        assert!(matches!(
            decode_response::<SyncStatus>(200, "not json"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_query_for_virtual_folders() {
        let unread = ListMailsQuery::for_selection(MailboxSelection::Virtual(VirtualFolder::Unread), 1);
        assert_eq!(unread.is_read, Some(false));
        assert_eq!(unread.folder_id, None);

        let starred =
            ListMailsQuery::for_selection(MailboxSelection::Virtual(VirtualFolder::Starred), 2);
        assert_eq!(starred.is_starred, Some(true));
        assert_eq!(starred.page, 2);

        let unclassified =
            ListMailsQuery::for_selection(MailboxSelection::Virtual(VirtualFolder::Unclassified), 1);
        assert_eq!(unclassified.is_classified, Some(false));

        let all = ListMailsQuery::for_selection(MailboxSelection::Virtual(VirtualFolder::All), 1);
        assert_eq!(all, ListMailsQuery::default());
    }

    #[test]
    fn test_query_for_folder() {
        let query = ListMailsQuery::for_selection(MailboxSelection::Folder(12), 0);
        assert_eq!(query.folder_id, Some(12));
        assert_eq!(query.page, 1);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "1".to_string()),
                ("page_size", "20".to_string()),
                ("folder_id", "12".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_search_and_page_size() {
        let query = ListMailsQuery::default()
            .with_search("  invoice ")
            .with_page_size(500);
        assert_eq!(query.search.as_deref(), Some("invoice"));
        assert_eq!(query.page_size, MAX_PAGE_SIZE);

        let blank = ListMailsQuery::default().with_search("   ");
        assert_eq!(blank.search, None);
    }

    #[test]
    fn test_count_only_query() {
        let query = ListMailsQuery::count_only(VirtualFolder::Unclassified);
        assert_eq!(query.page_size, 1);
        assert_eq!(query.is_classified, Some(false));
    }

    #[test]
    fn test_create_folder_validation() {
        let empty = CreateFolderRequest {
            name: String::new(),
            parent_id: None,
        };
        assert!(empty.validate().is_err());

        let ok = CreateFolderRequest {
            name: "Receipts".to_string(),
            parent_id: Some(4),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000/api/v1/", endpoints::SYNC_STATUS),
            "http://localhost:8000/api/v1/sync/status/"
        );
        assert_eq!(endpoints::mail(5), "/mails/5/");
    }
}
