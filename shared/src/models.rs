use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in user as returned by `/auth/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    #[serde(default)]
    pub is_initial_sync_done: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Folders
// ============================================================================

/// Persisted folder, delivered as a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub depth: u32,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub mail_count: u64,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub children: Vec<Folder>,
}

impl Folder {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first search through this folder and its descendants.
    pub fn find(&self, id: i64) -> Option<&Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Look up a folder anywhere in a forest.
pub fn find_folder(folders: &[Folder], id: i64) -> Option<&Folder> {
    folders.iter().find_map(|folder| folder.find(id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub id: i64,
    pub name: String,
    pub path: String,
}

/// Computed views over the mailbox rather than persisted folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualFolder {
    All,
    Unread,
    Starred,
    Unclassified,
}

impl VirtualFolder {
    pub const ALL: [VirtualFolder; 4] = [
        VirtualFolder::All,
        VirtualFolder::Unread,
        VirtualFolder::Starred,
        VirtualFolder::Unclassified,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VirtualFolder::All => "All mail",
            VirtualFolder::Unread => "Unread",
            VirtualFolder::Starred => "Starred",
            VirtualFolder::Unclassified => "Unclassified",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VirtualFolder::All => "all",
            VirtualFolder::Unread => "unread",
            VirtualFolder::Starred => "starred",
            VirtualFolder::Unclassified => "unclassified",
        }
    }
}

impl std::str::FromStr for VirtualFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(VirtualFolder::All),
            "unread" => Ok(VirtualFolder::Unread),
            "starred" => Ok(VirtualFolder::Starred),
            "unclassified" => Ok(VirtualFolder::Unclassified),
            other => Err(format!("unknown virtual folder: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualFolderCounts {
    pub all: u64,
    pub unread: u64,
    pub starred: u64,
    pub unclassified: u64,
}

impl VirtualFolderCounts {
    pub fn get(&self, folder: VirtualFolder) -> u64 {
        match folder {
            VirtualFolder::All => self.all,
            VirtualFolder::Unread => self.unread,
            VirtualFolder::Starred => self.starred,
            VirtualFolder::Unclassified => self.unclassified,
        }
    }

    pub fn set(&mut self, folder: VirtualFolder, count: u64) {
        match folder {
            VirtualFolder::All => self.all = count,
            VirtualFolder::Unread => self.unread = count,
            VirtualFolder::Starred => self.starred = count,
            VirtualFolder::Unclassified => self.unclassified = count,
        }
    }
}

/// What the mail list is currently showing.
///
/// A persisted folder and a virtual folder are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSelection {
    Folder(i64),
    Virtual(VirtualFolder),
}

impl Default for MailboxSelection {
    fn default() -> Self {
        MailboxSelection::Virtual(VirtualFolder::All)
    }
}

// ============================================================================
// Mails
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailListItem {
    pub id: i64,
    pub gmail_id: String,
    pub thread_id: String,
    pub subject: String,
    pub sender: String,
    pub sender_email: String,
    #[serde(default)]
    pub snippet: String,
    pub folder: Option<FolderSummary>,
    #[serde(default)]
    pub has_attachments: bool,
    pub is_read: bool,
    pub is_starred: bool,
    pub is_classified: bool,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub kind: RecipientType,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Recipient {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// Full mail as returned by `/mails/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    #[serde(flatten)]
    pub summary: MailListItem,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub classification_reason: Option<String>,
}

impl Mail {
    /// Comma separated display names of recipients of the given kind.
    pub fn recipients_of(&self, kind: RecipientType) -> String {
        self.recipients
            .iter()
            .filter(|r| r.kind == kind)
            .map(Recipient::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

// ============================================================================
// Sync
// ============================================================================

/// Server-side state of the sync job.
///
/// Anything the client does not recognise (or a missing field) becomes
/// `Unrecognized`, which is treated as still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    InProgress,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unrecognized,
}

impl SyncState {
    /// Polling stays armed while this returns true.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::InProgress | SyncState::Unrecognized)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Completed | SyncState::Failed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Initial,
    #[default]
    Incremental,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncProgress {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub synced: u64,
    #[serde(default)]
    pub classified: u64,
    #[serde(default)]
    pub percentage: f64,
}

/// Status of the current or most recent sync run.
///
/// The client only ever fetches and caches this, it never builds one itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub sync_id: String,
    #[serde(default)]
    pub state: SyncState,
    #[serde(rename = "type", default)]
    pub kind: SyncKind,
    #[serde(default)]
    pub progress: SyncProgress,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Advisory, in seconds, possibly fractional
    #[serde(default)]
    pub estimated_remaining: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_deserialize() {
        let json = r#"{
            "sync_id": "a1b2",
            "state": "in_progress",
            "type": "initial",
            "progress": {"total": 20, "synced": 11, "classified": 4, "percentage": 55},
            "started_at": "2024-05-01T10:00:00Z",
            "completed_at": null,
            "estimated_remaining": 42
        }"#;

        let status: SyncStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, SyncState::InProgress);
        assert_eq!(status.kind, SyncKind::Initial);
        assert_eq!(status.progress.synced, 11);
        assert_eq!(status.progress.percentage, 55.0);
        assert_eq!(status.estimated_remaining, Some(42.0));
        assert!(status.started_at.is_some());
    }

    #[test]
    fn test_fractional_remaining_estimate() {
        let json = r#"{"sync_id": "a1b2", "state": "in_progress",
            "started_at": null, "completed_at": null, "estimated_remaining": 12.5}"#;
        let status: SyncStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, SyncState::InProgress);
        assert_eq!(status.estimated_remaining, Some(12.5));
    }

    #[test]
    fn test_unknown_sync_state_is_active() {
        let json = r#"{"sync_id": "x", "state": "paused", "started_at": null,
            "completed_at": null, "estimated_remaining": null}"#;
        let status: SyncStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, SyncState::Unrecognized);
        assert!(status.state.is_active());
        assert!(!status.state.is_terminal());
    }

    #[test]
    fn test_missing_sync_state_is_unrecognized() {
        let json = r#"{"sync_id": "x", "started_at": null, "completed_at": null,
            "estimated_remaining": null}"#;
        let status: SyncStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.state, SyncState::Unrecognized);
        assert_eq!(status.progress, SyncProgress::default());
    }

    #[test]
    fn test_mail_flattens_list_item() {
        let json = r#"{
            "id": 7, "gmail_id": "g7", "thread_id": "t7",
            "subject": "Hello", "sender": "Ann", "sender_email": "ann@example.com",
            "snippet": "hi", "folder": {"id": 3, "name": "Work", "path": "Work"},
            "has_attachments": false, "is_read": false, "is_starred": true,
            "is_classified": true, "received_at": "2024-05-01T10:00:00Z",
            "recipients": [
                {"type": "to", "email": "me@example.com", "name": "Me"},
                {"type": "cc", "email": "boss@example.com", "name": ""}
            ],
            "body_html": "<p>hi</p>", "attachments": [],
            "classification_reason": "Work thread"
        }"#;

        let mail: Mail = serde_json::from_str(json).unwrap();
        assert_eq!(mail.summary.id, 7);
        assert_eq!(mail.summary.folder.as_ref().unwrap().name, "Work");
        assert_eq!(mail.recipients_of(RecipientType::To), "Me");
        assert_eq!(mail.recipients_of(RecipientType::Cc), "boss@example.com");
    }

    #[test]
    fn test_find_folder_in_tree() {
        let child = Folder {
            id: 2,
            name: "Invoices".to_string(),
            path: "Work/Invoices".to_string(),
            depth: 1,
            parent_id: Some(1),
            mail_count: 3,
            unread_count: 1,
            order: 0,
            children: vec![],
        };
        let root = Folder {
            id: 1,
            name: "Work".to_string(),
            path: "Work".to_string(),
            depth: 0,
            parent_id: None,
            mail_count: 10,
            unread_count: 2,
            order: 0,
            children: vec![child],
        };

        let forest = vec![root];
        assert_eq!(find_folder(&forest, 2).unwrap().path, "Work/Invoices");
        assert!(find_folder(&forest, 9).is_none());
        assert!(forest[0].has_children());
    }

    #[test]
    fn test_virtual_folder_parse() {
        assert_eq!("starred".parse::<VirtualFolder>(), Ok(VirtualFolder::Starred));
        assert!("spam".parse::<VirtualFolder>().is_err());
    }
}
