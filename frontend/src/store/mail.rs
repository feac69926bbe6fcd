use pigeon_shared::api::{ListMailsQuery, ListMailsResponse, DEFAULT_PAGE};
use pigeon_shared::models::{Mail, MailListItem, MailboxSelection, Pagination, VirtualFolder};
use std::collections::BTreeSet;
use std::rc::Rc;
use yew::prelude::*;

/// Mail list, its filters, the checkbox selection and the opened mail.
#[derive(Debug, Clone, PartialEq)]
pub struct MailState {
    pub selection: MailboxSelection,
    pub page: u32,
    pub search: String,
    pub mails: Vec<MailListItem>,
    pub pagination: Option<Pagination>,
    pub loading: bool,
    pub selected: BTreeSet<i64>,
    pub open: Option<Mail>,
    /// Bumped to refetch the current page without changing filters
    pub version: u32,
}

impl Default for MailState {
    fn default() -> Self {
        Self {
            selection: MailboxSelection::default(),
            page: DEFAULT_PAGE,
            search: String::new(),
            mails: Vec::new(),
            pagination: None,
            loading: true,
            selected: BTreeSet::new(),
            open: None,
            version: 0,
        }
    }
}

impl MailState {
    pub fn query(&self) -> ListMailsQuery {
        ListMailsQuery::for_selection(self.selection, self.page).with_search(self.search.clone())
    }

    pub fn selected_folder(&self) -> Option<i64> {
        match self.selection {
            MailboxSelection::Folder(id) => Some(id),
            MailboxSelection::Virtual(_) => None,
        }
    }

    pub fn selected_virtual(&self) -> Option<VirtualFolder> {
        match self.selection {
            MailboxSelection::Virtual(folder) => Some(folder),
            MailboxSelection::Folder(_) => None,
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn all_selected(&self) -> bool {
        !self.mails.is_empty() && self.mails.iter().all(|mail| self.selected.contains(&mail.id))
    }

    fn change_filter(&mut self) {
        self.page = DEFAULT_PAGE;
        self.selected.clear();
        self.open = None;
    }
}

pub enum MailAction {
    SelectFolder(i64),
    SelectVirtual(VirtualFolder),
    Search(String),
    GoToPage(u32),
    Loading,
    Loaded(ListMailsResponse),
    LoadFailed,
    /// Replace the checkbox selection with a single mail
    Select(i64),
    ToggleSelected(i64),
    SelectAll,
    ClearSelection,
    Opened(Mail),
    Close,
    Updated {
        id: i64,
        is_read: Option<bool>,
        is_starred: Option<bool>,
    },
    Removed(Vec<i64>),
    Reload,
}

impl Reducible for MailState {
    type Action = MailAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut state = (*self).clone();
        match action {
            MailAction::SelectFolder(id) => {
                state.selection = MailboxSelection::Folder(id);
                state.change_filter();
            }
            MailAction::SelectVirtual(folder) => {
                state.selection = MailboxSelection::Virtual(folder);
                state.change_filter();
            }
            MailAction::Search(search) => {
                state.search = search.trim().to_string();
                state.change_filter();
            }
            MailAction::GoToPage(page) => {
                state.page = page.max(DEFAULT_PAGE);
                state.selected.clear();
            }
            MailAction::Loading => state.loading = true,
            MailAction::Loaded(response) => {
                state.selected.retain(|id| response.mails.iter().any(|m| m.id == *id));
                state.mails = response.mails;
                state.pagination = Some(response.pagination);
                state.loading = false;
            }
            MailAction::LoadFailed => state.loading = false,
            MailAction::Select(id) => {
                state.selected.clear();
                state.selected.insert(id);
            }
            MailAction::ToggleSelected(id) => {
                if !state.selected.remove(&id) {
                    state.selected.insert(id);
                }
            }
            MailAction::SelectAll => {
                state.selected = state.mails.iter().map(|mail| mail.id).collect();
            }
            MailAction::ClearSelection => state.selected.clear(),
            MailAction::Opened(mail) => state.open = Some(mail),
            MailAction::Close => state.open = None,
            MailAction::Updated {
                id,
                is_read,
                is_starred,
            } => {
                let apply = |item: &mut MailListItem| {
                    if let Some(read) = is_read {
                        item.is_read = read;
                    }
                    if let Some(starred) = is_starred {
                        item.is_starred = starred;
                    }
                };
                if let Some(item) = state.mails.iter_mut().find(|m| m.id == id) {
                    apply(item);
                }
                if let Some(open) = state.open.as_mut().filter(|m| m.summary.id == id) {
                    apply(&mut open.summary);
                }
            }
            MailAction::Removed(ids) => {
                state.mails.retain(|mail| !ids.contains(&mail.id));
                state.selected.retain(|id| !ids.contains(id));
                if state
                    .open
                    .as_ref()
                    .is_some_and(|mail| ids.contains(&mail.summary.id))
                {
                    state.open = None;
                }
            }
            MailAction::Reload => state.version = state.version.wrapping_add(1),
        }
        Rc::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: i64, is_read: bool) -> MailListItem {
        MailListItem {
            id,
            gmail_id: format!("g{}", id),
            thread_id: format!("t{}", id),
            subject: format!("Mail {}", id),
            sender: "Ann".to_string(),
            sender_email: "ann@example.com".to_string(),
            snippet: String::new(),
            folder: None,
            has_attachments: false,
            is_read,
            is_starred: false,
            is_classified: false,
            received_at: Utc::now(),
        }
    }

    fn loaded(ids: &[i64]) -> MailAction {
        MailAction::Loaded(ListMailsResponse {
            mails: ids.iter().map(|id| item(*id, false)).collect(),
            pagination: Pagination {
                page: 1,
                page_size: 20,
                total_count: ids.len() as u64,
                total_pages: 1,
                has_next: false,
                has_prev: false,
            },
        })
    }

    #[test]
    fn test_folder_and_virtual_selection_are_exclusive() {
        let state = Rc::new(MailState::default()).reduce(MailAction::SelectFolder(7));
        assert_eq!(state.selected_folder(), Some(7));
        assert_eq!(state.selected_virtual(), None);
        assert_eq!(state.query().folder_id, Some(7));

        let state = state.reduce(MailAction::SelectVirtual(VirtualFolder::Starred));
        assert_eq!(state.selected_folder(), None);
        assert_eq!(state.selected_virtual(), Some(VirtualFolder::Starred));
        let query = state.query();
        assert_eq!(query.folder_id, None);
        assert_eq!(query.is_starred, Some(true));
    }

    #[test]
    fn test_changing_filter_resets_page_and_selection() {
        let state = Rc::new(MailState::default())
            .reduce(loaded(&[1, 2, 3]))
            .reduce(MailAction::GoToPage(3))
            .reduce(MailAction::ToggleSelected(2));
        assert_eq!(state.page, 3);

        let state = state.reduce(MailAction::SelectFolder(4));
        assert_eq!(state.page, 1);
        assert!(state.selected.is_empty());

        let state = state
            .reduce(MailAction::GoToPage(2))
            .reduce(MailAction::Search("  invoices ".to_string()));
        assert_eq!(state.page, 1);
        assert_eq!(state.query().search.as_deref(), Some("invoices"));
    }

    #[test]
    fn test_selection_actions() {
        let state = Rc::new(MailState::default())
            .reduce(loaded(&[1, 2, 3]))
            .reduce(MailAction::ToggleSelected(1))
            .reduce(MailAction::ToggleSelected(2))
            .reduce(MailAction::ToggleSelected(1));
        assert_eq!(state.selected.iter().copied().collect::<Vec<_>>(), vec![2]);

        let state = state.reduce(MailAction::Select(3));
        assert_eq!(state.selected.iter().copied().collect::<Vec<_>>(), vec![3]);

        let state = state.reduce(MailAction::SelectAll);
        assert!(state.all_selected());

        let state = state.reduce(MailAction::ClearSelection);
        assert!(state.selected.is_empty());
        assert!(!state.all_selected());
    }

    #[test]
    fn test_reload_keeps_only_visible_selection() {
        let state = Rc::new(MailState::default())
            .reduce(loaded(&[1, 2]))
            .reduce(MailAction::SelectAll)
            .reduce(loaded(&[2, 5]));
        assert_eq!(state.selected.iter().copied().collect::<Vec<_>>(), vec![2]);
        assert!(!state.loading);
    }

    #[test]
    fn test_update_and_remove() {
        let state = Rc::new(MailState::default())
            .reduce(loaded(&[1, 2]))
            .reduce(MailAction::Updated {
                id: 2,
                is_read: Some(true),
                is_starred: None,
            });
        assert!(state.mails[1].is_read);
        assert!(!state.mails[1].is_starred);

        let state = state
            .reduce(MailAction::Select(1))
            .reduce(MailAction::Removed(vec![1]));
        assert_eq!(state.mails.len(), 1);
        assert!(state.selected.is_empty());
    }
}
