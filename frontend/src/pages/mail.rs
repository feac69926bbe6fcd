use pigeon_shared::api::{CreateFolderRequest, MoveMailsRequest, UpdateMailRequest};
use pigeon_shared::error::ClientError;
use pigeon_shared::models::{find_folder, VirtualFolder};
use pigeon_shared::sync::CompletionAction;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::folder_select_modal::FolderSelectModal;
use crate::components::header::Header;
use crate::components::mail_detail::MailDetail;
use crate::components::mail_list::MailList;
use crate::components::sidebar::Sidebar;
use crate::components::status_bar::StatusBar;
use crate::components::sync_progress::SyncProgress;
use crate::hooks::{use_sync, use_toaster, SyncHandle};
use crate::router::Route;
use crate::services::api::ApiService;
use crate::services::token::TokenStore;
use crate::store::auth::{AuthAction, AuthContext};
use crate::store::folder::{FolderAction, FolderState};
use crate::store::mail::{MailAction, MailState};

/// `/mail` requires a stored access token.
#[function_component(MailPage)]
pub fn mail_page() -> Html {
    if !TokenStore::is_authenticated() {
        return html! { <Redirect<Route> to={Route::Login} /> };
    }

    html! { <MailView /> }
}

#[function_component(MailView)]
fn mail_view() -> Html {
    let navigator = use_navigator();
    let auth = use_context::<AuthContext>();
    let toaster = use_toaster();
    let mails = use_reducer(MailState::default);
    let folders = use_reducer(FolderState::default);
    // Mail ids waiting for a target folder
    let moving = use_state(|| None::<Vec<i64>>);
    let show_progress = use_state(|| false);

    let sign_out = {
        let auth = auth.clone();
        let navigator = navigator.clone();
        Callback::from(move |route: Route| {
            TokenStore::clear();
            if let Some(auth) = &auth {
                auth.dispatch(AuthAction::LoggedOut);
            }
            if let Some(navigator) = &navigator {
                navigator.push(&route);
            }
        })
    };

    let report = {
        let toaster = toaster.clone();
        let sign_out = sign_out.clone();
        Callback::from(move |(context, error): (&'static str, ClientError)| {
            tracing::error!("{}: {}", context, error);
            if error == ClientError::Unauthorized {
                toaster.error("Your session expired. Please sign in again.");
                sign_out.emit(Route::Login);
            } else {
                toaster.error(format!("{}: {}", context, error));
            }
        })
    };

    let on_sync_action = {
        let mail_dispatch = mails.dispatcher();
        let folder_dispatch = folders.dispatcher();
        let toaster = toaster.clone();
        let report = report.clone();
        Callback::from(move |action: CompletionAction| {
            match reload_for(action) {
                Some(Reload::Mails) => mail_dispatch.dispatch(MailAction::Reload),
                Some(Reload::Folders) => folder_dispatch.dispatch(FolderAction::Reload),
                Some(Reload::Counts) => folder_dispatch.dispatch(FolderAction::ReloadCounts),
                None => {}
            }
            match action {
                CompletionAction::NotifySuccess => toaster.success("Sync completed"),
                CompletionAction::ClassifyUnclassified => {
                    let toaster = toaster.clone();
                    let report = report.clone();
                    spawn_local(async move {
                        match ApiService::classify_unclassified().await {
                            Ok(message) => toaster.success(
                                message.unwrap_or_else(|| "Classification started".to_string()),
                            ),
                            Err(e) => report.emit(("Automatic classification failed", e)),
                        }
                    });
                }
                _ => {}
            }
        })
    };
    let sync = use_sync(on_sync_action, toaster.clone());

    // Signed-in user, after a reload the auth state starts empty.
    {
        let auth = auth.clone();
        let report = report.clone();
        use_effect_with((), move |_| {
            if let Some(auth) = auth.filter(|auth| !auth.is_logged_in()) {
                spawn_local(async move {
                    match ApiService::me().await {
                        Ok(user) => auth.dispatch(AuthAction::LoggedIn(user)),
                        Err(e) => report.emit(("Failed to load your profile", e)),
                    }
                });
            }
            || ()
        });
    }

    {
        let dispatcher = folders.dispatcher();
        let report = report.clone();
        use_effect_with(folders.version, move |_| {
            spawn_local(async move {
                match ApiService::list_folders().await {
                    Ok(list) => dispatcher.dispatch(FolderAction::Loaded(list)),
                    Err(e) => report.emit(("Failed to load folders", e)),
                }
            });
            || ()
        });
    }

    {
        let dispatcher = folders.dispatcher();
        let report = report.clone();
        use_effect_with(folders.counts_version, move |_| {
            spawn_local(async move {
                match ApiService::virtual_counts().await {
                    Ok(counts) => dispatcher.dispatch(FolderAction::CountsLoaded(counts)),
                    Err(e) => report.emit(("Failed to load folder counts", e)),
                }
            });
            || ()
        });
    }

    {
        let dispatcher = mails.dispatcher();
        let report = report.clone();
        use_effect_with((mails.query(), mails.version), move |(query, _)| {
            let query = query.clone();
            let cancelled = Rc::new(Cell::new(false));
            {
                let cancelled = Rc::clone(&cancelled);
                dispatcher.dispatch(MailAction::Loading);
                spawn_local(async move {
                    let result = ApiService::list_mails(&query).await;
                    if cancelled.get() {
                        return;
                    }
                    match result {
                        Ok(page) => dispatcher.dispatch(MailAction::Loaded(page)),
                        Err(e) => {
                            dispatcher.dispatch(MailAction::LoadFailed);
                            report.emit(("Failed to load mails", e));
                        }
                    }
                });
            }
            move || cancelled.set(true)
        });
    }

    // Sidebar

    let on_select_virtual = {
        let mails = mails.clone();
        Callback::from(move |folder: VirtualFolder| mails.dispatch(MailAction::SelectVirtual(folder)))
    };
    let on_select_folder = {
        let mails = mails.clone();
        Callback::from(move |id: i64| mails.dispatch(MailAction::SelectFolder(id)))
    };
    let on_toggle_folder = {
        let folders = folders.clone();
        Callback::from(move |id: i64| folders.dispatch(FolderAction::ToggleExpanded(id)))
    };
    let on_create_folder = {
        let dispatcher = folders.dispatcher();
        let toaster = toaster.clone();
        let report = report.clone();
        Callback::from(move |name: String| {
            let dispatcher = dispatcher.clone();
            let toaster = toaster.clone();
            let report = report.clone();
            spawn_local(async move {
                let request = CreateFolderRequest {
                    name,
                    parent_id: None,
                };
                match ApiService::create_folder(request).await {
                    Ok(folder) => {
                        toaster.success(format!("Created folder {}", folder.name));
                        dispatcher.dispatch(FolderAction::Reload);
                    }
                    Err(e) => report.emit(("Failed to create folder", e)),
                }
            });
        })
    };

    // Mail list

    let on_search = {
        let mails = mails.clone();
        Callback::from(move |search: String| mails.dispatch(MailAction::Search(search)))
    };
    let on_page = {
        let mails = mails.clone();
        Callback::from(move |page: u32| mails.dispatch(MailAction::GoToPage(page)))
    };
    let on_toggle = {
        let mails = mails.clone();
        Callback::from(move |id: i64| mails.dispatch(MailAction::ToggleSelected(id)))
    };
    let on_select_all = {
        let mails = mails.clone();
        Callback::from(move |_| mails.dispatch(MailAction::SelectAll))
    };
    let on_clear_selection = {
        let mails = mails.clone();
        Callback::from(move |_| mails.dispatch(MailAction::ClearSelection))
    };

    let on_open = {
        let mail_dispatch = mails.dispatcher();
        let folder_dispatch = folders.dispatcher();
        let report = report.clone();
        Callback::from(move |id: i64| {
            let mail_dispatch = mail_dispatch.clone();
            let folder_dispatch = folder_dispatch.clone();
            let report = report.clone();
            spawn_local(async move {
                let mail = match ApiService::get_mail(id).await {
                    Ok(mail) => mail,
                    Err(e) => return report.emit(("Failed to open mail", e)),
                };
                let was_unread = !mail.summary.is_read;
                mail_dispatch.dispatch(MailAction::Select(id));
                mail_dispatch.dispatch(MailAction::Opened(mail));

                if was_unread {
                    let update = UpdateMailRequest {
                        is_read: Some(true),
                        ..UpdateMailRequest::default()
                    };
                    match ApiService::update_mail(id, update).await {
                        Ok(_) => {
                            mail_dispatch.dispatch(MailAction::Updated {
                                id,
                                is_read: Some(true),
                                is_starred: None,
                            });
                            folder_dispatch.dispatch(FolderAction::Reload);
                            folder_dispatch.dispatch(FolderAction::ReloadCounts);
                        }
                        Err(e) => report.emit(("Failed to mark mail as read", e)),
                    }
                }
            });
        })
    };

    let on_mark_selected_read = {
        let mails = mails.clone();
        let folder_dispatch = folders.dispatcher();
        let report = report.clone();
        Callback::from(move |_| {
            let ids: Vec<i64> = mails
                .mails
                .iter()
                .filter(|mail| mails.is_selected(mail.id) && !mail.is_read)
                .map(|mail| mail.id)
                .collect();
            let mail_dispatch = mails.dispatcher();
            let folder_dispatch = folder_dispatch.clone();
            let report = report.clone();
            spawn_local(async move {
                for id in ids {
                    let update = UpdateMailRequest {
                        is_read: Some(true),
                        ..UpdateMailRequest::default()
                    };
                    match ApiService::update_mail(id, update).await {
                        Ok(_) => mail_dispatch.dispatch(MailAction::Updated {
                            id,
                            is_read: Some(true),
                            is_starred: None,
                        }),
                        Err(e) => {
                            report.emit(("Failed to mark mails as read", e));
                            break;
                        }
                    }
                }
                folder_dispatch.dispatch(FolderAction::Reload);
                folder_dispatch.dispatch(FolderAction::ReloadCounts);
            });
        })
    };

    let on_move_selected = {
        let mails = mails.clone();
        let moving = moving.clone();
        Callback::from(move |_| {
            if !mails.selected.is_empty() {
                moving.set(Some(mails.selected.iter().copied().collect()));
            }
        })
    };

    // Mail detail

    let update_open = {
        let mails = mails.clone();
        let folder_dispatch = folders.dispatcher();
        let report = report.clone();
        Callback::from(move |update: UpdateMailRequest| {
            let Some(open) = &mails.open else {
                return;
            };
            let id = open.summary.id;
            let mail_dispatch = mails.dispatcher();
            let folder_dispatch = folder_dispatch.clone();
            let report = report.clone();
            spawn_local(async move {
                let (is_read, is_starred) = (update.is_read, update.is_starred);
                match ApiService::update_mail(id, update).await {
                    Ok(_) => {
                        mail_dispatch.dispatch(MailAction::Updated {
                            id,
                            is_read,
                            is_starred,
                        });
                        folder_dispatch.dispatch(FolderAction::ReloadCounts);
                        if is_read.is_some() {
                            folder_dispatch.dispatch(FolderAction::Reload);
                        }
                    }
                    Err(e) => report.emit(("Failed to update mail", e)),
                }
            });
        })
    };

    let on_toggle_star = {
        let mails = mails.clone();
        let update_open = update_open.clone();
        Callback::from(move |_| {
            if let Some(open) = &mails.open {
                update_open.emit(UpdateMailRequest {
                    is_starred: Some(!open.summary.is_starred),
                    ..UpdateMailRequest::default()
                });
            }
        })
    };
    let on_toggle_read = {
        let mails = mails.clone();
        Callback::from(move |_| {
            if let Some(open) = &mails.open {
                update_open.emit(UpdateMailRequest {
                    is_read: Some(!open.summary.is_read),
                    ..UpdateMailRequest::default()
                });
            }
        })
    };
    let on_close_mail = {
        let mails = mails.clone();
        Callback::from(move |_| mails.dispatch(MailAction::Close))
    };
    let on_move_open = {
        let mails = mails.clone();
        let moving = moving.clone();
        Callback::from(move |_| {
            if let Some(open) = &mails.open {
                moving.set(Some(vec![open.summary.id]));
            }
        })
    };
    let on_delete_open = {
        let mails = mails.clone();
        let folder_dispatch = folders.dispatcher();
        let toaster = toaster.clone();
        let report = report.clone();
        Callback::from(move |_| {
            let Some(open) = &mails.open else {
                return;
            };
            let id = open.summary.id;
            let mail_dispatch = mails.dispatcher();
            let folder_dispatch = folder_dispatch.clone();
            let toaster = toaster.clone();
            let report = report.clone();
            spawn_local(async move {
                match ApiService::delete_mail(id).await {
                    Ok(_) => {
                        toaster.success("Mail deleted");
                        mail_dispatch.dispatch(MailAction::Removed(vec![id]));
                        mail_dispatch.dispatch(MailAction::Reload);
                        folder_dispatch.dispatch(FolderAction::Reload);
                        folder_dispatch.dispatch(FolderAction::ReloadCounts);
                    }
                    Err(e) => report.emit(("Failed to delete mail", e)),
                }
            });
        })
    };

    // Folder select modal

    let move_current = match (&*moving, &mails.open) {
        (Some(ids), Some(open)) if ids.as_slice() == [open.summary.id] => {
            open.summary.folder.as_ref().map(|folder| folder.id)
        }
        _ => mails.selected_folder(),
    };
    let on_move_to = {
        let moving = moving.clone();
        let mail_dispatch = mails.dispatcher();
        let folder_dispatch = folders.dispatcher();
        let toaster = toaster.clone();
        let report = report.clone();
        Callback::from(move |folder_id: i64| {
            let Some(ids) = (*moving).clone() else {
                return;
            };
            moving.set(None);
            let mail_dispatch = mail_dispatch.clone();
            let folder_dispatch = folder_dispatch.clone();
            let toaster = toaster.clone();
            let report = report.clone();
            spawn_local(async move {
                let count = ids.len();
                let request = MoveMailsRequest {
                    mail_ids: ids,
                    folder_id,
                };
                match ApiService::move_mails(request).await {
                    Ok(_) => {
                        toaster.success(format!("Moved {} mail(s)", count));
                        mail_dispatch.dispatch(MailAction::ClearSelection);
                        mail_dispatch.dispatch(MailAction::Close);
                        mail_dispatch.dispatch(MailAction::Reload);
                        folder_dispatch.dispatch(FolderAction::Reload);
                        folder_dispatch.dispatch(FolderAction::ReloadCounts);
                    }
                    Err(e) => report.emit(("Failed to move mails", e)),
                }
            });
        })
    };
    let on_close_move = {
        let moving = moving.clone();
        Callback::from(move |_| moving.set(None))
    };

    // Header and sync

    let on_sync = {
        let sync = sync.clone();
        let show_progress = show_progress.clone();
        Callback::from(move |_| {
            sync.start();
            show_progress.set(true);
        })
    };
    let on_show_progress = {
        let sync = sync.clone();
        let show_progress = show_progress.clone();
        Callback::from(move |_| {
            sync.refresh();
            show_progress.set(true);
        })
    };
    let on_close_progress = {
        let show_progress = show_progress.clone();
        Callback::from(move |_| show_progress.set(false))
    };
    let on_logout = {
        let sync = sync.clone();
        let sign_out = sign_out.clone();
        Callback::from(move |_| {
            sync.clear();
            sign_out.emit(Route::Landing);
        })
    };

    let mailbox_title = match mails.selected_virtual() {
        Some(folder) => folder.label().to_string(),
        None => mails
            .selected_folder()
            .and_then(|id| find_folder(&folders.folders, id))
            .map(|folder| folder.path.clone())
            .unwrap_or_default(),
    };

    let user = auth.as_ref().and_then(|auth| auth.user.clone());
    let last_sync_at = sync
        .status()
        .and_then(|status| status.completed_at)
        .or_else(|| user.as_ref().and_then(|user| user.last_sync_at));

    html! {
        <ContextProvider<SyncHandle> context={sync.clone()}>
            <div class="mail-app">
                <Header
                    user={user.clone()}
                    syncing={sync.is_syncing()}
                    {on_sync}
                    on_show_progress={on_show_progress.clone()}
                    {on_logout}
                />
                <div class="mail-main">
                    <Sidebar
                        folders={folders.folders.clone()}
                        expanded={folders.expanded.clone()}
                        counts={folders.counts}
                        selection={mails.selection}
                        {on_select_virtual}
                        {on_select_folder}
                        {on_toggle_folder}
                        {on_create_folder}
                    />
                    <MailList
                        title={mailbox_title}
                        mails={mails.mails.clone()}
                        pagination={mails.pagination.clone()}
                        loading={mails.loading}
                        search={mails.search.clone()}
                        selected={mails.selected.clone()}
                        all_selected={mails.all_selected()}
                        open_id={mails.open.as_ref().map(|mail| mail.summary.id)}
                        {on_search}
                        {on_open}
                        {on_toggle}
                        {on_select_all}
                        {on_clear_selection}
                        {on_move_selected}
                        {on_mark_selected_read}
                        {on_page}
                    />
                    if let Some(mail) = &mails.open {
                        <MailDetail
                            mail={mail.clone()}
                            on_close={on_close_mail}
                            {on_toggle_star}
                            {on_toggle_read}
                            on_move={on_move_open}
                            on_delete={on_delete_open}
                        />
                    }
                </div>
                <StatusBar
                    status={sync.status().cloned()}
                    total_mails={folders.counts.all}
                    {last_sync_at}
                    on_click={on_show_progress}
                />
                if *show_progress {
                    <SyncProgress on_close={on_close_progress} />
                }
                if moving.is_some() {
                    <FolderSelectModal
                        folders={folders.folders.clone()}
                        current={move_current}
                        on_select={on_move_to}
                        on_close={on_close_move}
                    />
                }
            </div>
        </ContextProvider<SyncHandle>>
    }
}

/// Store reload triggered by a completion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reload {
    Mails,
    Folders,
    Counts,
}

/// Classification only reports back; the refresh actions already reload the stores.
fn reload_for(action: CompletionAction) -> Option<Reload> {
    match action {
        CompletionAction::RefreshMails => Some(Reload::Mails),
        CompletionAction::RefreshFolders => Some(Reload::Folders),
        CompletionAction::RefreshVirtualCounts => Some(Reload::Counts),
        CompletionAction::NotifySuccess | CompletionAction::ClassifyUnclassified => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_reloads_each_store_once() {
        let reloads: Vec<Reload> = CompletionAction::DEFAULT
            .into_iter()
            .filter_map(reload_for)
            .collect();
        assert_eq!(reloads, vec![Reload::Mails, Reload::Folders, Reload::Counts]);
        assert_eq!(reload_for(CompletionAction::ClassifyUnclassified), None);
    }
}
