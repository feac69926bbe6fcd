use anyhow::{Context, Result};
use chrono::Utc;
use pigeon_shared::api::{
    CreateFolderRequest, ListMailsQuery, MoveMailsRequest, RenameFolderRequest, UpdateMailRequest,
};
use pigeon_shared::format::{format_file_size, format_relative, format_remaining, status_line};
use pigeon_shared::models::{Folder, MailboxSelection, RecipientType, SyncState, VirtualFolder};

use crate::client::{HttpClient, PigeonApi};
use crate::watcher::{ConsoleNotifier, SyncWatcher};
use crate::{Commands, FolderAction, MailAction, SyncAction};

pub async fn run(client: &HttpClient, command: Commands) -> Result<()> {
    match command {
        Commands::Sync { action } => handle_sync(client, action).await,
        Commands::Classify => {
            let message = client
                .classify_unclassified()
                .await
                .context("Failed to classify mails")?;
            println!(
                "{}",
                message.unwrap_or_else(|| "Classification started".to_string())
            );
            Ok(())
        }
        Commands::Mails { action } => handle_mails(client, action).await,
        Commands::Folders { action } => handle_folders(client, action).await,
        Commands::Counts => {
            let counts = client
                .virtual_counts()
                .await
                .context("Failed to fetch counts")?;
            for folder in VirtualFolder::ALL {
                println!("{:<14} {}", folder.label(), counts.get(folder));
            }
            Ok(())
        }
        Commands::Whoami => {
            let user = client.me().await.context("Failed to fetch user")?;
            println!("{} <{}>", user.name, user.email);
            match user.last_sync_at {
                Some(at) => println!("Last sync: {}", format_relative(at, Utc::now())),
                None => println!("Never synced"),
            }
            if !user.is_initial_sync_done {
                println!("Initial sync has not finished yet.");
            }
            Ok(())
        }
    }
}

async fn handle_sync(client: &HttpClient, action: SyncAction) -> Result<()> {
    let notifier = ConsoleNotifier;
    let mut watcher = SyncWatcher::new(client, &notifier);

    match action {
        SyncAction::Start { watch } => {
            watcher.start().await.context("Failed to start sync")?;
            if watch {
                follow(&mut watcher).await;
            }
        }
        SyncAction::Stop => {
            watcher.stop().await.context("Failed to stop sync")?;
            println!("Stop requested. Run `pigeon sync status` to see when it takes effect.");
        }
        SyncAction::Status => {
            let status = client
                .sync_status()
                .await
                .context("Failed to fetch sync status")?;
            println!("{}", status_line(Some(&status)));
            println!("    sync id:     {}", status.sync_id);
            println!(
                "    synced:      {}/{}",
                status.progress.synced, status.progress.total
            );
            println!(
                "    classified:  {}/{}",
                status.progress.classified, status.progress.total
            );
            if status.state == SyncState::InProgress {
                println!(
                    "    remaining:   {}",
                    format_remaining(status.estimated_remaining)
                );
            }
            if let Some(at) = status.completed_at {
                println!("    finished:    {}", format_relative(at, Utc::now()));
            }
        }
        SyncAction::Watch => follow(&mut watcher).await,
    }

    Ok(())
}

async fn follow(watcher: &mut SyncWatcher<'_, HttpClient, ConsoleNotifier>) {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    match watcher.watch(shutdown).await {
        Some(state) if state.is_active() || state.is_terminal() => {}
        Some(_) => println!("No sync running."),
        None => println!("Sync status unavailable."),
    }
}

async fn handle_mails(client: &HttpClient, action: MailAction) -> Result<()> {
    match action {
        MailAction::List {
            folder,
            virtual_folder,
            search,
            page,
            page_size,
        } => {
            let selection = match (folder, virtual_folder) {
                (Some(id), _) => MailboxSelection::Folder(id),
                (None, Some(name)) => MailboxSelection::Virtual(
                    name.parse().map_err(anyhow::Error::msg)?,
                ),
                (None, None) => MailboxSelection::default(),
            };
            let mut query =
                ListMailsQuery::for_selection(selection, page).with_page_size(page_size);
            if let Some(search) = search {
                query = query.with_search(search);
            }

            let response = client
                .list_mails(&query)
                .await
                .context("Failed to list mails")?;
            if response.mails.is_empty() {
                println!("No mails found.");
            }
            for mail in &response.mails {
                let read = if mail.is_read { " " } else { "•" };
                let star = if mail.is_starred { "★" } else { " " };
                let folder = mail
                    .folder
                    .as_ref()
                    .map(|f| f.path.as_str())
                    .unwrap_or("unclassified");
                println!(
                    "{}{} [{}] {} - {} ({})",
                    read, star, mail.id, mail.sender, mail.subject, folder
                );
            }
            let p = &response.pagination;
            println!(
                "Page {}/{} · {} mails",
                p.page,
                p.total_pages.max(1),
                p.total_count
            );
        }
        MailAction::Show { id } => {
            let mail = client.get_mail(id).await.context("Failed to fetch mail")?;
            let summary = &mail.summary;
            let subject = if summary.subject.is_empty() {
                "(no subject)"
            } else {
                summary.subject.as_str()
            };
            println!("{}", subject);
            println!("From:    {} <{}>", summary.sender, summary.sender_email);
            println!("To:      {}", mail.recipients_of(RecipientType::To));
            let cc = mail.recipients_of(RecipientType::Cc);
            if !cc.is_empty() {
                println!("Cc:      {}", cc);
            }
            println!("Date:    {}", summary.received_at.format("%Y-%m-%d %H:%M"));
            if let Some(folder) = &summary.folder {
                println!("Folder:  {}", folder.path);
            }
            if let Some(reason) = &mail.classification_reason {
                println!("Why:     {}", reason);
            }
            for attachment in &mail.attachments {
                println!(
                    "Attachment: {} ({})",
                    attachment.name,
                    format_file_size(attachment.size)
                );
            }
            println!();
            println!("{}", summary.snippet);
        }
        MailAction::Move { folder, ids } => {
            let count = ids.len();
            client
                .move_mails(&MoveMailsRequest {
                    mail_ids: ids,
                    folder_id: folder,
                })
                .await
                .context("Failed to move mails")?;
            println!("Moved {} mail(s) to folder {}", count, folder);
        }
        MailAction::Star { id, off } => {
            let update = UpdateMailRequest {
                is_starred: Some(!off),
                ..UpdateMailRequest::default()
            };
            client
                .update_mail(id, &update)
                .await
                .context("Failed to update mail")?;
            println!("{} mail {}", if off { "Unstarred" } else { "Starred" }, id);
        }
        MailAction::Read { id, unread } => {
            let update = UpdateMailRequest {
                is_read: Some(!unread),
                ..UpdateMailRequest::default()
            };
            client
                .update_mail(id, &update)
                .await
                .context("Failed to update mail")?;
            println!(
                "Marked mail {} as {}",
                id,
                if unread { "unread" } else { "read" }
            );
        }
        MailAction::Delete { id } => {
            client
                .delete_mail(id)
                .await
                .context("Failed to delete mail")?;
            println!("Deleted mail {}", id);
        }
    }

    Ok(())
}

async fn handle_folders(client: &HttpClient, action: FolderAction) -> Result<()> {
    match action {
        FolderAction::List => {
            let folders = client
                .list_folders()
                .await
                .context("Failed to list folders")?;
            if folders.is_empty() {
                println!("No folders found.");
            }
            for line in folder_lines(&folders) {
                println!("{}", line);
            }
        }
        FolderAction::Create { name, parent } => {
            let folder = client
                .create_folder(&CreateFolderRequest {
                    name,
                    parent_id: parent,
                })
                .await
                .context("Failed to create folder")?;
            println!("Created folder: [{}] {}", folder.id, folder.path);
        }
        FolderAction::Rename { id, name } => {
            let folder = client
                .rename_folder(id, &RenameFolderRequest { name })
                .await
                .context("Failed to rename folder")?;
            println!("Renamed folder: [{}] {}", folder.id, folder.path);
        }
        FolderAction::Delete { id } => {
            client
                .delete_folder(id)
                .await
                .context("Failed to delete folder")?;
            println!("Deleted folder: {}", id);
        }
    }

    Ok(())
}

/// Indented tree, one folder per line.
fn folder_lines(folders: &[Folder]) -> Vec<String> {
    fn walk(folder: &Folder, depth: usize, out: &mut Vec<String>) {
        let unread = if folder.unread_count > 0 {
            format!(" ({} unread)", folder.unread_count)
        } else {
            String::new()
        };
        out.push(format!(
            "{}[{}] {} · {} mails{}",
            "  ".repeat(depth),
            folder.id,
            folder.name,
            folder.mail_count,
            unread
        ));
        for child in &folder.children {
            walk(child, depth + 1, out);
        }
    }

    let mut lines = Vec::new();
    for folder in folders {
        walk(folder, 0, &mut lines);
    }
    lines
}
