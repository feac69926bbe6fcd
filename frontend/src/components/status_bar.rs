use chrono::{DateTime, Utc};
use pigeon_shared::format::{format_relative, status_line};
use pigeon_shared::models::SyncStatus;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatusBarProps {
    pub status: Option<SyncStatus>,
    pub total_mails: u64,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub on_click: Callback<()>,
}

#[function_component(StatusBar)]
pub fn status_bar(props: &StatusBarProps) -> Html {
    let onclick = props.on_click.reform(|_: MouseEvent| ());
    let last_sync = match props.last_sync_at {
        Some(at) => format!("Last sync {}", format_relative(at, Utc::now())),
        None => "Never synced".to_string(),
    };

    html! {
        <footer class="status-bar" {onclick}>
            <span class="status-sync">{ status_line(props.status.as_ref()) }</span>
            <span class="status-total">{ format!("{} mails", props.total_mails) }</span>
            <span class="status-last-sync">{ last_sync }</span>
        </footer>
    }
}
