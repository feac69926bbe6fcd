use pigeon_shared::format::{format_percentage, format_remaining, status_line};
use pigeon_shared::models::{SyncKind, SyncState};
use yew::prelude::*;

use crate::components::modal::Modal;
use crate::hooks::SyncHandle;

#[derive(Properties, PartialEq)]
pub struct SyncProgressProps {
    pub on_close: Callback<()>,
}

/// Progress of the running sync, read from the surrounding `SyncHandle` context.
#[function_component(SyncProgress)]
pub fn sync_progress(props: &SyncProgressProps) -> Html {
    let sync = use_context::<SyncHandle>();
    let Some(status) = sync.as_ref().and_then(|sync| sync.status().cloned()) else {
        return html! {
            <Modal title="Sync" on_close={props.on_close.clone()}>
                <p>{ "Waiting for the server..." }</p>
            </Modal>
        };
    };

    let title = match status.kind {
        SyncKind::Initial => "Initial sync",
        SyncKind::Incremental => "Sync",
    };
    let progress = &status.progress;
    let on_stop = Callback::from(move |_: MouseEvent| {
        if let Some(sync) = &sync {
            sync.stop();
        }
    });

    html! {
        <Modal {title} on_close={props.on_close.clone()}>
            <p class="sync-state">{ status_line(Some(&status)) }</p>
            <div class="progress">
                <div
                    class="progress-fill"
                    style={format!("width: {}", format_percentage(progress.percentage))}
                />
            </div>
            <dl class="sync-details">
                <dt>{ "Synced" }</dt>
                <dd>{ format!("{} / {}", progress.synced, progress.total) }</dd>
                <dt>{ "Classified" }</dt>
                <dd>{ format!("{} / {}", progress.classified, progress.total) }</dd>
                <dt>{ "Remaining" }</dt>
                <dd>{ format_remaining(status.estimated_remaining) }</dd>
            </dl>
            if status.state == SyncState::InProgress {
                <button class="btn btn-danger" onclick={on_stop}>{ "Stop sync" }</button>
            }
        </Modal>
    }
}
