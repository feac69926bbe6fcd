use pigeon_shared::models::Folder;
use yew::prelude::*;

use crate::components::modal::Modal;
use crate::store::folder::flatten_folders;

#[derive(Properties, PartialEq)]
pub struct FolderSelectModalProps {
    pub folders: Vec<Folder>,
    /// Folder the mails are already in; it cannot be picked
    pub current: Option<i64>,
    pub on_select: Callback<i64>,
    pub on_close: Callback<()>,
}

#[function_component(FolderSelectModal)]
pub fn folder_select_modal(props: &FolderSelectModalProps) -> Html {
    let rows = flatten_folders(&props.folders);

    html! {
        <Modal title="Move to folder" on_close={props.on_close.clone()}>
            if rows.is_empty() {
                <p class="empty-state">{ "Create a folder first." }</p>
            }
            <ul class="folder-select">
                { for rows.into_iter().map(|(level, folder)| {
                    let id = folder.id;
                    let disabled = props.current == Some(id);
                    let onclick = props.on_select.reform(move |_: MouseEvent| id);
                    html! {
                        <li key={id}>
                            <button
                                class="folder-option"
                                style={format!("padding-left: {}rem", 1 + level)}
                                {disabled}
                                {onclick}
                            >
                                { &folder.name }
                                if disabled {
                                    <span class="folder-current">{ " (current)" }</span>
                                }
                            </button>
                        </li>
                    }
                })}
            </ul>
        </Modal>
    }
}
