use pigeon_shared::models::{Folder, MailboxSelection, VirtualFolder, VirtualFolderCounts};
use std::collections::BTreeSet;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub folders: Vec<Folder>,
    pub expanded: BTreeSet<i64>,
    pub counts: VirtualFolderCounts,
    pub selection: MailboxSelection,
    pub on_select_virtual: Callback<VirtualFolder>,
    pub on_select_folder: Callback<i64>,
    pub on_toggle_folder: Callback<i64>,
    pub on_create_folder: Callback<String>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    let new_folder = use_state(String::new);

    let on_input = {
        let new_folder = new_folder.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            new_folder.set(input.value());
        })
    };

    let on_create = {
        let new_folder = new_folder.clone();
        let on_create_folder = props.on_create_folder.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let name = new_folder.trim().to_string();
            if name.is_empty() {
                return;
            }
            on_create_folder.emit(name);
            new_folder.set(String::new());
        })
    };

    html! {
        <aside class="sidebar">
            <ul class="virtual-folders">
                { for VirtualFolder::ALL.iter().map(|folder| {
                    let folder = *folder;
                    let active = props.selection == MailboxSelection::Virtual(folder);
                    let onclick = props.on_select_virtual.reform(move |_: MouseEvent| folder);
                    html! {
                        <li class={classes!("sidebar-item", active.then_some("active"))} {onclick}>
                            <span>{ folder.label() }</span>
                            <span class="count">{ props.counts.get(folder) }</span>
                        </li>
                    }
                })}
            </ul>

            <div class="sidebar-section">{ "Folders" }</div>
            if props.folders.is_empty() {
                <p class="sidebar-empty">{ "No folders yet" }</p>
            }
            <ul class="folder-tree">
                { for props.folders.iter().map(|folder| html! {
                    <FolderNode
                        key={folder.id}
                        folder={folder.clone()}
                        expanded={props.expanded.clone()}
                        selection={props.selection}
                        on_select={props.on_select_folder.clone()}
                        on_toggle={props.on_toggle_folder.clone()}
                    />
                })}
            </ul>

            <form class="new-folder" onsubmit={on_create}>
                <input
                    type="text"
                    placeholder="New folder"
                    maxlength="100"
                    value={(*new_folder).clone()}
                    oninput={on_input}
                />
                <button type="submit" class="btn btn-secondary">{ "+" }</button>
            </form>
        </aside>
    }
}

#[derive(Properties, PartialEq)]
struct FolderNodeProps {
    folder: Folder,
    expanded: BTreeSet<i64>,
    selection: MailboxSelection,
    on_select: Callback<i64>,
    on_toggle: Callback<i64>,
}

#[function_component(FolderNode)]
fn folder_node(props: &FolderNodeProps) -> Html {
    let folder = &props.folder;
    let id = folder.id;
    let is_open = props.expanded.contains(&id);
    let active = props.selection == MailboxSelection::Folder(id);

    let onclick = props.on_select.reform(move |_: MouseEvent| id);
    let on_toggle = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_toggle.emit(id);
        })
    };

    html! {
        <li>
            <div class={classes!("sidebar-item", active.then_some("active"))} {onclick}>
                if folder.has_children() {
                    <button class="folder-toggle" onclick={on_toggle}>
                        { if is_open { "▾" } else { "▸" } }
                    </button>
                } else {
                    <span class="folder-toggle-spacer" />
                }
                <span class="folder-name">{ &folder.name }</span>
                if folder.unread_count > 0 {
                    <span class="count">{ folder.unread_count }</span>
                }
            </div>
            if is_open && folder.has_children() {
                <ul class="folder-children">
                    { for folder.children.iter().map(|child| html! {
                        <FolderNode
                            key={child.id}
                            folder={child.clone()}
                            expanded={props.expanded.clone()}
                            selection={props.selection}
                            on_select={props.on_select.clone()}
                            on_toggle={props.on_toggle.clone()}
                        />
                    })}
                </ul>
            }
        </li>
    }
}
