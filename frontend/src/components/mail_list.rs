use pigeon_shared::models::{MailListItem, Pagination};
use std::collections::BTreeSet;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::components::mail_list_item::MailRow;
use crate::components::pagination::PaginationBar;

#[derive(Properties, PartialEq)]
pub struct MailListProps {
    pub title: String,
    pub mails: Vec<MailListItem>,
    pub pagination: Option<Pagination>,
    pub loading: bool,
    pub search: String,
    pub selected: BTreeSet<i64>,
    pub all_selected: bool,
    pub open_id: Option<i64>,
    pub on_search: Callback<String>,
    pub on_open: Callback<i64>,
    pub on_toggle: Callback<i64>,
    pub on_select_all: Callback<()>,
    pub on_clear_selection: Callback<()>,
    pub on_move_selected: Callback<()>,
    pub on_mark_selected_read: Callback<()>,
    pub on_page: Callback<u32>,
}

#[function_component(MailList)]
pub fn mail_list(props: &MailListProps) -> Html {
    let draft = use_state(|| props.search.clone());

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            draft.set(input.value());
        })
    };

    let on_submit = {
        let draft = draft.clone();
        let on_search = props.on_search.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_search.emit((*draft).clone());
        })
    };

    let on_check_all = {
        let all_selected = props.all_selected;
        let on_select_all = props.on_select_all.clone();
        let on_clear = props.on_clear_selection.clone();
        Callback::from(move |_: MouseEvent| {
            if all_selected {
                on_clear.emit(());
            } else {
                on_select_all.emit(());
            }
        })
    };
    let on_move = props.on_move_selected.reform(|_: MouseEvent| ());
    let on_mark_read = props.on_mark_selected_read.reform(|_: MouseEvent| ());
    let on_clear = props.on_clear_selection.reform(|_: MouseEvent| ());

    html! {
        <section class="mail-list">
            <h2 class="mail-list-title">{ &props.title }</h2>
            <form class="mail-search" onsubmit={on_submit}>
                <input
                    type="search"
                    placeholder="Search mail"
                    value={(*draft).clone()}
                    oninput={on_input}
                />
            </form>

            <div class="mail-toolbar">
                <input
                    type="checkbox"
                    title="Select all"
                    checked={props.all_selected}
                    onclick={on_check_all}
                />
                if !props.selected.is_empty() {
                    <span class="selection-count">{ format!("{} selected", props.selected.len()) }</span>
                    <button class="btn btn-secondary" onclick={on_move}>{ "Move" }</button>
                    <button class="btn btn-secondary" onclick={on_mark_read}>{ "Mark read" }</button>
                    <button class="btn btn-secondary" onclick={on_clear}>{ "Clear" }</button>
                }
            </div>

            if props.loading {
                <div class="loading">
                    <div class="spinner"></div>
                </div>
            } else if props.mails.is_empty() {
                <div class="empty-state">
                    <p>{ "No mails here." }</p>
                </div>
            } else {
                <div class="mail-rows">
                    { for props.mails.iter().map(|mail| html! {
                        <MailRow
                            key={mail.id}
                            mail={mail.clone()}
                            selected={props.selected.contains(&mail.id)}
                            open={props.open_id == Some(mail.id)}
                            on_open={props.on_open.clone()}
                            on_toggle={props.on_toggle.clone()}
                        />
                    })}
                </div>
            }

            if let Some(pagination) = &props.pagination {
                <PaginationBar pagination={pagination.clone()} on_page={props.on_page.clone()} />
            }
        </section>
    }
}
