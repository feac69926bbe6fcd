use chrono::Utc;
use pigeon_shared::format::format_relative;
use pigeon_shared::models::MailListItem;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MailRowProps {
    pub mail: MailListItem,
    pub selected: bool,
    pub open: bool,
    pub on_open: Callback<i64>,
    pub on_toggle: Callback<i64>,
}

#[function_component(MailRow)]
pub fn mail_row(props: &MailRowProps) -> Html {
    let mail = &props.mail;
    let id = mail.id;

    let onclick = props.on_open.reform(move |_: MouseEvent| id);
    let on_check = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_toggle.emit(id);
        })
    };

    let subject = if mail.subject.is_empty() {
        "(no subject)".to_string()
    } else {
        mail.subject.clone()
    };

    html! {
        <div
            class={classes!(
                "mail-row",
                (!mail.is_read).then_some("unread"),
                props.selected.then_some("selected"),
                props.open.then_some("open"),
            )}
            {onclick}
        >
            <input type="checkbox" checked={props.selected} onclick={on_check} />
            <span class="mail-star">{ if mail.is_starred { "★" } else { "☆" } }</span>
            <span class="mail-sender" title={mail.sender_email.clone()}>{ &mail.sender }</span>
            <span class="mail-summary">
                <span class="mail-subject">{ subject }</span>
                <span class="mail-snippet">{ format!(" - {}", mail.snippet) }</span>
            </span>
            if mail.has_attachments {
                <span class="mail-attachment">{ "📎" }</span>
            }
            if let Some(folder) = &mail.folder {
                <span class="mail-folder">{ &folder.name }</span>
            }
            <span class="mail-date">{ format_relative(mail.received_at, Utc::now()) }</span>
        </div>
    }
}
