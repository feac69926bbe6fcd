use pigeon_shared::format::format_file_size;
use pigeon_shared::models::{Mail, RecipientType};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MailDetailProps {
    pub mail: Mail,
    pub on_close: Callback<()>,
    pub on_toggle_star: Callback<()>,
    pub on_toggle_read: Callback<()>,
    pub on_move: Callback<()>,
    pub on_delete: Callback<()>,
}

#[function_component(MailDetail)]
pub fn mail_detail(props: &MailDetailProps) -> Html {
    let mail = &props.mail;
    let summary = &mail.summary;
    let to = mail.recipients_of(RecipientType::To);
    let cc = mail.recipients_of(RecipientType::Cc);

    let on_close = props.on_close.reform(|_: MouseEvent| ());
    let on_star = props.on_toggle_star.reform(|_: MouseEvent| ());
    let on_read = props.on_toggle_read.reform(|_: MouseEvent| ());
    let on_move = props.on_move.reform(|_: MouseEvent| ());
    let on_delete = props.on_delete.reform(|_: MouseEvent| ());

    html! {
        <article class="mail-detail">
            <div class="mail-detail-actions">
                <button class="btn btn-secondary" onclick={on_close}>{ "← Back" }</button>
                <button class="btn btn-secondary" onclick={on_star}>
                    { if summary.is_starred { "Unstar" } else { "Star" } }
                </button>
                <button class="btn btn-secondary" onclick={on_read}>
                    { if summary.is_read { "Mark unread" } else { "Mark read" } }
                </button>
                <button class="btn btn-secondary" onclick={on_move}>{ "Move" }</button>
                <button class="btn btn-danger" onclick={on_delete}>{ "Delete" }</button>
            </div>

            <h2 class="mail-detail-subject">
                { if summary.subject.is_empty() { "(no subject)" } else { summary.subject.as_str() } }
            </h2>
            <div class="mail-detail-meta">
                <div>
                    <strong>{ &summary.sender }</strong>
                    { format!(" <{}>", summary.sender_email) }
                </div>
                if !to.is_empty() {
                    <div>{ format!("To: {}", to) }</div>
                }
                if !cc.is_empty() {
                    <div>{ format!("Cc: {}", cc) }</div>
                }
                <div class="mail-detail-date">
                    { summary.received_at.format("%Y-%m-%d %H:%M").to_string() }
                </div>
            </div>

            if summary.is_classified {
                <div class="classification">
                    if let Some(folder) = &summary.folder {
                        <span class="classification-folder">{ format!("Filed under {}", folder.path) }</span>
                    }
                    if let Some(reason) = &mail.classification_reason {
                        <p class="classification-reason">{ reason }</p>
                    }
                </div>
            }

            if !mail.attachments.is_empty() {
                <ul class="attachments">
                    { for mail.attachments.iter().map(|attachment| html! {
                        <li key={attachment.id.clone()} title={attachment.mime_type.clone()}>
                            { format!("📎 {} ({})", attachment.name, format_file_size(attachment.size)) }
                        </li>
                    })}
                </ul>
            }

            // Scripts and same-origin access stay disabled for mail HTML.
            <iframe class="mail-body" sandbox="" srcdoc={mail.body_html.clone()} title="Mail body" />
        </article>
    }
}
