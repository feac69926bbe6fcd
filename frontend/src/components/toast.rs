use gloo::timers::callback::Timeout;
use yew::prelude::*;

use crate::store::toast::{Toast, ToastAction, ToastContext, TOAST_LIFETIME};

#[function_component(ToastContainer)]
pub fn toast_container() -> Html {
    let Some(toasts) = use_context::<ToastContext>() else {
        return html! {};
    };

    html! {
        <div class="toasts">
            { for toasts.toasts.iter().map(|toast| html! {
                <ToastView key={toast.id} toast={toast.clone()} />
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ToastViewProps {
    toast: Toast,
}

#[function_component(ToastView)]
fn toast_view(props: &ToastViewProps) -> Html {
    let dispatcher = use_context::<ToastContext>().map(|toasts| toasts.dispatcher());
    let id = props.toast.id;

    {
        let dispatcher = dispatcher.clone();
        use_effect_with(id, move |id| {
            let id = *id;
            let timeout = Timeout::new(TOAST_LIFETIME.as_millis() as u32, move || {
                if let Some(dispatcher) = dispatcher {
                    dispatcher.dispatch(ToastAction::Dismiss(id));
                }
            });
            move || drop(timeout)
        });
    }

    let on_dismiss = Callback::from(move |_: MouseEvent| {
        if let Some(dispatcher) = &dispatcher {
            dispatcher.dispatch(ToastAction::Dismiss(id));
        }
    });

    html! {
        <div class={props.toast.kind.class()} role="status">
            <span>{ &props.toast.message }</span>
            <button class="toast-close" onclick={on_dismiss}>{ "×" }</button>
        </div>
    }
}
