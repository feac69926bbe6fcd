use yew::prelude::*;

use crate::store::toast::{ToastContext, Toaster};

#[hook]
pub fn use_toaster() -> Toaster {
    let context = use_context::<ToastContext>();
    Toaster::new(context.map(|toasts| toasts.dispatcher()))
}
