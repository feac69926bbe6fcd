use std::rc::Rc;
use std::time::Duration;
use yew::prelude::*;

/// Toasts disappear on their own after this long.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
    next_id: u32,
}

pub enum ToastAction {
    Push(ToastKind, String),
    Dismiss(u32),
}

impl Reducible for ToastState {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut state = (*self).clone();
        match action {
            ToastAction::Push(kind, message) => {
                state.toasts.push(Toast {
                    id: state.next_id,
                    kind,
                    message,
                });
                state.next_id = state.next_id.wrapping_add(1);
            }
            ToastAction::Dismiss(id) => state.toasts.retain(|toast| toast.id != id),
        }
        Rc::new(state)
    }
}

pub type ToastContext = UseReducerHandle<ToastState>;

/// Fire-and-forget notifications; a no-op outside a toast provider.
#[derive(Clone, PartialEq)]
pub struct Toaster(Option<UseReducerDispatcher<ToastState>>);

impl Toaster {
    pub fn new(dispatcher: Option<UseReducerDispatcher<ToastState>>) -> Self {
        Self(dispatcher)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    fn push(&self, kind: ToastKind, message: String) {
        match &self.0 {
            Some(dispatcher) => dispatcher.dispatch(ToastAction::Push(kind, message)),
            None => tracing::warn!("No toast provider for: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_increasing_ids() {
        let state = Rc::new(ToastState::default())
            .reduce(ToastAction::Push(ToastKind::Success, "Sync completed".to_string()))
            .reduce(ToastAction::Push(ToastKind::Error, "Sync failed".to_string()));

        let ids: Vec<u32> = state.toasts.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(state.toasts[1].kind, ToastKind::Error);
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let state = Rc::new(ToastState::default())
            .reduce(ToastAction::Push(ToastKind::Info, "a".to_string()))
            .reduce(ToastAction::Push(ToastKind::Info, "b".to_string()))
            .reduce(ToastAction::Dismiss(0));

        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.toasts[0].message, "b");

        // ids are never reused after a dismiss
        let state = state.reduce(ToastAction::Push(ToastKind::Info, "c".to_string()));
        assert_eq!(state.toasts[1].id, 2);
    }
}
