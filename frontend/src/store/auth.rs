use pigeon_shared::models::User;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

pub enum AuthAction {
    LoggedIn(User),
    LoggedOut,
}

impl Reducible for AuthState {
    type Action = AuthAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            AuthAction::LoggedIn(user) => Rc::new(AuthState { user: Some(user) }),
            AuthAction::LoggedOut => Rc::new(AuthState::default()),
        }
    }
}

pub type AuthContext = UseReducerHandle<AuthState>;
