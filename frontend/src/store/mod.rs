//! Reducer-backed state for the mail view and the app shell.

pub mod auth;
pub mod folder;
pub mod mail;
pub mod toast;
