pub mod api;
pub mod error;
pub mod format;
pub mod models;
pub mod sync;
