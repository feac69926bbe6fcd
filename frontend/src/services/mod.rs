pub mod api;
pub mod token;
