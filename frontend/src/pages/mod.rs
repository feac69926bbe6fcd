pub mod callback;
pub mod landing;
pub mod login;
pub mod mail;
pub mod not_found;
