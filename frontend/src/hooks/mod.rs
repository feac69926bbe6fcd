pub mod use_sync;
pub mod use_toaster;

pub use use_sync::{use_sync, SyncHandle};
pub use use_toaster::use_toaster;
