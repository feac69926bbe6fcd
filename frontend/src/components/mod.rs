pub mod folder_select_modal;
pub mod header;
pub mod mail_detail;
pub mod mail_list;
pub mod mail_list_item;
pub mod modal;
pub mod pagination;
pub mod sidebar;
pub mod status_bar;
pub mod sync_progress;
pub mod toast;
