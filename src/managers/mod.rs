pub mod bookmark_manager;
pub mod session_manager;
pub mod settings_manager;
pub mod user_manager;
