pub mod callbacks;
pub mod key_manager;
