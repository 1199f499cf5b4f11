pub mod key_decoder;
pub mod keyring;
pub mod persistent_store;
