pub mod memory_keyring;
