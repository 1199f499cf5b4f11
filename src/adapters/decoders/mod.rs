pub mod legacy_pem;
pub mod openssh_decoder;
