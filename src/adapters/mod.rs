pub mod decoders;
pub mod keyrings;
pub mod stores;
