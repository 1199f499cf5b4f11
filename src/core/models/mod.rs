pub mod key_id;
pub mod key_record;
pub mod live_identity;
pub mod record_schema;
