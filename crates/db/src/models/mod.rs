pub mod record;

pub use record::{CreateRecord, CreatedRecord, Record, RecordFields, UpdateRecord};
