pub mod json_store;
pub mod progress;
pub mod schema;
