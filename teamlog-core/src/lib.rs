pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod validation;
pub mod webhook;

pub use config::TeamLogConfig;
pub use error::TeamLogError;
pub use models::{CallLogRecord, CallLogSubmission, NewCallLog};
pub use store::{open_store, MemoryRecordStore, PgRecordStore, RecordStore};
pub use validation::ValidationError;
pub use webhook::{FeedbackNotification, WebhookClient, WebhookError};
