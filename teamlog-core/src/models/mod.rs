pub mod call_log;
pub mod submission;

pub use call_log::{CallLogRecord, NewCallLog};
pub use submission::CallLogSubmission;
