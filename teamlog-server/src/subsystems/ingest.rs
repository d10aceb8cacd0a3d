use teamlog_core::{validation, CallLogRecord, CallLogSubmission, RecordStore, TeamLogError};

/// Validate a submission and insert it as a new call log.
///
/// Validation failures return before the store is touched.
pub async fn create_call_log(
    store: &dyn RecordStore,
    submission: CallLogSubmission,
) -> Result<CallLogRecord, TeamLogError> {
    let new_log = match validation::validate(submission) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected call log submission");
            return Err(e.into());
        }
    };

    let record = store.insert(new_log).await?;

    tracing::info!(
        session_id = %record.session_id,
        member_id = %record.member_id,
        team_id = %record.team_id,
        backend = store.backend(),
        "Call log created"
    );

    Ok(record)
}
