use teamlog_core::{CallLogRecord, RecordStore, TeamLogError};

use crate::subsystems::present;

/// List every call log for a team, newest call first.
///
/// Both identifiers are required. `member_id` does not narrow the result:
/// the team view shows all members' calls.
pub async fn list_team_logs(
    store: &dyn RecordStore,
    team_id: Option<&str>,
    member_id: Option<&str>,
) -> Result<Vec<CallLogRecord>, TeamLogError> {
    let (team_id, member_id) = match (present(team_id), present(member_id)) {
        (Some(t), Some(m)) => (t, m),
        _ => {
            return Err(TeamLogError::MissingParameter(
                "Team ID and Member ID required".to_string(),
            ))
        }
    };

    let rows = store.list_by_team(team_id).await?;

    tracing::debug!(
        team_id = %team_id,
        member_id = %member_id,
        count = rows.len(),
        "Listed team call logs"
    );

    Ok(rows)
}
