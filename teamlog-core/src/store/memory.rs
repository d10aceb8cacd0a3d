use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use tokio::sync::RwLock;

use crate::error::TeamLogError;
use crate::models::{CallLogRecord, NewCallLog};

use super::RecordStore;

/// In-process store with the same contract as the PostgreSQL table:
/// unique `(session_id, member_id)`, date-descending listing, and an
/// `updated_at` that strictly advances on every feedback write.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<CallLogRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

/// Current time at the microsecond resolution PostgreSQL stores.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::microseconds(1)).unwrap_or(now)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, log: NewCallLog) -> Result<CallLogRecord, TeamLogError> {
        let mut rows = self.rows.write().await;

        let exists = rows
            .iter()
            .any(|r| r.session_id == log.session_id && r.member_id == log.member_id);
        if exists {
            return Err(TeamLogError::Duplicate {
                member_id: log.member_id,
                session_id: log.session_id,
            });
        }

        let record = log.into_record(now_micros());
        rows.push(record.clone());
        Ok(record)
    }

    async fn list_by_team(&self, team_id: &str) -> Result<Vec<CallLogRecord>, TeamLogError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<CallLogRecord> =
            rows.iter().filter(|r| r.team_id == team_id).cloned().collect();
        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(matching)
    }

    async fn update_feedback(
        &self,
        member_id: &str,
        session_id: &str,
        manager_feedback: &str,
    ) -> Result<Option<CallLogRecord>, TeamLogError> {
        let mut rows = self.rows.write().await;

        let Some(row) = rows
            .iter_mut()
            .find(|r| r.member_id == member_id && r.session_id == session_id)
        else {
            return Ok(None);
        };

        row.manager_feedback = Some(manager_feedback.to_string());
        row.updated_at = now_micros().max(row.updated_at + Duration::microseconds(1));
        Ok(Some(row.clone()))
    }

    async fn health(&self) -> Result<String, TeamLogError> {
        Ok(format!("memory ({} rows)", self.len().await))
    }

    fn backend(&self) -> &str {
        "memory"
    }
}
