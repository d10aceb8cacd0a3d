use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::error::TeamLogError;
use crate::models::{CallLogRecord, NewCallLog};

use super::RecordStore;

const INSERT_SQL: &str = r#"
    INSERT INTO "Team_Logs" (
        session_id, member_id, team_id, date, user_name, user_picture, user_avatar,
        agent_name, agent_picture, avatar_category, avatar_difficulty, call_recording_url,
        overall_score, overall_score_text,
        engagement_score, engagement_text,
        objection_handling_score, objection_handling_text,
        information_gathering_score, information_gathering_text,
        program_explanation_score, program_explanation_text,
        closing_skills_score, closing_skills_text,
        overall_effectiveness_score, overall_effectiveness_text,
        transcript, power_moment, call_notes,
        level_up_plan_1, level_up_plan_2, level_up_plan_3,
        manager_feedback
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
        $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33
    )
    RETURNING *
"#;

const LIST_BY_TEAM_SQL: &str = r#"
    SELECT * FROM "Team_Logs"
    WHERE team_id = $1
    ORDER BY date DESC, created_at DESC
"#;

// updated_at must move forward even when two writes land in the same microsecond.
const UPDATE_FEEDBACK_SQL: &str = r#"
    UPDATE "Team_Logs"
    SET manager_feedback = $1,
        updated_at = GREATEST(now(), updated_at + INTERVAL '1 microsecond')
    WHERE member_id = $2
      AND session_id = $3
    RETURNING *
"#;

/// PostgreSQL-backed store. The pool connects on first use; the schema is
/// bootstrapped once, before the first statement, when enabled.
pub struct PgRecordStore {
    pool: PgPool,
    bootstrap_schema: bool,
    schema_ready: OnceCell<()>,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, bootstrap_schema: bool) -> Self {
        Self {
            pool,
            bootstrap_schema,
            schema_ready: OnceCell::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ready(&self) -> Result<(), sqlx::Error> {
        if !self.bootstrap_schema {
            return Ok(());
        }
        self.schema_ready
            .get_or_try_init(|| async {
                crate::db::ensure_schema(&self.pool).await?;
                tracing::info!("Team_Logs schema ready");
                Ok::<(), sqlx::Error>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, log: NewCallLog) -> Result<CallLogRecord, TeamLogError> {
        self.ready().await?;

        let result = sqlx::query_as::<_, CallLogRecord>(INSERT_SQL)
            .bind(&log.session_id)
            .bind(&log.member_id)
            .bind(&log.team_id)
            .bind(log.date)
            .bind(&log.user_name)
            .bind(&log.user_picture)
            .bind(&log.user_avatar)
            .bind(&log.agent_name)
            .bind(&log.agent_picture)
            .bind(&log.avatar_category)
            .bind(&log.avatar_difficulty)
            .bind(&log.call_recording_url)
            .bind(log.overall_score)
            .bind(&log.overall_score_text)
            .bind(log.engagement_score)
            .bind(&log.engagement_text)
            .bind(log.objection_handling_score)
            .bind(&log.objection_handling_text)
            .bind(log.information_gathering_score)
            .bind(&log.information_gathering_text)
            .bind(log.program_explanation_score)
            .bind(&log.program_explanation_text)
            .bind(log.closing_skills_score)
            .bind(&log.closing_skills_text)
            .bind(log.overall_effectiveness_score)
            .bind(&log.overall_effectiveness_text)
            .bind(&log.transcript)
            .bind(&log.power_moment)
            .bind(&log.call_notes)
            .bind(&log.level_up_plan_1)
            .bind(&log.level_up_plan_2)
            .bind(&log.level_up_plan_3)
            .bind(&log.manager_feedback)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(record) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(TeamLogError::Duplicate {
                    member_id: log.member_id,
                    session_id: log.session_id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_team(&self, team_id: &str) -> Result<Vec<CallLogRecord>, TeamLogError> {
        self.ready().await?;

        let rows = sqlx::query_as::<_, CallLogRecord>(LIST_BY_TEAM_SQL)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_feedback(
        &self,
        member_id: &str,
        session_id: &str,
        manager_feedback: &str,
    ) -> Result<Option<CallLogRecord>, TeamLogError> {
        self.ready().await?;

        let row = sqlx::query_as::<_, CallLogRecord>(UPDATE_FEEDBACK_SQL)
            .bind(manager_feedback)
            .bind(member_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn health(&self) -> Result<String, TeamLogError> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    fn backend(&self) -> &str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}
