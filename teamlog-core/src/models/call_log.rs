use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted call evaluation, one row per `(session_id, member_id)`.
///
/// Field names match the `"Team_Logs"` columns and the JSON wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CallLogRecord {
    pub session_id: String,
    pub member_id: String,
    pub team_id: String,
    pub date: DateTime<Utc>,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub user_avatar: Option<String>,
    pub agent_name: String,
    pub agent_picture: Option<String>,
    pub avatar_category: Option<String>,
    pub avatar_difficulty: Option<String>,
    pub call_recording_url: Option<String>,
    pub overall_score: Option<f64>,
    pub overall_score_text: Option<String>,
    pub engagement_score: Option<f64>,
    pub engagement_text: Option<String>,
    pub objection_handling_score: Option<f64>,
    pub objection_handling_text: Option<String>,
    pub information_gathering_score: Option<f64>,
    pub information_gathering_text: Option<String>,
    pub program_explanation_score: Option<f64>,
    pub program_explanation_text: Option<String>,
    pub closing_skills_score: Option<f64>,
    pub closing_skills_text: Option<String>,
    pub overall_effectiveness_score: Option<f64>,
    pub overall_effectiveness_text: Option<String>,
    pub transcript: Option<String>,
    pub power_moment: Option<String>,
    pub call_notes: Option<String>,
    pub level_up_plan_1: Option<String>,
    pub level_up_plan_2: Option<String>,
    pub level_up_plan_3: Option<String>,
    pub manager_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated submission, ready to insert. Produced by [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCallLog {
    pub session_id: String,
    pub member_id: String,
    pub team_id: String,
    pub date: DateTime<Utc>,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub user_avatar: Option<String>,
    pub agent_name: String,
    pub agent_picture: Option<String>,
    pub avatar_category: Option<String>,
    pub avatar_difficulty: Option<String>,
    pub call_recording_url: Option<String>,
    pub overall_score: Option<f64>,
    pub overall_score_text: Option<String>,
    pub engagement_score: Option<f64>,
    pub engagement_text: Option<String>,
    pub objection_handling_score: Option<f64>,
    pub objection_handling_text: Option<String>,
    pub information_gathering_score: Option<f64>,
    pub information_gathering_text: Option<String>,
    pub program_explanation_score: Option<f64>,
    pub program_explanation_text: Option<String>,
    pub closing_skills_score: Option<f64>,
    pub closing_skills_text: Option<String>,
    pub overall_effectiveness_score: Option<f64>,
    pub overall_effectiveness_text: Option<String>,
    pub transcript: Option<String>,
    pub power_moment: Option<String>,
    pub call_notes: Option<String>,
    pub level_up_plan_1: Option<String>,
    pub level_up_plan_2: Option<String>,
    pub level_up_plan_3: Option<String>,
    pub manager_feedback: Option<String>,
}

impl NewCallLog {
    /// Materialize the row a store would return, stamping both bookkeeping
    /// timestamps with `now`.
    pub fn into_record(self, now: DateTime<Utc>) -> CallLogRecord {
        CallLogRecord {
            session_id: self.session_id,
            member_id: self.member_id,
            team_id: self.team_id,
            date: self.date,
            user_name: self.user_name,
            user_picture: self.user_picture,
            user_avatar: self.user_avatar,
            agent_name: self.agent_name,
            agent_picture: self.agent_picture,
            avatar_category: self.avatar_category,
            avatar_difficulty: self.avatar_difficulty,
            call_recording_url: self.call_recording_url,
            overall_score: self.overall_score,
            overall_score_text: self.overall_score_text,
            engagement_score: self.engagement_score,
            engagement_text: self.engagement_text,
            objection_handling_score: self.objection_handling_score,
            objection_handling_text: self.objection_handling_text,
            information_gathering_score: self.information_gathering_score,
            information_gathering_text: self.information_gathering_text,
            program_explanation_score: self.program_explanation_score,
            program_explanation_text: self.program_explanation_text,
            closing_skills_score: self.closing_skills_score,
            closing_skills_text: self.closing_skills_text,
            overall_effectiveness_score: self.overall_effectiveness_score,
            overall_effectiveness_text: self.overall_effectiveness_text,
            transcript: self.transcript,
            power_moment: self.power_moment,
            call_notes: self.call_notes,
            level_up_plan_1: self.level_up_plan_1,
            level_up_plan_2: self.level_up_plan_2,
            level_up_plan_3: self.level_up_plan_3,
            manager_feedback: self.manager_feedback,
            created_at: now,
            updated_at: now,
        }
    }
}
