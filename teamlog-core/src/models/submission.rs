use serde::Deserialize;
use serde_json::Value;

/// Raw create-request body. Everything is optional here so that missing or
/// malformed fields are reported by validation instead of by serde.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallLogSubmission {
    pub session_id: Option<String>,
    pub member_id: Option<String>,
    pub team_id: Option<String>,
    pub date: Option<String>,
    pub user_name: Option<String>,
    pub agent_name: Option<String>,
    pub user_picture: Option<String>,
    pub user_avatar: Option<String>,
    pub agent_picture: Option<String>,
    pub avatar_category: Option<String>,
    pub avatar_difficulty: Option<String>,
    pub call_recording_url: Option<String>,
    /// Scores may arrive as numbers or numeric strings.
    pub overall_score: Option<Value>,
    pub overall_score_text: Option<String>,
    pub engagement_score: Option<Value>,
    pub engagement_text: Option<String>,
    pub objection_handling_score: Option<Value>,
    pub objection_handling_text: Option<String>,
    pub information_gathering_score: Option<Value>,
    pub information_gathering_text: Option<String>,
    pub program_explanation_score: Option<Value>,
    pub program_explanation_text: Option<String>,
    pub closing_skills_score: Option<Value>,
    pub closing_skills_text: Option<String>,
    pub overall_effectiveness_score: Option<Value>,
    pub overall_effectiveness_text: Option<String>,
    pub transcript: Option<String>,
    pub power_moment: Option<String>,
    pub call_notes: Option<String>,
    pub level_up_plan_1: Option<String>,
    pub level_up_plan_2: Option<String>,
    pub level_up_plan_3: Option<String>,
    pub manager_feedback: Option<String>,
}
