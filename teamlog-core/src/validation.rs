//! Request validation for new call logs.
//!
//! Runs before any store access: required identity/descriptive fields, the call
//! date, and the seven rubric scores. Pure functions only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CallLogSubmission, NewCallLog};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "Missing required fields: member_id, team_id, date, user_name, agent_name, and session_id are required (missing: {})",
        .0.join(", ")
    )]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date '{0}'. Expected an ISO-8601 date or timestamp")]
    InvalidDate(String),

    #[error("Invalid score for {field}. Must be a number between 0 and 100")]
    InvalidScore { field: &'static str },
}

/// Check a raw submission and convert it into a typed [`NewCallLog`].
///
/// Checks run in order: required fields, date, then each score in rubric order.
/// The first failing check is reported.
pub fn validate(submission: CallLogSubmission) -> Result<NewCallLog, ValidationError> {
    check_required(&submission)?;

    let date_text = submission.date.as_deref().unwrap_or_default();
    let date = parse_call_date(date_text)
        .ok_or_else(|| ValidationError::InvalidDate(date_text.to_string()))?;

    let overall_score = check_score("overall_score", submission.overall_score.as_ref())?;
    let engagement_score = check_score("engagement_score", submission.engagement_score.as_ref())?;
    let objection_handling_score = check_score(
        "objection_handling_score",
        submission.objection_handling_score.as_ref(),
    )?;
    let information_gathering_score = check_score(
        "information_gathering_score",
        submission.information_gathering_score.as_ref(),
    )?;
    let program_explanation_score = check_score(
        "program_explanation_score",
        submission.program_explanation_score.as_ref(),
    )?;
    let closing_skills_score =
        check_score("closing_skills_score", submission.closing_skills_score.as_ref())?;
    let overall_effectiveness_score = check_score(
        "overall_effectiveness_score",
        submission.overall_effectiveness_score.as_ref(),
    )?;

    Ok(NewCallLog {
        session_id: required(submission.session_id),
        member_id: required(submission.member_id),
        team_id: required(submission.team_id),
        date,
        user_name: required(submission.user_name),
        user_picture: non_empty(submission.user_picture),
        user_avatar: non_empty(submission.user_avatar),
        agent_name: required(submission.agent_name),
        agent_picture: non_empty(submission.agent_picture),
        avatar_category: non_empty(submission.avatar_category),
        avatar_difficulty: non_empty(submission.avatar_difficulty),
        call_recording_url: non_empty(submission.call_recording_url),
        overall_score,
        overall_score_text: non_empty(submission.overall_score_text),
        engagement_score,
        engagement_text: non_empty(submission.engagement_text),
        objection_handling_score,
        objection_handling_text: non_empty(submission.objection_handling_text),
        information_gathering_score,
        information_gathering_text: non_empty(submission.information_gathering_text),
        program_explanation_score,
        program_explanation_text: non_empty(submission.program_explanation_text),
        closing_skills_score,
        closing_skills_text: non_empty(submission.closing_skills_text),
        overall_effectiveness_score,
        overall_effectiveness_text: non_empty(submission.overall_effectiveness_text),
        transcript: non_empty(submission.transcript),
        power_moment: non_empty(submission.power_moment),
        call_notes: non_empty(submission.call_notes),
        level_up_plan_1: non_empty(submission.level_up_plan_1),
        level_up_plan_2: non_empty(submission.level_up_plan_2),
        level_up_plan_3: non_empty(submission.level_up_plan_3),
        manager_feedback: non_empty(submission.manager_feedback),
    })
}

/// All six identity/descriptive fields must be present and non-blank.
pub fn check_required(submission: &CallLogSubmission) -> Result<(), ValidationError> {
    let fields = [
        ("session_id", &submission.session_id),
        ("member_id", &submission.member_id),
        ("team_id", &submission.team_id),
        ("date", &submission.date),
        ("user_name", &submission.user_name),
        ("agent_name", &submission.agent_name),
    ];

    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| is_blank(value.as_deref()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// Absent scores pass as `None`; present ones must coerce to a finite number in range.
pub fn check_score(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<f64>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match coerce_score(value) {
        Some(score) if (MIN_SCORE..=MAX_SCORE).contains(&score) => Ok(Some(score)),
        _ => Err(ValidationError::InvalidScore { field }),
    }
}

/// Numbers pass through; strings are parsed after trimming. Anything else fails.
pub fn coerce_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then_some(score)
}

/// Parse the call date. Timestamps without an offset are taken as UTC, bare
/// dates as midnight UTC.
pub fn parse_call_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn required(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
