use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum TeamLogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    MissingParameter(String),

    #[error("Log not found for member {member_id}, session {session_id}")]
    NotFound {
        member_id: String,
        session_id: String,
    },

    #[error("Log already exists for member {member_id}, session {session_id}")]
    Duplicate {
        member_id: String,
        session_id: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TeamLogError {
    /// True for errors caused by the caller's request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::MissingParameter(_)
                | Self::NotFound { .. }
                | Self::Duplicate { .. }
        )
    }
}
