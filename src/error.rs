use thiserror::Error;

/// Crate-wide error type.
///
/// Nothing here is fatal to the caller: remote failures are recovered by the
/// local fallback path, validation failures are shown to the user, and
/// storage parse failures are treated as missing data.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("remote call failed: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("local storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no problem is currently open")]
    NoActiveProblem,

    #[error("unknown solution id {0}")]
    UnknownSolution(i64),
}

/// Input rejected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please describe your challenge")]
    EmptyProblem,

    #[error("please provide more details (minimum {min} characters)")]
    ProblemTooShort { min: usize },

    #[error("challenge too long (max {max} characters)")]
    ProblemTooLong { max: usize },

    #[error("please write a solution")]
    EmptySolution,

    #[error("please expand your solution (minimum {min} characters)")]
    SolutionTooShort { min: usize },

    #[error("please enter a valid email address")]
    InvalidEmail,
}

pub type Result<T> = std::result::Result<T, FeedError>;

impl FeedError {
    /// True for errors the optimistic-update policy recovers from by
    /// synthesizing a local entity.
    pub fn is_remote(&self) -> bool {
        matches!(self, FeedError::Remote(_) | FeedError::Backend { .. })
    }
}
