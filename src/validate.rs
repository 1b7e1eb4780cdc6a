// Client-side input validation. All checks run before any remote call;
// the backend does not enforce these limits.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationError;

/// Minimum problem length in characters.
pub const PROBLEM_MIN_CHARS: usize = 20;
/// Maximum problem length in characters.
pub const PROBLEM_MAX_CHARS: usize = 500;
/// Minimum solution length in characters.
pub const SOLUTION_MIN_CHARS: usize = 20;

/// Validate problem text: non-empty, 20-500 characters after trimming.
pub fn validate_problem_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyProblem);
    }
    let len = text.chars().count();
    if len < PROBLEM_MIN_CHARS {
        return Err(ValidationError::ProblemTooShort {
            min: PROBLEM_MIN_CHARS,
        });
    }
    if len > PROBLEM_MAX_CHARS {
        return Err(ValidationError::ProblemTooLong {
            max: PROBLEM_MAX_CHARS,
        });
    }
    Ok(())
}

/// Validate solution text: non-empty, at least 20 characters after trimming.
pub fn validate_solution_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptySolution);
    }
    if text.chars().count() < SOLUTION_MIN_CHARS {
        return Err(ValidationError::SolutionTooShort {
            min: SOLUTION_MIN_CHARS,
        });
    }
    Ok(())
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

/// Validate a newsletter email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}
