// Data model shared by the remote client, view-state store and local storage.
// Problems and solutions mirror the two remote collections; everything else
// is client-side only and never sent to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default author shown when the user leaves the name field empty.
pub const ANONYMOUS_USER: &str = "Anonymous";

/// Default category tag for uncategorized problems.
pub const DEFAULT_CATEGORY: &str = "all";

/// Whether an entity in view-state made it to the backend.
///
/// `Local` entities were synthesized after a failed remote write. They are
/// displayed like any other entry but are never retried or reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SyncStatus {
    #[default]
    Synced,
    Local,
}

/// A crowdsourced problem, as stored in the remote `problems` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub problem_text: String,
    pub user_name: String,
    pub category: String,
    /// Server-authoritative counter; the client bumps it optimistically and
    /// never re-derives it from the solution list, so drift is accepted.
    pub solutions_count: i64,
    pub created_at: DateTime<Utc>,
    /// Client bookkeeping, not part of the remote row.
    #[serde(default, skip_serializing)]
    pub sync_status: SyncStatus,
}

/// A proposed solution, as stored in the remote `solutions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: i64,
    pub problem_id: i64,
    pub solution_text: String,
    pub user_name: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing)]
    pub sync_status: SyncStatus,
}

/// Insert payload for a new problem. The server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProblem {
    pub problem_text: String,
    pub user_name: String,
    pub category: String,
    pub solutions_count: i64,
}

impl NewProblem {
    pub fn new(text: &str, user_name: &str, category: &str) -> Self {
        let user_name = user_name.trim();
        let category = category.trim();
        Self {
            problem_text: text.trim().to_string(),
            user_name: if user_name.is_empty() {
                ANONYMOUS_USER.to_string()
            } else {
                user_name.to_string()
            },
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_string()
            },
            solutions_count: 0,
        }
    }
}

/// Insert payload for a new solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSolution {
    pub problem_id: i64,
    pub solution_text: String,
    pub user_name: String,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl NewSolution {
    pub fn new(problem_id: i64, text: &str, user_name: &str) -> Self {
        let user_name = user_name.trim();
        Self {
            problem_id,
            solution_text: text.trim().to_string(),
            user_name: if user_name.is_empty() {
                ANONYMOUS_USER.to_string()
            } else {
                user_name.to_string()
            },
            upvotes: 0,
            downvotes: 0,
        }
    }
}

/// Vote direction on a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteKind {
    Up,
    Down,
}

/// Sort applied to the loaded problem page. Always client-side, never pushed
/// to the remote query, so ordering is bounded by what has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProblemOrder {
    #[default]
    Newest,
    Popular,
    Trending,
}

/// Sort applied to the open problem's solution list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SolutionOrder {
    #[default]
    Newest,
    /// Most upvotes first.
    Top,
    /// Highest net score (upvotes minus downvotes) first.
    Helpful,
}

/// Notification category, used by the view layer to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A local-only notification entry. Persisted as a capped list (newest
/// first, max 20) and never sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.to_string(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Local display profile. Read once at startup, written on every edit.
///
/// This is not an account and carries no credentials; the original
/// prototype's local password directory is deliberately not reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            name: ANONYMOUS_USER.to_string(),
            email: None,
        }
    }
}

/// An "X did Y" entry for the sidebar activity feed. Client-side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub user: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregates for the stats widgets, derived from the loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeedStats {
    pub total_problems: usize,
    /// Sum of `solutions_count` over loaded problems, not a count of loaded
    /// solution rows.
    pub total_solutions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_problem_fills_defaults() {
        let p = NewProblem::new("  some problem text  ", "", " ");
        assert_eq!(p.problem_text, "some problem text");
        assert_eq!(p.user_name, ANONYMOUS_USER);
        assert_eq!(p.category, DEFAULT_CATEGORY);
        assert_eq!(p.solutions_count, 0);
    }

    #[test]
    fn new_solution_keeps_author() {
        let s = NewSolution::new(7, "a long enough answer", "Eco Warrior");
        assert_eq!(s.problem_id, 7);
        assert_eq!(s.user_name, "Eco Warrior");
        assert_eq!(s.upvotes, 0);
        assert_eq!(s.downvotes, 0);
    }

    #[test]
    fn sync_status_defaults_to_synced_on_deserialize() {
        let raw = r#"{
            "id": 1,
            "problem_text": "How can we reduce plastic waste in cities?",
            "user_name": "Eco Warrior",
            "category": "life",
            "solutions_count": 3,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let p: Problem = serde_json::from_str(raw).unwrap();
        assert_eq!(p.sync_status, SyncStatus::Synced);
    }
}
