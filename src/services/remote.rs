// Remote data client contract. The store's sync policy depends on nothing
// but this trait, so tests swap in an in-memory implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewProblem, NewSolution, Problem, Solution};

/// Counter column to bump on a remote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    SolutionsCount,
    Upvotes,
    Downvotes,
}

impl CounterField {
    pub fn column(self) -> &'static str {
        match self {
            CounterField::SolutionsCount => "solutions_count",
            CounterField::Upvotes => "upvotes",
            CounterField::Downvotes => "downvotes",
        }
    }

    /// Collection the counter lives on.
    pub fn collection(self) -> &'static str {
        match self {
            CounterField::SolutionsCount => "problems",
            CounterField::Upvotes | CounterField::Downvotes => "solutions",
        }
    }
}

/// The five operations the client issues against the hosted backend.
///
/// No retries, no batching, no transactions: a failed call is an `Err` with
/// no partial results, and recovery is the caller's concern.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch a page of problems, newest first.
    async fn list_problems(&self, offset: u32, limit: u32) -> Result<Vec<Problem>>;

    /// Fetch all solutions for one problem, newest first.
    async fn list_solutions(&self, problem_id: i64) -> Result<Vec<Solution>>;

    /// Insert a problem; the server assigns `id` and `created_at`.
    async fn insert_problem(&self, new: NewProblem) -> Result<Problem>;

    /// Insert a solution; the server assigns `id` and `created_at`.
    async fn insert_solution(&self, new: NewSolution) -> Result<Solution>;

    /// Bump a counter by one and return the authoritative value, so the
    /// caller can reconcile its optimistic copy.
    async fn increment_counter(&self, field: CounterField, id: i64) -> Result<i64>;
}
