//! Headless client engine for the MindHive crowdsourced problem/solution
//! feed. Owns the view-state store, the optimistic-update/fallback policy,
//! the typed remote client and local persistence; rendering is left to
//! whatever view layer subscribes to the state snapshots.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod validate;

pub use app::{FeedApp, SubmitOutcome};
pub use config::{AppConfig, VoteRevertPolicy};
pub use error::{FeedError, Result, ValidationError};
pub use models::{
    Notification, NotificationKind, Problem, ProblemOrder, Session, Solution, SolutionOrder,
    SyncStatus, VoteKind,
};
pub use services::{LocalStore, RemoteStore, SupabaseClient};
pub use store::{Action, FeedStore, ViewState};
