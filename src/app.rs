// Application shell. Owns the view-state store, the remote client, local
// persistence and the config; every user action enters here, runs the
// optimistic-update policy, and leaves the store holding the new state.
// The view layer subscribes to snapshots instead of being called directly.

use log::{info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::config::{AppConfig, VoteRevertPolicy};
use crate::error::{FeedError, Result};
use crate::models::{
    ActivityEntry, FeedStats, NewProblem, NewSolution, Notification, NotificationKind, Problem,
    ProblemOrder, Session, Solution, SolutionOrder, SyncStatus, VoteKind, ANONYMOUS_USER,
};
use crate::services::remote::CounterField;
use crate::services::{sample, LocalStore, RemoteStore, SimulatedActivity, SupabaseClient};
use crate::store::{Action, FeedStore, ViewState};
use crate::utils::local_id;
use crate::validate;

/// How a submit ended up. Both variants leave exactly one new entry in
/// view-state; only the status message differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the write and returned the entity.
    Synced,
    /// The remote write failed; a local-only entity was synthesized. It is
    /// never retried.
    SavedLocally,
}

pub struct FeedApp {
    config: AppConfig,
    remote: Arc<dyn RemoteStore>,
    local: LocalStore,
    store: Mutex<FeedStore>,
    state_tx: watch::Sender<ViewState>,
}

impl FeedApp {
    /// Wire the shell from parts. Tests inject an in-memory remote here.
    pub fn new(config: AppConfig, remote: Arc<dyn RemoteStore>, local: LocalStore) -> Self {
        let store = FeedStore::new();
        let (state_tx, _) = watch::channel(store.state().clone());
        Self {
            config,
            remote,
            local,
            store: Mutex::new(store),
            state_tx,
        }
    }

    /// Connect to the hosted backend and open local storage at `db_path`.
    pub fn connect(config: AppConfig, db_path: &Path) -> Result<Self> {
        let remote = Arc::new(SupabaseClient::new(&config)?);
        let local = LocalStore::open(db_path)?;
        Ok(Self::new(config, remote, local))
    }

    /// Restore the session profile and notification history from local
    /// storage. Call once at startup, before the first fetch.
    pub fn init(&self) {
        let session = self.local.load_session();
        let notifications = self.local.load_notifications();
        info!(
            "restored session for {:?} with {} notifications",
            session.name,
            notifications.len()
        );
        self.dispatch(Action::SessionLoaded(session));
        self.dispatch(Action::NotificationsLoaded(notifications));
    }

    /// Current state snapshot.
    pub fn state(&self) -> ViewState {
        self.locked(|store| store.state().clone())
    }

    /// Subscribe to state snapshots; one is published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    /// The problem list as the view should render it (filters and sort
    /// applied).
    pub fn visible_problems(&self) -> Vec<Problem> {
        self.locked(|store| store.visible_problems())
    }

    /// The open problem's solutions under the active sort.
    pub fn sorted_solutions(&self) -> Vec<Solution> {
        self.locked(|store| store.sorted_solutions())
    }

    /// Aggregates for the stats widgets.
    pub fn stats(&self) -> FeedStats {
        self.locked(|store| store.stats())
    }

    fn locked<T>(&self, f: impl FnOnce(&mut FeedStore) -> T) -> T {
        let mut store = self.store.lock().expect("store lock poisoned");
        f(&mut store)
    }

    fn dispatch(&self, action: Action) {
        let snapshot = self.locked(|store| {
            store.dispatch(action);
            store.state().clone()
        });
        // Nobody listening is fine; the snapshot still lands in the channel.
        self.state_tx.send_replace(snapshot);
    }

    // ==================== reads ====================

    /// Load the first page of problems, newest first.
    ///
    /// On failure with `demo_mode` set, the built-in sample dataset is
    /// rendered instead and the state is flagged as demo data; without the
    /// flag the error surfaces to the caller.
    pub async fn load_problems(&self) -> Result<()> {
        let token = self.locked(|store| store.begin_page_load());
        self.dispatch(Action::LoadingChanged(true));

        let result = self.remote.list_problems(0, self.config.page_size).await;
        self.dispatch(Action::LoadingChanged(false));

        match result {
            Ok(problems) => {
                let has_more = problems.len() as u32 == self.config.page_size;
                info!("loaded {} problems", problems.len());
                self.dispatch(Action::PageLoaded {
                    token,
                    problems,
                    append: false,
                    has_more,
                });
                Ok(())
            }
            Err(e) if self.config.demo_mode => {
                warn!("initial fetch failed, falling back to sample data: {}", e);
                self.dispatch(Action::DemoDataLoaded(sample::sample_problems()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the next page and append it. No-op once the backend runs dry.
    pub async fn load_more(&self) -> Result<()> {
        if !self.state().has_more {
            return Ok(());
        }
        let (token, offset) = self.locked(|store| {
            let offset = (store.state().page + 1) * self.config.page_size;
            (store.begin_page_load(), offset)
        });
        let problems = self.remote.list_problems(offset, self.config.page_size).await?;
        let has_more = problems.len() as u32 == self.config.page_size;
        self.dispatch(Action::PageLoaded {
            token,
            problems,
            append: true,
            has_more,
        });
        Ok(())
    }

    /// Open a problem and fetch its solutions.
    pub async fn open_problem(&self, problem_id: i64) -> Result<()> {
        let token = self.locked(|store| {
            store.dispatch(Action::ProblemOpened(problem_id));
            store.begin_solutions_load()
        });

        match self.remote.list_solutions(problem_id).await {
            Ok(solutions) => {
                self.dispatch(Action::SolutionsLoaded { token, solutions });
                Ok(())
            }
            Err(e) if self.config.demo_mode => {
                warn!("solutions fetch failed, using sample data: {}", e);
                self.dispatch(Action::SolutionsLoaded {
                    token,
                    solutions: sample::sample_solutions(problem_id),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn close_problem(&self) {
        self.dispatch(Action::ProblemClosed);
    }

    // ==================== optimistic writes ====================

    /// Submit a new problem.
    ///
    /// Validation failures reject before any remote call. A remote failure
    /// still produces exactly one new head entry: a synthesized local-only
    /// problem with a timestamp id.
    pub async fn submit_problem(&self, text: &str) -> Result<SubmitOutcome> {
        validate::validate_problem_text(text)?;

        let (user_name, category) = {
            let state = self.state();
            (state.session.name.clone(), state.category.clone())
        };
        let new = NewProblem::new(text, &user_name, &category);

        self.dispatch(Action::LoadingChanged(true));
        let result = self.remote.insert_problem(new.clone()).await;
        self.dispatch(Action::LoadingChanged(false));

        match result {
            Ok(problem) => {
                self.dispatch(Action::ProblemInserted(problem));
                self.notify(NotificationKind::Success, "Your challenge has been published!");
                self.record_activity(&user_name, "presented a new challenge");
                Ok(SubmitOutcome::Synced)
            }
            Err(e) => {
                warn!("problem insert failed, keeping a local copy: {}", e);
                self.dispatch(Action::ProblemInserted(synthesize_problem(new)));
                self.notify(
                    NotificationKind::Warning,
                    "Backend unreachable; your challenge was saved locally.",
                );
                self.record_activity(&user_name, "presented a new challenge");
                Ok(SubmitOutcome::SavedLocally)
            }
        }
    }

    /// Submit a solution against the open problem. With `anonymous` set the
    /// display name is withheld.
    pub async fn submit_solution(&self, text: &str, anonymous: bool) -> Result<SubmitOutcome> {
        validate::validate_solution_text(text)?;
        let problem_id = self
            .state()
            .active_problem_id
            .ok_or(FeedError::NoActiveProblem)?;

        let display_name = if anonymous {
            ANONYMOUS_USER.to_string()
        } else {
            self.state().session.name.clone()
        };
        let new = NewSolution::new(problem_id, text, &display_name);

        self.dispatch(Action::LoadingChanged(true));
        let result = self.remote.insert_solution(new.clone()).await;
        self.dispatch(Action::LoadingChanged(false));

        match result {
            Ok(solution) => {
                self.dispatch(Action::SolutionInserted(solution));
                self.notify(
                    NotificationKind::Info,
                    "Someone replied to your challenge!",
                );
                self.record_activity(&display_name, "shared a solution");

                // Reconcile the optimistic count bump against the server's
                // value. A failed bump keeps the optimistic value on screen.
                match self
                    .remote
                    .increment_counter(CounterField::SolutionsCount, problem_id)
                    .await
                {
                    Ok(value) => self.dispatch(Action::SolutionsCountReconciled {
                        problem_id,
                        value,
                    }),
                    Err(e) => warn!("solutions_count bump failed for {}: {}", problem_id, e),
                }
                Ok(SubmitOutcome::Synced)
            }
            Err(e) => {
                warn!("solution insert failed, keeping a local copy: {}", e);
                self.dispatch(Action::SolutionInserted(synthesize_solution(new)));
                self.notify(
                    NotificationKind::Warning,
                    "Backend unreachable; your solution was saved locally.",
                );
                self.record_activity(&display_name, "shared a solution");
                Ok(SubmitOutcome::SavedLocally)
            }
        }
    }

    /// Vote on a solution. The bump lands on screen immediately; what
    /// happens when the remote write fails is the configured policy's call.
    pub async fn vote(&self, solution_id: i64, kind: VoteKind) -> Result<()> {
        let sync_status = self
            .state()
            .solutions
            .iter()
            .find(|s| s.id == solution_id)
            .map(|s| s.sync_status)
            .ok_or(FeedError::UnknownSolution(solution_id))?;

        self.dispatch(Action::VoteApplied { solution_id, kind });

        // Local-only solutions have ids the server never assigned; there is
        // nothing remote to reconcile against.
        if sync_status == SyncStatus::Local {
            return Ok(());
        }

        let field = match kind {
            VoteKind::Up => CounterField::Upvotes,
            VoteKind::Down => CounterField::Downvotes,
        };
        match self.remote.increment_counter(field, solution_id).await {
            Ok(value) => {
                self.dispatch(Action::VoteReconciled {
                    solution_id,
                    kind,
                    value,
                });
                Ok(())
            }
            Err(e) => {
                warn!("vote on {} failed: {}", solution_id, e);
                match self.config.vote_policy {
                    VoteRevertPolicy::KeepOptimistic => {
                        self.dispatch(Action::SolutionMarkedLocal(solution_id));
                    }
                    VoteRevertPolicy::RevertOnFailure => {
                        self.dispatch(Action::VoteReverted { solution_id, kind });
                    }
                }
                Ok(())
            }
        }
    }

    // ==================== session & preferences ====================

    /// Update the display name and persist the session.
    pub fn set_user_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        let session = Session {
            name: if name.is_empty() {
                ANONYMOUS_USER.to_string()
            } else {
                name.to_string()
            },
            ..self.state().session
        };
        self.local.save_session(&session)?;
        self.dispatch(Action::SessionUpdated(session));
        Ok(())
    }

    /// Record a newsletter subscription. Validation only; there is no
    /// remote endpoint for this.
    pub fn subscribe_newsletter(&self, email: &str) -> Result<()> {
        validate::validate_email(email)?;
        let session = Session {
            email: Some(email.trim().to_string()),
            ..self.state().session
        };
        self.local.save_session(&session)?;
        self.dispatch(Action::SessionUpdated(session));
        self.notify(NotificationKind::Success, "You're subscribed to our newsletter");
        Ok(())
    }

    pub fn set_category(&self, category: &str) {
        self.dispatch(Action::CategoryChanged(category.to_string()));
    }

    pub fn set_search(&self, term: &str) {
        self.dispatch(Action::SearchChanged(term.to_string()));
    }

    pub fn set_problem_order(&self, order: ProblemOrder) {
        self.dispatch(Action::ProblemOrderChanged(order));
    }

    pub fn set_solution_order(&self, order: SolutionOrder) {
        self.dispatch(Action::SolutionOrderChanged(order));
    }

    /// Toggle a sidebar panel and persist the expanded set. Returns the new
    /// expanded state of the panel.
    pub fn toggle_panel(&self, key: &str) -> Result<bool> {
        let mut panels = self.local.load_expanded_panels();
        let expanded = if panels.remove(key) {
            false
        } else {
            panels.insert(key.to_string());
            true
        };
        self.local.save_expanded_panels(&panels)?;
        Ok(expanded)
    }

    // ==================== notifications ====================

    pub fn mark_notification_read(&self, id: &str) {
        self.dispatch(Action::NotificationRead(id.to_string()));
        self.persist_notifications();
    }

    pub fn clear_notifications(&self) {
        self.dispatch(Action::NotificationsCleared);
        self.persist_notifications();
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.dispatch(Action::NotificationPushed(Notification::new(kind, message)));
        self.persist_notifications();
    }

    fn persist_notifications(&self) {
        let notifications = self.state().notifications;
        if let Err(e) = self.local.save_notifications(&notifications) {
            // History loss is the worst case; never block the user on it.
            warn!("failed to persist notifications: {}", e);
        }
    }

    fn record_activity(&self, user: &str, action: &str) {
        self.dispatch(Action::ActivityPushed(ActivityEntry {
            user: user.to_string(),
            action: action.to_string(),
            created_at: chrono::Utc::now(),
        }));
    }

    // ==================== background ====================

    /// Spawn the simulated live-activity ticker. Purely client-side; safe
    /// to drop the handle to stop caring, or abort it to stop the task.
    pub fn spawn_live_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let app = Arc::clone(self);
        let period = Duration::from_secs(self.config.live_interval_secs.max(1));
        tokio::spawn(async move {
            let mut generator = SimulatedActivity::new();
            let mut ticker = interval(period);
            // The first tick fires immediately; skip it so the feed starts
            // from real user actions.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                app.dispatch(Action::ActivityPushed(generator.next_entry()));
            }
        })
    }
}

fn synthesize_problem(new: NewProblem) -> Problem {
    Problem {
        id: local_id(),
        problem_text: new.problem_text,
        user_name: new.user_name,
        category: new.category,
        solutions_count: new.solutions_count,
        created_at: chrono::Utc::now(),
        sync_status: SyncStatus::Local,
    }
}

fn synthesize_solution(new: NewSolution) -> Solution {
    Solution {
        id: local_id(),
        problem_id: new.problem_id,
        solution_text: new.solution_text,
        user_name: new.user_name,
        upvotes: new.upvotes,
        downvotes: new.downvotes,
        created_at: chrono::Utc::now(),
        sync_status: SyncStatus::Local,
    }
}
