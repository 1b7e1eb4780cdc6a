// View-state store. One explicit container owns everything the view layer
// renders; every mutation goes through a named `Action` so state transitions
// are testable without any I/O. Remote calls live in the application shell,
// which dispatches into this store with the results.

use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::models::{
    ActivityEntry, FeedStats, Notification, Problem, ProblemOrder, Session, Solution,
    SolutionOrder, SyncStatus, VoteKind, DEFAULT_CATEGORY,
};
use crate::services::local::MAX_NOTIFICATIONS;

/// Maximum entries kept in the sidebar activity feed.
pub const MAX_ACTIVITY: usize = 5;

/// Everything currently rendered, as one snapshot value.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub session: Session,
    /// Loaded problems in arrival order (newest-first pages appended).
    pub problems: Vec<Problem>,
    /// Solutions of the open problem, newest first.
    pub solutions: Vec<Solution>,
    pub active_problem_id: Option<i64>,
    pub page: u32,
    pub has_more: bool,
    pub category: String,
    pub search: String,
    pub problem_order: ProblemOrder,
    pub solution_order: SolutionOrder,
    pub notifications: Vec<Notification>,
    pub activity: Vec<ActivityEntry>,
    pub loading: bool,
    /// True when the built-in sample dataset was substituted for a failed
    /// fetch, so the condition stays distinguishable from a reachable but
    /// empty backend.
    pub demo_data: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            problems: Vec::new(),
            solutions: Vec::new(),
            active_problem_id: None,
            page: 0,
            has_more: true,
            category: DEFAULT_CATEGORY.to_string(),
            search: String::new(),
            problem_order: ProblemOrder::default(),
            solution_order: SolutionOrder::default(),
            notifications: Vec::new(),
            activity: Vec::new(),
            loading: false,
            demo_data: false,
        }
    }
}

/// Named state transitions. Page and solution loads carry the generation
/// token handed out when the fetch started; stale responses are discarded
/// instead of clobbering newer state.
#[derive(Debug, Clone)]
pub enum Action {
    SessionLoaded(Session),
    SessionUpdated(Session),
    LoadingChanged(bool),
    PageLoaded {
        token: u64,
        problems: Vec<Problem>,
        append: bool,
        has_more: bool,
    },
    DemoDataLoaded(Vec<Problem>),
    ProblemOpened(i64),
    ProblemClosed,
    SolutionsLoaded {
        token: u64,
        solutions: Vec<Solution>,
    },
    ProblemInserted(Problem),
    SolutionInserted(Solution),
    VoteApplied {
        solution_id: i64,
        kind: VoteKind,
    },
    VoteReverted {
        solution_id: i64,
        kind: VoteKind,
    },
    VoteReconciled {
        solution_id: i64,
        kind: VoteKind,
        value: i64,
    },
    SolutionsCountReconciled {
        problem_id: i64,
        value: i64,
    },
    SolutionMarkedLocal(i64),
    CategoryChanged(String),
    SearchChanged(String),
    ProblemOrderChanged(ProblemOrder),
    SolutionOrderChanged(SolutionOrder),
    NotificationsLoaded(Vec<Notification>),
    NotificationPushed(Notification),
    NotificationRead(String),
    NotificationsCleared,
    ActivityPushed(ActivityEntry),
}

/// Jitter source for the trending sort. Deterministic by default so the
/// order is stable under test.
pub type JitterFn = fn(i64) -> f64;

fn default_jitter(id: i64) -> f64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % 1000) as f64 / 100.0
}

pub struct FeedStore {
    state: ViewState,
    page_generation: u64,
    solutions_generation: u64,
    trending_jitter: JitterFn,
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedStore {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            page_generation: 0,
            solutions_generation: 0,
            trending_jitter: default_jitter,
        }
    }

    pub fn with_jitter(jitter: JitterFn) -> Self {
        Self {
            trending_jitter: jitter,
            ..Self::new()
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a page fetch; the returned token must accompany the matching
    /// `PageLoaded`. Starting a newer fetch invalidates all earlier tokens.
    pub fn begin_page_load(&mut self) -> u64 {
        self.page_generation += 1;
        self.page_generation
    }

    /// Same scheme for the open problem's solution list.
    pub fn begin_solutions_load(&mut self) -> u64 {
        self.solutions_generation += 1;
        self.solutions_generation
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SessionLoaded(session) | Action::SessionUpdated(session) => {
                self.state.session = session;
            }
            Action::LoadingChanged(loading) => self.state.loading = loading,
            Action::PageLoaded {
                token,
                problems,
                append,
                has_more,
            } => {
                if token != self.page_generation {
                    debug!(
                        "discarding stale page response (token {} != {})",
                        token, self.page_generation
                    );
                    return;
                }
                if append {
                    self.state.page += 1;
                    self.state.problems.extend(problems);
                } else {
                    self.state.page = 0;
                    self.state.problems = problems;
                }
                self.state.has_more = has_more;
                self.state.demo_data = false;
            }
            Action::DemoDataLoaded(problems) => {
                self.state.problems = problems;
                self.state.page = 0;
                self.state.has_more = false;
                self.state.demo_data = true;
            }
            Action::ProblemOpened(id) => {
                self.state.active_problem_id = Some(id);
                self.state.solutions.clear();
            }
            Action::ProblemClosed => {
                self.state.active_problem_id = None;
                self.state.solutions.clear();
            }
            Action::SolutionsLoaded { token, solutions } => {
                if token != self.solutions_generation {
                    debug!("discarding stale solutions response");
                    return;
                }
                self.state.solutions = solutions;
            }
            Action::ProblemInserted(problem) => {
                self.state.problems.insert(0, problem);
            }
            Action::SolutionInserted(solution) => {
                // Optimistic count bump on the parent problem. The count is
                // never re-derived from the solution list.
                if let Some(problem) = self
                    .state
                    .problems
                    .iter_mut()
                    .find(|p| p.id == solution.problem_id)
                {
                    problem.solutions_count += 1;
                }
                if self.state.active_problem_id == Some(solution.problem_id) {
                    self.state.solutions.insert(0, solution);
                }
            }
            Action::VoteApplied { solution_id, kind } => {
                if let Some(s) = self.solution_mut(solution_id) {
                    match kind {
                        VoteKind::Up => s.upvotes += 1,
                        VoteKind::Down => s.downvotes += 1,
                    }
                }
            }
            Action::VoteReverted { solution_id, kind } => {
                if let Some(s) = self.solution_mut(solution_id) {
                    match kind {
                        VoteKind::Up => s.upvotes = (s.upvotes - 1).max(0),
                        VoteKind::Down => s.downvotes = (s.downvotes - 1).max(0),
                    }
                }
            }
            Action::VoteReconciled {
                solution_id,
                kind,
                value,
            } => {
                if let Some(s) = self.solution_mut(solution_id) {
                    match kind {
                        VoteKind::Up => s.upvotes = value,
                        VoteKind::Down => s.downvotes = value,
                    }
                    s.sync_status = SyncStatus::Synced;
                }
            }
            Action::SolutionsCountReconciled { problem_id, value } => {
                if let Some(p) = self.state.problems.iter_mut().find(|p| p.id == problem_id) {
                    p.solutions_count = value;
                }
            }
            Action::SolutionMarkedLocal(solution_id) => {
                if let Some(s) = self.solution_mut(solution_id) {
                    s.sync_status = SyncStatus::Local;
                }
            }
            Action::CategoryChanged(category) => self.state.category = category,
            Action::SearchChanged(search) => self.state.search = search,
            Action::ProblemOrderChanged(order) => self.state.problem_order = order,
            Action::SolutionOrderChanged(order) => self.state.solution_order = order,
            Action::NotificationsLoaded(mut notifications) => {
                notifications.truncate(MAX_NOTIFICATIONS);
                self.state.notifications = notifications;
            }
            Action::NotificationPushed(notification) => {
                self.state.notifications.insert(0, notification);
                self.state.notifications.truncate(MAX_NOTIFICATIONS);
            }
            Action::NotificationRead(id) => {
                if let Some(n) = self.state.notifications.iter_mut().find(|n| n.id == id) {
                    n.read = true;
                }
            }
            Action::NotificationsCleared => self.state.notifications.clear(),
            Action::ActivityPushed(entry) => {
                self.state.activity.insert(0, entry);
                self.state.activity.truncate(MAX_ACTIVITY);
            }
        }
    }

    fn solution_mut(&mut self, id: i64) -> Option<&mut Solution> {
        self.state.solutions.iter_mut().find(|s| s.id == id)
    }

    // ==================== selectors ====================

    /// The problem list as the view should render it: category filter and
    /// substring search applied, then the active sort. Sorting covers only
    /// what has been fetched; that bound is accepted, not hidden.
    pub fn visible_problems(&self) -> Vec<Problem> {
        let search = self.state.search.trim().to_lowercase();
        let mut visible: Vec<Problem> = self
            .state
            .problems
            .iter()
            .filter(|p| self.state.category == DEFAULT_CATEGORY || p.category == self.state.category)
            .filter(|p| {
                search.is_empty()
                    || p.problem_text.to_lowercase().contains(&search)
                    || p.user_name.to_lowercase().contains(&search)
            })
            .cloned()
            .collect();

        match self.state.problem_order {
            // Stable sorts: ties keep their original (arrival) order.
            ProblemOrder::Newest => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProblemOrder::Popular => {
                visible.sort_by(|a, b| b.solutions_count.cmp(&a.solutions_count))
            }
            ProblemOrder::Trending => {
                let jitter = self.trending_jitter;
                visible.sort_by(|a, b| {
                    let score_a = a.solutions_count as f64 * 2.0 + jitter(a.id);
                    let score_b = b.solutions_count as f64 * 2.0 + jitter(b.id);
                    score_b.total_cmp(&score_a)
                });
            }
        }
        visible
    }

    /// The open problem's solutions under the active sort.
    pub fn sorted_solutions(&self) -> Vec<Solution> {
        let mut solutions = self.state.solutions.clone();
        match self.state.solution_order {
            SolutionOrder::Newest => solutions.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SolutionOrder::Top => solutions.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
            SolutionOrder::Helpful => solutions.sort_by(|a, b| {
                (b.upvotes - b.downvotes).cmp(&(a.upvotes - a.downvotes))
            }),
        }
        solutions
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            total_problems: self.state.problems.len(),
            total_solutions: self.state.problems.iter().map(|p| p.solutions_count).sum(),
        }
    }

    pub fn unread_notifications(&self) -> usize {
        self.state.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn active_problem(&self) -> Option<&Problem> {
        let id = self.state.active_problem_id?;
        self.state.problems.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use chrono::{Duration, TimeZone, Utc};

    fn problem(id: i64, count: i64, hours_ago: i64) -> Problem {
        Problem {
            id,
            problem_text: format!("problem number {} with enough text", id),
            user_name: "Tester".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            solutions_count: count,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
                - Duration::hours(hours_ago),
            sync_status: SyncStatus::Synced,
        }
    }

    fn solution(id: i64, problem_id: i64, upvotes: i64, downvotes: i64) -> Solution {
        Solution {
            id,
            problem_id,
            solution_text: "a sufficiently long answer".to_string(),
            user_name: "Tester".to_string(),
            upvotes,
            downvotes,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            sync_status: SyncStatus::Synced,
        }
    }

    fn loaded_store(problems: Vec<Problem>) -> FeedStore {
        let mut store = FeedStore::new();
        let token = store.begin_page_load();
        store.dispatch(Action::PageLoaded {
            token,
            problems,
            append: false,
            has_more: true,
        });
        store
    }

    #[test]
    fn inserted_problem_goes_to_head() {
        let mut store = loaded_store(vec![problem(1, 0, 5), problem(2, 0, 10)]);
        store.dispatch(Action::ProblemInserted(problem(3, 0, 0)));
        assert_eq!(store.state().problems.len(), 3);
        assert_eq!(store.state().problems[0].id, 3);
    }

    #[test]
    fn solution_insert_bumps_parent_count_once() {
        let mut store = loaded_store(vec![problem(1, 4, 5)]);
        store.dispatch(Action::ProblemOpened(1));
        store.dispatch(Action::SolutionInserted(solution(10, 1, 0, 0)));

        assert_eq!(store.state().problems[0].solutions_count, 5);
        assert_eq!(store.state().solutions.len(), 1);
        assert_eq!(store.state().solutions[0].id, 10);
    }

    #[test]
    fn solution_for_closed_problem_still_bumps_count() {
        let mut store = loaded_store(vec![problem(1, 0, 5)]);
        store.dispatch(Action::SolutionInserted(solution(10, 1, 0, 0)));
        assert_eq!(store.state().problems[0].solutions_count, 1);
        assert!(store.state().solutions.is_empty());
    }

    #[test]
    fn stale_page_response_is_discarded() {
        let mut store = FeedStore::new();
        let stale = store.begin_page_load();
        let current = store.begin_page_load();

        // The newer request resolves first.
        store.dispatch(Action::PageLoaded {
            token: current,
            problems: vec![problem(2, 0, 1)],
            append: false,
            has_more: true,
        });
        // The superseded one arrives late and must not win.
        store.dispatch(Action::PageLoaded {
            token: stale,
            problems: vec![problem(1, 0, 2)],
            append: false,
            has_more: false,
        });

        assert_eq!(store.state().problems.len(), 1);
        assert_eq!(store.state().problems[0].id, 2);
        assert!(store.state().has_more);
    }

    #[test]
    fn stale_solutions_response_is_discarded() {
        let mut store = loaded_store(vec![problem(1, 0, 1)]);
        store.dispatch(Action::ProblemOpened(1));
        let stale = store.begin_solutions_load();
        let current = store.begin_solutions_load();

        store.dispatch(Action::SolutionsLoaded {
            token: current,
            solutions: vec![solution(20, 1, 0, 0)],
        });
        store.dispatch(Action::SolutionsLoaded {
            token: stale,
            solutions: vec![solution(10, 1, 0, 0), solution(11, 1, 0, 0)],
        });

        assert_eq!(store.state().solutions.len(), 1);
        assert_eq!(store.state().solutions[0].id, 20);
    }

    #[test]
    fn append_page_extends_and_counts_pages() {
        let mut store = loaded_store(vec![problem(1, 0, 1)]);
        let token = store.begin_page_load();
        store.dispatch(Action::PageLoaded {
            token,
            problems: vec![problem(2, 0, 2)],
            append: true,
            has_more: false,
        });
        assert_eq!(store.state().problems.len(), 2);
        assert_eq!(store.state().page, 1);
        assert!(!store.state().has_more);
    }

    #[test]
    fn two_quick_votes_both_land() {
        let mut store = loaded_store(vec![problem(1, 0, 1)]);
        store.dispatch(Action::ProblemOpened(1));
        let t = store.begin_solutions_load();
        store.dispatch(Action::SolutionsLoaded {
            token: t,
            solutions: vec![solution(10, 1, 3, 0)],
        });

        store.dispatch(Action::VoteApplied {
            solution_id: 10,
            kind: VoteKind::Up,
        });
        store.dispatch(Action::VoteApplied {
            solution_id: 10,
            kind: VoteKind::Up,
        });
        assert_eq!(store.state().solutions[0].upvotes, 5);
    }

    #[test]
    fn vote_revert_and_reconcile() {
        let mut store = loaded_store(vec![problem(1, 0, 1)]);
        store.dispatch(Action::ProblemOpened(1));
        let t = store.begin_solutions_load();
        store.dispatch(Action::SolutionsLoaded {
            token: t,
            solutions: vec![solution(10, 1, 3, 1)],
        });

        store.dispatch(Action::VoteApplied {
            solution_id: 10,
            kind: VoteKind::Down,
        });
        store.dispatch(Action::VoteReverted {
            solution_id: 10,
            kind: VoteKind::Down,
        });
        assert_eq!(store.state().solutions[0].downvotes, 1);

        // Server says 7; the optimistic value yields to it.
        store.dispatch(Action::VoteReconciled {
            solution_id: 10,
            kind: VoteKind::Up,
            value: 7,
        });
        assert_eq!(store.state().solutions[0].upvotes, 7);
        assert_eq!(store.state().solutions[0].sync_status, SyncStatus::Synced);
    }

    #[test]
    fn newest_sort_is_total_and_stable() {
        let mut a = problem(1, 0, 2);
        let b = problem(2, 0, 1);
        let c = problem(3, 0, 3);
        // Give one pair identical timestamps to exercise the tie.
        a.created_at = b.created_at;
        let store = loaded_store(vec![a, b, c]);

        let visible = store.visible_problems();
        // 1 and 2 tie on created_at; stable sort keeps arrival order (1 first).
        assert_eq!(
            visible.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn popular_sort_breaks_ties_by_arrival_order() {
        let mut store = loaded_store(vec![problem(1, 5, 1), problem(2, 9, 2), problem(3, 5, 3)]);
        store.dispatch(Action::ProblemOrderChanged(ProblemOrder::Popular));
        let visible = store.visible_problems();
        assert_eq!(
            visible.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
    }

    #[test]
    fn trending_sort_is_deterministic_with_fixed_jitter() {
        let mut store = FeedStore::with_jitter(|_| 0.0);
        let token = store.begin_page_load();
        store.dispatch(Action::PageLoaded {
            token,
            problems: vec![problem(1, 2, 1), problem(2, 8, 2), problem(3, 5, 3)],
            append: false,
            has_more: false,
        });
        store.dispatch(Action::ProblemOrderChanged(ProblemOrder::Trending));
        let visible = store.visible_problems();
        assert_eq!(
            visible.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn category_and_search_filters_compose() {
        let mut tech = problem(1, 0, 1);
        tech.category = "technology".to_string();
        tech.problem_text = "How do we teach programming to beginners?".to_string();
        let mut life = problem(2, 0, 2);
        life.category = "life".to_string();

        let mut store = loaded_store(vec![tech, life]);
        store.dispatch(Action::CategoryChanged("technology".to_string()));
        store.dispatch(Action::SearchChanged("PROGRAMMING".to_string()));
        let visible = store.visible_problems();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 1);

        store.dispatch(Action::SearchChanged("plastic".to_string()));
        assert!(store.visible_problems().is_empty());
    }

    #[test]
    fn solution_orders() {
        let mut store = loaded_store(vec![problem(1, 0, 1)]);
        store.dispatch(Action::ProblemOpened(1));
        let t = store.begin_solutions_load();
        let mut older = solution(10, 1, 9, 8);
        older.created_at = older.created_at - Duration::hours(1);
        store.dispatch(Action::SolutionsLoaded {
            token: t,
            solutions: vec![solution(11, 1, 5, 0), older],
        });

        store.dispatch(Action::SolutionOrderChanged(SolutionOrder::Top));
        assert_eq!(store.sorted_solutions()[0].id, 10);

        store.dispatch(Action::SolutionOrderChanged(SolutionOrder::Helpful));
        assert_eq!(store.sorted_solutions()[0].id, 11);

        store.dispatch(Action::SolutionOrderChanged(SolutionOrder::Newest));
        assert_eq!(store.sorted_solutions()[0].id, 11);
    }

    #[test]
    fn notification_cap_and_flags() {
        let mut store = FeedStore::new();
        for i in 0..25 {
            store.dispatch(Action::NotificationPushed(Notification::new(
                NotificationKind::Info,
                &format!("note {}", i),
            )));
        }
        assert_eq!(store.state().notifications.len(), MAX_NOTIFICATIONS);
        // Newest first; oldest five were evicted.
        assert_eq!(store.state().notifications[0].message, "note 24");
        assert_eq!(store.state().notifications[19].message, "note 5");
        assert_eq!(store.unread_notifications(), MAX_NOTIFICATIONS);

        let id = store.state().notifications[3].id.clone();
        store.dispatch(Action::NotificationRead(id.clone()));
        assert_eq!(store.unread_notifications(), MAX_NOTIFICATIONS - 1);
        let flags: Vec<bool> = store.state().notifications.iter().map(|n| n.read).collect();
        assert_eq!(flags.iter().filter(|r| **r).count(), 1);
        assert!(store.state().notifications[3].read);

        store.dispatch(Action::NotificationsCleared);
        assert!(store.state().notifications.is_empty());
        assert_eq!(store.unread_notifications(), 0);
    }

    #[test]
    fn activity_feed_capped_at_five() {
        let mut store = FeedStore::new();
        for i in 0..8 {
            store.dispatch(Action::ActivityPushed(ActivityEntry {
                user: format!("user {}", i),
                action: "did something".to_string(),
                created_at: Utc::now(),
            }));
        }
        assert_eq!(store.state().activity.len(), MAX_ACTIVITY);
        assert_eq!(store.state().activity[0].user, "user 7");
    }

    #[test]
    fn stats_sum_solution_counts() {
        let store = loaded_store(vec![problem(1, 3, 1), problem(2, 4, 2)]);
        let stats = store.stats();
        assert_eq!(stats.total_problems, 2);
        assert_eq!(stats.total_solutions, 7);
    }

    #[test]
    fn demo_data_is_flagged_and_cleared_by_real_page() {
        let mut store = FeedStore::new();
        store.dispatch(Action::DemoDataLoaded(vec![problem(-1, 0, 1)]));
        assert!(store.state().demo_data);
        assert!(!store.state().has_more);

        let token = store.begin_page_load();
        store.dispatch(Action::PageLoaded {
            token,
            problems: vec![problem(1, 0, 1)],
            append: false,
            has_more: true,
        });
        assert!(!store.state().demo_data);
    }
}
