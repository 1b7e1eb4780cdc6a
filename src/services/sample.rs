// Built-in sample dataset rendered when demo mode is on and the initial
// fetch fails. Entries carry negative ids so they can never collide with
// server-assigned or locally synthesized ones.

use chrono::{Duration, Utc};

use crate::models::{Problem, Solution, SyncStatus};

pub fn sample_problems() -> Vec<Problem> {
    let now = Utc::now();
    let entries = [
        (
            "How can we reduce plastic waste in urban areas without increasing costs for consumers?",
            "Eco Warrior",
            "environment",
            8,
            2,
        ),
        (
            "What's the most efficient way to teach programming to complete beginners?",
            "Code Mentor",
            "technology",
            12,
            5,
        ),
        (
            "How can small businesses compete with large retailers' delivery speeds without huge infrastructure?",
            "Shop Local",
            "business",
            15,
            24,
        ),
        (
            "What are creative ways to make public transportation more appealing to car owners?",
            "Urban Planner",
            "social",
            11,
            24,
        ),
        (
            "How can we detect deepfake videos with high accuracy using open source tools?",
            "AI Ethicist",
            "technology",
            23,
            48,
        ),
        (
            "What's the best remote team-building activity you've experienced that actually works?",
            "Remote Lead",
            "business",
            7,
            72,
        ),
    ];

    entries
        .iter()
        .enumerate()
        .map(|(i, (text, user, category, count, hours_ago))| Problem {
            id: -(i as i64 + 1),
            problem_text: text.to_string(),
            user_name: user.to_string(),
            category: category.to_string(),
            solutions_count: *count,
            created_at: now - Duration::hours(*hours_ago),
            sync_status: SyncStatus::Local,
        })
        .collect()
}

pub fn sample_solutions(problem_id: i64) -> Vec<Solution> {
    let now = Utc::now();
    let entries = [
        (
            -1,
            "Implement a deposit-return system for all plastic containers. Consumers pay a small \
             deposit when buying products, refunded when returning containers to recycling centers.",
            "Green Innovator",
            28,
            2,
        ),
        (
            -1,
            "Partner with local businesses to create plastic-free shopping zones where only \
             biodegradable packaging is allowed, with tax incentives for participants.",
            "Zero Waste Advocate",
            19,
            1,
        ),
        (
            -2,
            "Start with visual programming languages, then transition to Python using \
             project-based learning with structured pathways for beginners.",
            "EdTech Expert",
            42,
            3,
        ),
    ];

    entries
        .iter()
        .enumerate()
        .filter(|(_, (pid, ..))| *pid == problem_id)
        .map(|(i, (pid, text, user, upvotes, hours_ago))| Solution {
            id: -(i as i64 + 100),
            problem_id: *pid,
            solution_text: text.to_string(),
            user_name: user.to_string(),
            upvotes: *upvotes,
            downvotes: i as i64,
            created_at: now - Duration::hours(*hours_ago),
            sync_status: SyncStatus::Local,
        })
        .collect()
}
