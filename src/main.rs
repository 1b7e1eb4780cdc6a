// Headless demo shell: connects to the configured backend, loads the first
// page and prints the feed with its stats. Mostly useful for poking at a
// backend without a frontend attached.

use anyhow::Result;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use mindhive::utils::{setup_logging, time_ago};
use mindhive::{AppConfig, FeedApp};

fn data_path() -> PathBuf {
    std::env::var_os("MINDHIVE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("mindhive.db")
}

#[tokio::main]
async fn main() -> Result<()> {
    let level = std::env::var("MINDHIVE_LOG")
        .ok()
        .and_then(|raw| raw.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    setup_logging(level)?;

    let config = AppConfig::from_env();
    let app = Arc::new(FeedApp::connect(config, &data_path())?);
    app.init();

    app.load_problems().await?;

    let state = app.state();
    if state.demo_data {
        println!("(backend unreachable, showing sample data)\n");
    }

    let stats = app.stats();
    println!(
        "{} challenges, {} solutions\n",
        stats.total_problems, stats.total_solutions
    );

    for problem in &app.visible_problems() {
        println!(
            "[{}] {} — {} ({}, {} solutions)",
            problem.id,
            problem.problem_text,
            problem.user_name,
            time_ago(problem.created_at),
            problem.solutions_count
        );
    }

    Ok(())
}
