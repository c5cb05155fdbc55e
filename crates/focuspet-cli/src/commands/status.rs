use chrono::Utc;
use clap::Args;
use focuspet_core::error::Result;
use focuspet_core::{Config, ProgressStore, SessionEngine};
use std::path::Path;

#[derive(Args)]
pub struct StatusArgs {
    /// Store the neglect mood if the companion has been left alone too long
    #[arg(long)]
    commit_neglect: bool,
}

pub fn run(args: StatusArgs, dir: &Path) -> Result<()> {
    let config = Config::load(dir);
    let now = Utc::now();
    let mut engine = SessionEngine::new(ProgressStore::in_dir(dir), &config, now);

    if args.commit_neglect {
        if let Some(event) = engine.commit_neglect(now) {
            eprintln!("{}", serde_json::to_string(&event)?);
        }
    }

    let progress = engine.progress();
    let out = serde_json::json!({
        "points": progress.total,
        "stage": progress.stage,
        "mood": progress.mood,
        "last_session": progress.last_session,
        "last_active": progress.last_active,
        "neglected": engine.is_neglected(now),
        "scene_key": engine.scene_key(now),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
