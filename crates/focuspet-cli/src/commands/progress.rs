use clap::Subcommand;
use focuspet_core::error::Result;
use focuspet_core::{Progress, ProgressStore};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print the normalized progress record
    Show,
    /// Overwrite the record with defaults
    Reset,
    /// Print the record's file path
    Path,
}

pub fn run(action: ProgressAction, dir: &Path) -> Result<()> {
    let store = ProgressStore::in_dir(dir);
    match action {
        ProgressAction::Show => {
            let progress = store.load();
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        ProgressAction::Reset => {
            store.save(&Progress::default())?;
            println!("progress reset to defaults");
        }
        ProgressAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
