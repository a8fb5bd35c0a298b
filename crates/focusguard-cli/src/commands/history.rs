use clap::Subcommand;
use uuid::Uuid;

use focusguard_core::coordinator::SessionStore;
use focusguard_core::stats::fmt_duration;
use focusguard_core::SessionDir;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List stored sessions, most recent first
    List {
        /// Print full JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one stored session as JSON
    Show {
        /// Session id
        id: Uuid,
    },
    /// Delete all stored sessions
    Clear,
}

pub fn run(action: HistoryAction) -> focusguard_core::error::Result<()> {
    let store = SessionDir::open_default()?;

    match action {
        HistoryAction::List { json } => {
            let sessions = store.load_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for session in sessions {
                    println!(
                        "{}  {}  {}",
                        session.id,
                        session.start.to_rfc3339(),
                        fmt_duration(session.duration())
                    );
                }
            }
        }
        HistoryAction::Show { id } => {
            let session = store.load(id)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        HistoryAction::Clear => {
            let removed = store.clear()?;
            println!("removed {removed} session(s)");
        }
    }
    Ok(())
}
