//! Command dispatch: bridges CLI args -> session calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod open;
pub mod peers;
pub mod util;
pub mod version;

use wgdash_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &mut Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(dashboard, args, global).await,
        Command::Peers(args) => peers::handle(dashboard, args, global).await,
        Command::Open { path } => open::handle(dashboard, &path, global).await,
        Command::Version => version::handle(dashboard, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
