//! Command implementations.

pub mod analyze;
pub mod bounds;
pub mod identity;
pub mod matrix;
pub mod move_item;
pub mod rate;
pub mod refresh;
pub mod reset;
pub mod tiers;

pub use self::analyze::execute_analyze;
pub use self::bounds::execute_bounds;
pub use self::identity::execute_identity;
pub use self::matrix::execute_matrix;
pub use self::move_item::execute_move;
pub use self::rate::execute_rate;
pub use self::refresh::execute_refresh;
pub use self::reset::execute_reset;
pub use self::tiers::execute_tiers;

use crate::app::App;
use crate::cli::Command;
use crate::error::Result;
use crate::output::Formatter;

/// Run one non-interactive command.
///
/// `Repl` is handled by the caller and is a no-op here.
pub async fn execute(command: Command, app: &mut App, formatter: &Formatter) -> Result<()> {
    match command {
        Command::Identity(args) => execute_identity(args, app, formatter).await,
        Command::Tiers(args) => execute_tiers(args, app, formatter),
        Command::Move(args) => execute_move(args, app, formatter),
        Command::Rate(args) => execute_rate(args, app, formatter),
        Command::Bounds(args) => execute_bounds(args, app, formatter),
        Command::Analyze(args) => execute_analyze(args, app, formatter),
        Command::Matrix => execute_matrix(app, formatter),
        Command::Refresh => execute_refresh(app, formatter).await,
        Command::Reset(args) => execute_reset(args, app, formatter).await,
        Command::Repl => Ok(()),
    }
}
