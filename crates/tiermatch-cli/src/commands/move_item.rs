//! Move command implementation.

use crate::app::App;
use crate::cli::MoveArgs;
use crate::error::Result;
use crate::output::Formatter;
use tiermatch_domain::{DomainKind, Tier};

/// Execute the move command.
pub fn execute_move(args: MoveArgs, app: &mut App, formatter: &Formatter) -> Result<()> {
    let kind: DomainKind = args.domain.into();
    let tier: Tier = args.tier.into();
    let id = app.move_item(kind, &args.item, tier, args.before.as_deref())?;
    println!("{}", formatter.success(&format!("Moved {} to {}", id, tier.as_str())));
    Ok(())
}
