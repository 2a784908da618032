//! Tiers command implementation.

use crate::app::App;
use crate::cli::TiersArgs;
use crate::error::Result;
use crate::output::Formatter;
use tiermatch_domain::DomainKind;

/// Execute the tiers command.
pub fn execute_tiers(args: TiersArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let kind: DomainKind = args.domain.into();
    let session = app.session()?;
    println!("{}", formatter.tier_board(kind, session.domain(kind), session.locked_ideas())?);
    Ok(())
}
