//! Bounds command implementation.

use crate::app::App;
use crate::cli::BoundsArgs;
use crate::error::Result;
use crate::output::Formatter;
use tiermatch_domain::DomainKind;

/// Execute the bounds command.
///
/// Without `--tier1`/`--tier2` the current boundaries are shown.
pub fn execute_bounds(args: BoundsArgs, app: &mut App, formatter: &Formatter) -> Result<()> {
    let kind: DomainKind = args.domain.into();

    if args.tier1.is_none() && args.tier2.is_none() {
        let bounds = *app.session()?.domain(kind).bounds();
        println!("{}", formatter.bounds(kind, &bounds)?);
        return Ok(());
    }

    let bounds = app.set_boundaries(kind, args.tier1, args.tier2)?;
    println!("{}", formatter.bounds(kind, &bounds)?);
    Ok(())
}
