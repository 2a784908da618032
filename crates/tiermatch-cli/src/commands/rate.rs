//! Rate command implementation.

use crate::app::App;
use crate::cli::RateArgs;
use crate::error::Result;
use crate::output::Formatter;
use tiermatch_domain::DomainKind;

/// Execute the rate command.
pub fn execute_rate(args: RateArgs, app: &mut App, formatter: &Formatter) -> Result<()> {
    let kind: DomainKind = args.domain.into();
    let (id, tier) = app.set_rating(kind, &args.item, args.rating)?;
    println!(
        "{}",
        formatter.success(&format!("Rated {} {} (now in {})", id, args.rating, tier.as_str()))
    );
    Ok(())
}
