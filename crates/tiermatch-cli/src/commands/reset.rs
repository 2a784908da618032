//! Reset command implementation.

use crate::app::App;
use crate::cli::ResetArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::io::{self, Write};

/// Execute the reset command.
pub async fn execute_reset(args: ResetArgs, app: &mut App, formatter: &Formatter) -> Result<()> {
    let user = app.session()?.user().to_string();

    // Confirm unless --yes is specified
    if !args.yes {
        print!("Discard all tiers, ratings and boundaries of {}? [y/N] ", user);
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    app.reset().await?;
    println!("{}", formatter.success(&format!("Rankings of {} reset", user)));
    Ok(())
}
