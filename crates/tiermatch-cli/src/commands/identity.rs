//! Identity command implementation.

use crate::app::App;
use crate::cli::IdentityArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the identity command.
pub async fn execute_identity(args: IdentityArgs, app: &mut App, formatter: &Formatter) -> Result<()> {
    match args.name {
        Some(name) => {
            let user = app.switch_identity(&name).await?.to_string();
            println!("{}", formatter.success(&format!("Signed in as {}", user)));
        }
        None => {
            println!("{}", formatter.identity(app.identity(), &app.candidates())?);
        }
    }
    Ok(())
}
