//! Refresh command implementation.

use crate::app::App;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the refresh command.
pub async fn execute_refresh(app: &mut App, formatter: &Formatter) -> Result<()> {
    let status = app.load_matrix().await;
    println!("{}", formatter.matrix_status(status));
    Ok(())
}
