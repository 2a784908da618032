//! Matrix command implementation.

use crate::app::App;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the matrix command.
pub fn execute_matrix(app: &App, formatter: &Formatter) -> Result<()> {
    let session = app.session()?;
    let analyzer = session.analyzer();
    println!(
        "{}",
        formatter.idea_matrix(
            session.matrix().idea_columns(),
            analyzer.my_ratings(),
            &analyzer.matrix_rows()
        )?
    );
    Ok(())
}
