//! Analyze command implementation.

use crate::app::App;
use crate::cli::{AnalyzeArgs, AnalyzeTarget};
use crate::error::Result;
use crate::output::Formatter;
use tiermatch_domain::PeerSort;

/// Execute the analyze command.
pub fn execute_analyze(args: AnalyzeArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let session = app.session()?;
    let analyzer = session.analyzer();

    let output = match args.target {
        AnalyzeTarget::Peers { sort, tier } => {
            let sort: PeerSort = sort.into();
            let peers = analyzer.peer_report(sort, tier.map(Into::into));
            formatter.peer_report(&peers, session.matrix().idea_columns(), &analyzer.top_ideas())?
        }
        AnalyzeTarget::Ideas { min_rating } => formatter.idea_matches(&analyzer.idea_matches(min_rating))?,
    };
    println!("{}", output);
    Ok(())
}
