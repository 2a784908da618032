//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use tiermatch_domain::{DomainKind, PeerSort, Tier, DEFAULT_IDEA_FILTER};

/// Tiermatch - rank co-founders and ideas, then see who you align with.
#[derive(Debug, Parser)]
#[command(name = "tiermatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Act as this participant instead of the remembered identity
    #[arg(short, long, global = true, env = "TIERMATCH_USER")]
    pub user: Option<String>,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show or select who you are
    Identity(IdentityArgs),

    /// Show the tier board of one ranking
    Tiers(TiersArgs),

    /// Move an item to a tier
    Move(MoveArgs),

    /// Rate an item 1-7
    Rate(RateArgs),

    /// Show or change tier boundaries
    Bounds(BoundsArgs),

    /// Alignment analysis
    Analyze(AnalyzeArgs),

    /// Peer x idea grid of mutual interest
    Matrix,

    /// Fetch the shared sheet again
    Refresh,

    /// Discard all your tiers and ratings
    Reset(ResetArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Which ranking a command works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DomainArg {
    /// Co-founder candidates
    #[value(alias = "peer", alias = "cofounders")]
    Peers,
    /// Project ideas
    #[value(alias = "idea")]
    Ideas,
}

/// Tier argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TierArg {
    /// Clearly above my bar
    #[value(alias = "t1", alias = "1")]
    Tier1,
    /// Above my bar, but some questions
    #[value(alias = "t2", alias = "2")]
    Tier2,
    /// Below my bar
    #[value(alias = "t3", alias = "3")]
    Tier3,
}

/// Peer list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortArg {
    /// Best tier first, then rating
    #[default]
    Tier,
    /// Highest alignment first
    Alignment,
    /// Most conflicts first
    Conflicts,
    /// Highest rating first
    Rating,
}

/// Arguments for the identity command.
#[derive(Debug, Parser)]
pub struct IdentityArgs {
    /// Participant to act as; omit to show the current identity
    pub name: Option<String>,
}

/// Arguments for the tiers command.
#[derive(Debug, Parser)]
pub struct TiersArgs {
    /// Ranking to show
    #[arg(value_enum)]
    pub domain: DomainArg,
}

/// Arguments for the move command.
#[derive(Debug, Parser)]
pub struct MoveArgs {
    /// Ranking the item belongs to
    #[arg(value_enum)]
    pub domain: DomainArg,

    /// Item id or name
    pub item: String,

    /// Destination tier
    #[arg(value_enum)]
    pub tier: TierArg,

    /// Place in front of this item (appended when absent from the tier)
    #[arg(short, long)]
    pub before: Option<String>,
}

/// Arguments for the rate command.
#[derive(Debug, Parser)]
pub struct RateArgs {
    /// Ranking the item belongs to
    #[arg(value_enum)]
    pub domain: DomainArg,

    /// Item id or name
    pub item: String,

    /// Rating from 1 to 7
    #[arg(value_parser = clap::value_parser!(i64).range(1..=7))]
    pub rating: i64,
}

/// Arguments for the bounds command.
#[derive(Debug, Parser)]
pub struct BoundsArgs {
    /// Ranking whose boundaries to show or change
    #[arg(value_enum)]
    pub domain: DomainArg,

    /// New lowest rating of tier 1
    #[arg(long)]
    pub tier1: Option<u8>,

    /// New lowest rating of tier 2
    #[arg(long)]
    pub tier2: Option<u8>,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub target: AnalyzeTarget,
}

/// Analysis views.
#[derive(Debug, Subcommand)]
pub enum AnalyzeTarget {
    /// Alignment with every peer
    Peers {
        /// Ordering
        #[arg(short, long, value_enum, default_value_t = SortArg::Tier)]
        sort: SortArg,

        /// Only peers in this tier
        #[arg(short, long, value_enum)]
        tier: Option<TierArg>,
    },

    /// Peers interested in the ideas you like
    Ideas {
        /// Only ideas you rate at least this high
        #[arg(short, long, default_value_t = DEFAULT_IDEA_FILTER)]
        min_rating: u8,
    },
}

/// Arguments for the reset command.
#[derive(Debug, Parser)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<DomainArg> for DomainKind {
    fn from(domain: DomainArg) -> Self {
        match domain {
            DomainArg::Peers => DomainKind::Peers,
            DomainArg::Ideas => DomainKind::Ideas,
        }
    }
}

impl From<TierArg> for Tier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Tier1 => Tier::Tier1,
            TierArg::Tier2 => Tier::Tier2,
            TierArg::Tier3 => Tier::Tier3,
        }
    }
}

impl From<SortArg> for PeerSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Tier => PeerSort::Tier,
            SortArg::Alignment => PeerSort::Alignment,
            SortArg::Conflicts => PeerSort::Conflicts,
            SortArg::Rating => PeerSort::Rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_means_repl() {
        let cli = Cli::parse_from(["tiermatch"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_move_command() {
        let cli = Cli::parse_from(["tiermatch", "move", "ideas", "Keel Bone", "t1", "--before", "wash"]);
        match cli.command {
            Some(Command::Move(args)) => {
                assert_eq!(args.domain, DomainArg::Ideas);
                assert_eq!(args.item, "Keel Bone");
                assert_eq!(args.tier, TierArg::Tier1);
                assert_eq!(args.before.as_deref(), Some("wash"));
            }
            _ => panic!("Expected Move command"),
        }
    }

    #[test]
    fn test_rate_range_checked() {
        assert!(Cli::try_parse_from(["tiermatch", "rate", "peers", "kate", "8"]).is_err());
        assert!(Cli::try_parse_from(["tiermatch", "rate", "cofounders", "kate", "7"]).is_ok());
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::parse_from(["tiermatch", "analyze", "ideas"]);
        match cli.command {
            Some(Command::Analyze(AnalyzeArgs {
                target: AnalyzeTarget::Ideas { min_rating },
            })) => assert_eq!(min_rating, 5),
            _ => panic!("Expected Analyze Ideas"),
        }
    }

    #[test]
    fn test_global_flags_after_command() {
        let cli = Cli::parse_from(["tiermatch", "matrix", "--format", "json", "--user", "Kate", "-v"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.user.as_deref(), Some("Kate"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_tier_conversion() {
        let tier: Tier = TierArg::Tier2.into();
        assert_eq!(tier, Tier::Tier2);
    }
}
