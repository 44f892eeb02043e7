use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Denormalize a findings response and show the latest findings
    Expand(ExpandArgs),

    /// Show severity and status counts for a findings response
    Summary(SummaryArgs),

    /// Initialize a .findex.toml config file in the current directory
    Init,
}

/// Where to read the response from and which findings to keep
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON:API findings response to read ("-" for stdin)
    #[arg(default_value = "-")]
    pub path: PathBuf,

    /// Filter in query form, e.g. `filter[severity__in]=critical,high` (can be repeated).
    /// Overrides defaults and config per key; an empty value removes a filter.
    #[arg(short = 'F', long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Drop the default filters (status FAIL, delta new)
    #[arg(long)]
    pub all: bool,

    /// Ignore .findex.toml config files
    #[arg(long)]
    pub no_config: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExpandArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: "terminal" or "json"
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write the JSON report to a file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Number of findings to show (0 = all). Default: 10
    #[arg(short, long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: "terminal" or "json"
    #[arg(short, long)]
    pub format: Option<String>,
}
