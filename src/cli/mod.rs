pub mod commands;

use clap::Parser;

pub use commands::{Commands, ExpandArgs, InputArgs, SummaryArgs};

/// findex — security findings overview
///
/// Reads a JSON:API findings response, inlines each finding's scan,
/// resource and provider, and shows what matters first.
#[derive(Parser, Debug)]
#[command(
    name = "findex",
    version,
    about = "🔍 findex — flatten and review security findings responses",
    long_about = "findex reads a JSON:API findings response (with scans, resources and providers\nside-loaded under `included`), resolves every finding's references, and renders\nthe latest failing findings as a table, a summary, or JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
