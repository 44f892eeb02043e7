use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use findex::cli::{self, Cli, InputArgs};
use findex::config::{self, FindexConfig};
use findex::engine::{Overview, Source};
use findex::report;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("findex=debug")
    } else if cli.quiet {
        EnvFilter::new("findex=error")
    } else {
        EnvFilter::new("findex=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    info!("findex v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        cli::Commands::Expand(args) => {
            let config = load_config(&args.input);
            let overview = Overview::new(&args.input, args.limit, config.as_ref())?;
            let report = overview.run()?;

            let format = config::output_format(args.format.as_deref(), config.as_ref());

            // Output the report
            match format.as_str() {
                "json" => {
                    let output = report::json::render(&report)?;
                    if let Some(ref path) = args.out {
                        std::fs::write(path, &output)?;
                        info!("Report written to {}", path.display());
                    } else {
                        println!("{}", output);
                    }
                }
                _ => {
                    report::terminal::render(&report);
                    if let Some(ref path) = args.out {
                        let json_output = report::json::render(&report)?;
                        std::fs::write(path, &json_output)?;
                        info!("JSON report also written to {}", path.display());
                    }
                }
            }
        }
        cli::Commands::Summary(args) => {
            let config = load_config(&args.input);
            let overview = Overview::new(&args.input, Some(0), config.as_ref())?;
            let report = overview.run()?;

            let format = config::output_format(args.format.as_deref(), config.as_ref());
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report.summary)?),
                _ => report::terminal::render_summary(&report.summary, report.findings_total),
            }
        }
        cli::Commands::Init => {
            config::init_config()?;
        }
    }

    Ok(())
}

/// Config file for this input, unless disabled
fn load_config(input: &InputArgs) -> Option<FindexConfig> {
    if input.no_config {
        return None;
    }
    let root = Source::from_arg(&input.path).config_root()?;
    FindexConfig::load(&root)
}
