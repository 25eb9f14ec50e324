//! Logomatch CLI - group web domains that share a logo.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use logomatch_core::{GraphStrategy, HashAlgorithm};
use url::Url;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

#[derive(Parser)]
#[command(name = "logomatch")]
#[command(author, version, about = "Group web domains that share a logo", long_about = None)]
#[command(after_help = "Exit codes:
  0   Success
  1   General error
  64  Invalid arguments or configuration
  66  Inventory or asset directory not found
  74  I/O error")]
struct Cli {
    /// Print results only, no status lines; log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for cluster reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable group listing
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

/// Options for the scrape stage.
#[derive(Args, Debug, Clone, Default)]
pub struct ScrapeArgs {
    /// Sites scraped at once (1 = sequential) [default: 4]
    #[arg(short, long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Keep assets from earlier runs instead of downloading them again
    #[arg(long)]
    pub skip_existing: bool,

    /// Page fetch timeout in seconds [default: 15]
    #[arg(long, value_name = "SECS")]
    pub page_timeout: Option<u64>,

    /// Asset download timeout in seconds [default: 7]
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,
}

/// Options for the cluster stage.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// Maximum Hamming distance for two logos to be linked [default: 5]
    #[arg(short, long, value_name = "BITS")]
    pub threshold: Option<u32>,

    /// Perceptual hash: phash or blockhash64 [default: phash]
    #[arg(long, value_name = "NAME")]
    pub algorithm: Option<HashAlgorithm>,

    /// Pair enumeration: exhaustive or bucketed [default: exhaustive]
    #[arg(long, value_name = "NAME")]
    pub strategy: Option<GraphStrategy>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical URL of every domain in an inventory
    Normalize {
        /// Inventory file (.parquet, .csv, .json or one domain per line)
        #[arg(value_name = "INVENTORY")]
        inventory: PathBuf,
    },

    /// Find the logo reference in a saved HTML page
    Locate {
        /// HTML file
        #[arg(value_name = "HTML")]
        html: PathBuf,

        /// URL the page was served from, for resolving relative references
        #[arg(long, value_name = "URL")]
        base_url: Url,
    },

    /// Download the logo of every domain in an inventory
    Scrape {
        #[arg(value_name = "INVENTORY")]
        inventory: PathBuf,

        /// Asset directory [default: logos]
        #[arg(short, long, value_name = "DIR")]
        assets: Option<PathBuf>,

        #[command(flatten)]
        scrape: ScrapeArgs,
    },

    /// Fingerprint stored logos and group domains that share one
    Cluster {
        /// Asset directory [default: logos]
        #[arg(short, long, value_name = "DIR")]
        assets: Option<PathBuf>,

        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Scrape an inventory, then cluster the downloaded logos
    Run {
        #[arg(value_name = "INVENTORY")]
        inventory: PathBuf,

        /// Asset directory [default: logos]
        #[arg(short, long, value_name = "DIR")]
        assets: Option<PathBuf>,

        #[command(flatten)]
        scrape: ScrapeArgs,

        #[command(flatten)]
        cluster: ClusterArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
        Err(e) => e.exit(),
    };

    utils::init_tracing(cli.verbose, cli.quiet);
    let quiet = cli.quiet;

    let result = match cli.command {
        Commands::Normalize { inventory } => commands::normalize::execute(inventory, quiet),
        Commands::Locate { html, base_url } => commands::locate::execute(html, base_url, quiet),
        Commands::Scrape {
            inventory,
            assets,
            scrape,
        } => commands::scrape::execute(inventory, assets, scrape, quiet)
            .await
            .map(|_| ()),
        Commands::Cluster { assets, cluster } => {
            commands::cluster::execute(assets, cluster, quiet)
        }
        Commands::Run {
            inventory,
            assets,
            scrape,
            cluster,
        } => commands::run::execute(inventory, assets, scrape, cluster, quiet).await,
    };

    if let Err(err) = result {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = &exit.message {
            eprintln!("{} {}", "Error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}
