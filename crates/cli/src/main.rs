mod catalog;
mod config;
mod config_cmd;
mod list_cmd;
mod output;
mod report_cmd;
mod scroll_cmd;
mod totals_cmd;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "costscope",
    version,
    about = "Browse an infrastructure cost catalog with scroll-scoped totals"
)]
struct Cli {
    /// Config file (defaults to ~/.config/costscope/costscope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog JSON file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items with their per-tier costs
    List,

    /// Cumulative totals for a given set of visible items
    Totals {
        /// Ids of items currently on screen (none = first rows)
        #[arg(long = "visible", value_name = "ID", num_args = 0..)]
        visible: Vec<String>,
    },

    /// Replay scroll positions through the visibility tracker
    Scroll {
        /// Scroll offsets in pixels, applied in order
        #[arg(long = "offset", value_name = "PX", required = true, num_args = 1..)]
        offsets: Vec<f64>,
    },

    /// Show the detailed breakdown of an item or a report file
    #[command(group(ArgGroup::new("source").required(true).args(["item", "file"])))]
    Report {
        /// Catalog item id
        #[arg(long)]
        item: Option<String>,

        /// Plain-text report file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write the default config file (to --config PATH when given)
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config { init: true } = cli.command {
        return config_cmd::run_init(cli.config.as_deref());
    }
    let (cfg, source) = config::load_config(cli.config.as_deref())?;
    let load_catalog = || catalog::load_catalog(cli.catalog.as_deref());

    match cli.command {
        Commands::List => list_cmd::run_list(&load_catalog()?, &cli.format),
        Commands::Totals { visible } => totals_cmd::run_totals(
            &load_catalog()?,
            &config::totals_engine(&cfg),
            &visible,
            &cli.format,
        ),
        Commands::Scroll { offsets } => {
            scroll_cmd::run_scroll(&load_catalog()?, &cfg, &offsets, &cli.format).await
        }
        Commands::Report {
            file: Some(path), ..
        } => report_cmd::run_file_report(&path, &cli.format),
        Commands::Report { item, .. } => {
            let id = item.unwrap_or_default();
            report_cmd::run_item_report(&load_catalog()?, &id, &cli.format)
        }
        Commands::Config { .. } => config_cmd::run_show(&cfg, source.as_deref(), &cli.format),
    }
}
