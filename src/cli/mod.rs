use anyhow::Result;
use blueberry::AppConfig;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

// CLI Commands (cmd_ prefix)
mod cmd_cache;
mod cmd_load;
mod cmd_suggest;
mod cmd_video;

// Helper modules (no cmd_ prefix)
mod logger;
mod progress;
mod utils;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format custom help template with grouped commands
fn format_help_template() -> &'static str {
    concat!(
        "{about-with-newline}\n\n",
        "{usage-heading}\n  {usage}\n\n",
        "Options:\n{options}\n\n",
        "Catalog:\n",
        "  load      Fetch every shard through the cache and print a load report\n",
        "  video     Look up catalog records by id\n",
        "  suggest   Search-box suggestions from catalog metadata\n",
        "\n",
        "Cache:\n",
        "  cache     Offline cache lifecycle and inspection\n",
        "\n",
        "See 'blueberry <COMMAND> --help' for more information on a specific command.\n"
    )
}

#[derive(Parser)]
#[command(bin_name = "blueberry")]
#[command(version = VERSION)]
#[command(about = concat!("blueberry v", env!("CARGO_PKG_VERSION"), " - Offline cache & sharded catalog runtime"))]
#[command(long_about = concat!(
    "blueberry v", env!("CARGO_PKG_VERSION"), " - Offline cache & sharded catalog runtime\n\n",
    "Loads the sharded video catalog through a service-worker style cache:\n",
    "static assets are seeded at install time, shard data is served\n",
    "network-first with an offline fallback, and scripts refresh in the\n",
    "background while stale copies keep the UI responsive."
))]
#[command(author)]
#[command(propagate_version = true)]
#[command(help_template = format_help_template())]
pub struct Cli {
    /// Origin serving shards and static assets
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    base_url: Option<String>,

    /// Cache directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    cache_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Load(cmd_load::LoadCommand),
    Video(cmd_video::VideoCommand),
    Suggest(cmd_suggest::SuggestCommand),
    Cache(cmd_cache::CacheCommand),
}

/// Environment config overlaid with the global CLI flags.
fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(ref cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger based on verbosity flags
    logger::init_logger(cli.verbose, cli.quiet);

    let config = resolve_config(&cli);

    match cli.command {
        Commands::Load(cmd) => cmd_load::run(cmd, config, cli.quiet)?,
        Commands::Video(cmd) => cmd_video::run(cmd, config)?,
        Commands::Suggest(cmd) => cmd_suggest::run(cmd, config)?,
        Commands::Cache(cmd) => cmd_cache::run(cmd, config)?,
    }

    Ok(())
}

/// Macro to create clap help templates with examples
/// This works around the limitation that {bin} doesn't work in after_help
/// Uses env! macro to get binary name at compile time
#[macro_export]
macro_rules! clap_help {
    (examples: $examples:literal) => {{
        const BIN: &str = env!("CARGO_PKG_NAME");
        concat!(
            "{about-with-newline}\n",
            "{usage-heading} {usage}\n\n",
            "{all-args}\n\n",
            "Examples:\n",
            $examples
        ).replace("{bin}", BIN)
    }};

    (before: $before:literal, examples: $examples:literal) => {{
        const BIN: &str = env!("CARGO_PKG_NAME");
        concat!(
            "{about-with-newline}\n",
            $before, "\n\n",
            "{usage-heading} {usage}\n\n",
            "{all-args}\n\n",
            "Examples:\n",
            $examples
        ).replace("{bin}", BIN)
    }};
}
