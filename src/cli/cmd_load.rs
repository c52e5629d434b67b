use anyhow::{Context, Result};
use blueberry::{AppConfig, CatalogLoader};
use clap::Args;

use super::{progress, utils};

#[derive(Args)]
#[command(
    about = "Fetch every shard through the cache and print a load report",
    long_about = "Install and activate the offline cache, then fetch the full sharded
catalog through it. Shards are requested sequentially; individual shard
failures are tolerated up to the configured threshold, and previously
cached shards keep the load working when the origin is unreachable.",
    help_template = crate::clap_help!(
        examples: "  # Load the catalog from the default origin\n  \
                   {bin} load\n\n  \
                   # Load against a local origin with JSON output\n  \
                   {bin} load --base-url http://localhost:3000 --json"
    )
)]
pub struct LoadCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: LoadCommand, config: AppConfig, quiet: bool) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async {
        let manager = utils::ready_manager(&config).await?;
        let loader = CatalogLoader::new(manager.clone(), config.loader_options());

        let pb = progress::shard_bar(config.shard_count, quiet || cmd.json);
        let tick = pb.clone();
        let catalog = loader
            .load_all_with_progress(Some(move |done: u32, _total: u32| {
                tick.set_position(done as u64);
            }))
            .await?;
        pb.finish_and_clear();

        let report = loader
            .last_report()
            .context("load finished without a report")?;
        let stats = manager.stats();

        if cmd.json {
            let out = serde_json::json!({
                "report": serde_json::to_value(&report)?,
                "cache_stats": serde_json::to_value(&stats)?,
            });
            println!("{}", sonic_rs::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("🫐 Catalog Load");
        println!("───────────────────────────────────────────────────────────────");
        println!("  Videos:          {}", utils::format_number(catalog.len() as u64));
        println!(
            "  Shards:          {}/{} loaded ({} failed)",
            report.shards_loaded, report.total_shards, report.shards_failed
        );
        if report.records_dropped > 0 {
            println!("  Dropped:         {} malformed record(s)", report.records_dropped);
        }
        println!(
            "  Cache:           {} hit(s), {} miss(es), {} passthrough",
            stats.hits, stats.misses, stats.passthrough
        );

        Ok(())
    })
}
