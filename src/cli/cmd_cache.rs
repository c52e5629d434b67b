use anyhow::Result;
use blueberry::{AppConfig, CacheManager, PartitionKind};
use clap::{Args, Subcommand};

use super::utils;

#[derive(Args)]
#[command(
    about = "Offline cache lifecycle and inspection",
    long_about = "Control the cache worker lifecycle by hand and inspect what is on
disk. 'install' seeds the static partition from the asset manifest
all-or-nothing; 'activate' takes over serving and sweeps partitions left
behind by older cache versions; 'status' shows every partition with its
entry count and size.",
    help_template = crate::clap_help!(
        examples: "  # What is cached right now?\n  \
                   {bin} cache status\n\n  \
                   # Seed static assets from the origin\n  \
                   {bin} cache install\n\n  \
                   # Sweep partitions from older versions\n  \
                   {bin} cache activate\n\n  \
                   # Start over\n  \
                   {bin} cache clear"
    )
)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show partitions, entry counts and sizes
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Seed the static partition from the asset manifest
    Install,
    /// Install if needed, take over and sweep stale partitions
    Activate,
    /// Delete every cache partition
    Clear,
}

pub fn run(cmd: CacheCommand, config: AppConfig) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async {
        match cmd.action {
            CacheAction::Status { json } => status(&config, json),
            CacheAction::Install => install(&config).await,
            CacheAction::Activate => activate(&config).await,
            CacheAction::Clear => clear(&config),
        }
    })
}

fn current_partitions(config: &AppConfig) -> Vec<String> {
    [PartitionKind::Static, PartitionKind::Image, PartitionKind::Api]
        .iter()
        .map(|k| k.partition(config.cache_version))
        .collect()
}

fn status(config: &AppConfig, json: bool) -> Result<()> {
    let manager = CacheManager::new(config.cache_config())?;
    let store = manager.store();
    let current = current_partitions(config);
    let on_disk = store.partitions()?;

    if json {
        let partitions: Vec<_> = on_disk
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "current": current.contains(name),
                    "entries": store.entry_count(name),
                    "size_bytes": store.partition_size(name),
                })
            })
            .collect();
        let out = serde_json::json!({
            "directory": utils::display_path(&config.cache_dir).display().to_string(),
            "version": config.cache_version,
            "partitions": partitions,
        });
        println!("{}", sonic_rs::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("🫐 Blueberry Cache Status");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("📁 Store");
    println!("───────────────────────────────────────────────────────────────");
    println!("  Directory:       {}", utils::display_path(&config.cache_dir).display());
    println!("  Version:         v{}", config.cache_version);
    println!();
    println!("📦 Partitions");
    println!("───────────────────────────────────────────────────────────────");
    if on_disk.is_empty() {
        println!("  (none - run 'blueberry cache install' to seed static assets)");
    } else {
        for name in &on_disk {
            let marker = if current.contains(name) { "✓" } else { "✗ stale" };
            println!(
                "  {:<26} {:>5} entries  {:>10}  {}",
                name,
                store.entry_count(name),
                utils::format_bytes(store.partition_size(name)),
                marker
            );
        }
    }
    println!();
    Ok(())
}

async fn install(config: &AppConfig) -> Result<()> {
    let manager = CacheManager::new(config.cache_config())?;
    let partition = PartitionKind::Static.partition(config.cache_version);
    let already = manager.store().partition_exists(&partition);

    manager.install().await?;

    let count = manager.store().entry_count(&partition);
    if already {
        println!("✓ Static partition {partition} already installed ({count} entries)");
    } else {
        println!("✓ Installed {count} static asset(s) into {partition}");
    }
    Ok(())
}

async fn activate(config: &AppConfig) -> Result<()> {
    let manager = CacheManager::new(config.cache_config())?;
    let before = manager.store().partitions()?;

    manager.install().await?;
    manager.activate()?;

    let after = manager.store().partitions()?;
    let removed: Vec<&str> = before
        .iter()
        .filter(|p| !after.contains(p))
        .map(|s| s.as_str())
        .collect();

    println!("✓ Cache active");
    if !removed.is_empty() {
        println!(
            "  Swept {} stale partition(s): {}",
            removed.len(),
            removed.join(", ")
        );
    }
    Ok(())
}

fn clear(config: &AppConfig) -> Result<()> {
    let manager = CacheManager::new(config.cache_config())?;
    let partitions = manager.store().partitions()?;
    if partitions.is_empty() {
        println!("Cache is already empty.");
        return Ok(());
    }

    for name in &partitions {
        manager.store().remove_partition(name)?;
    }
    println!("✓ Removed {} partition(s)", partitions.len());
    Ok(())
}
