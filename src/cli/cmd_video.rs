use anyhow::Result;
use blueberry::{AppConfig, CatalogLoader, VideoRecord};
use clap::Args;

use super::utils;

#[derive(Args)]
#[command(
    about = "Look up catalog records by id",
    long_about = "Load the catalog (through the cache) and print the records for one or
more video ids. Ids use the {shard}_{index} form, e.g. 3_17. Unknown ids
are reported on stderr but do not fail the command; results come back in
catalog order.",
    help_template = crate::clap_help!(
        examples: "  # Single record\n  \
                   {bin} video 3_17\n\n  \
                   # Several records as JSON\n  \
                   {bin} video 0_0 0_1 12_40 --json"
    )
)]
pub struct VideoCommand {
    /// Video ids ({shard}_{index} form)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: VideoCommand, config: AppConfig) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async {
        let manager = utils::ready_manager(&config).await?;
        let loader = CatalogLoader::new(manager, config.loader_options());

        let videos = loader.videos_by_ids(&cmd.ids).await?;
        let missing: Vec<&String> = cmd
            .ids
            .iter()
            .filter(|id| !videos.iter().any(|v| &v.id == *id))
            .collect();

        if cmd.json {
            let out = serde_json::json!({
                "videos": serde_json::to_value(&videos)?,
                "missing": missing,
            });
            println!("{}", sonic_rs::to_string_pretty(&out)?);
        } else {
            for video in &videos {
                print_video(video);
            }
            if videos.is_empty() {
                println!("No matching videos.");
            }
        }

        if !missing.is_empty() {
            eprintln!(
                "✗ {} id(s) not found: {}",
                missing.len(),
                missing
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(())
    })
}

fn print_video(video: &VideoRecord) {
    let title = if video.title.is_empty() {
        "(untitled)"
    } else {
        &video.title
    };
    println!("🎬 {}  {}", video.id, title);
    if !video.performer.is_empty() {
        println!("  Performer:     {}", video.performer);
    }
    if !video.duration.is_empty() || !video.views.is_empty() {
        println!("  Duration:      {:<10} Views: {}", video.duration, video.views);
    }
    if !video.tags.is_empty() {
        println!("  Tags:          {}", video.tags.join(", "));
    }
    if !video.categories.is_empty() {
        println!("  Categories:    {}", video.categories.join(", "));
    }
    println!("  Embed:         {}", video.embed_url);
    println!();
}
