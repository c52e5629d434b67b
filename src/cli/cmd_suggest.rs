use anyhow::Result;
use blueberry::{AppConfig, CatalogLoader, SuggestionIndex, SuggestionKind};
use clap::Args;

use super::utils;

#[derive(Args)]
#[command(
    about = "Search-box suggestions from catalog metadata",
    long_about = "Load the catalog, build the suggestion index over its tags, categories
and performers, and print the typed completions for a query. Matching is
a case-insensitive substring check; queries shorter than two characters
return nothing.",
    help_template = crate::clap_help!(
        examples: "  # Suggestions for a partial word\n  \
                   {bin} suggest roc\n\n  \
                   # At most three, as JSON\n  \
                   {bin} suggest roc --limit 3 --json"
    )
)]
pub struct SuggestCommand {
    /// Search text
    pub query: String,

    /// Maximum suggestions to return
    #[arg(long, default_value = "10")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: SuggestCommand, config: AppConfig) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async {
        let manager = utils::ready_manager(&config).await?;
        let loader = CatalogLoader::new(manager, config.loader_options());

        let catalog = loader.load_all().await?;
        let index = SuggestionIndex::build_from(&catalog);
        let suggestions = index.query(&cmd.query, cmd.limit);

        if cmd.json {
            println!("{}", sonic_rs::to_string_pretty(&suggestions)?);
            return Ok(());
        }

        if suggestions.is_empty() {
            println!("No suggestions for {:?}.", cmd.query);
            return Ok(());
        }

        println!("🔎 {} suggestion(s) for {:?}", suggestions.len(), cmd.query);
        for suggestion in &suggestions {
            let kind = match suggestion.kind {
                SuggestionKind::Tag => "tag",
                SuggestionKind::Category => "category",
                SuggestionKind::Performer => "performer",
            };
            println!("  {:<10} {}", kind, suggestion.value);
        }

        Ok(())
    })
}
