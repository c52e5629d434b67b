use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for shard loading, one tick per shard.
///
/// Hidden entirely in quiet mode so machine-readable output stays clean.
pub fn shard_bar(total: u32, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:.cyan}/{len:.cyan} shards | ETA: {eta}")
            .unwrap()
            .progress_chars("█▓▒░ "),
    );
    pb
}
