use indicatif::{ProgressBar, ProgressStyle};

/// Records-per-file bar; `label` is shown as the message prefix
pub fn create_count_progress_bar(total_items: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_items);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("Failed to create progress style")
            .progress_chars("#>-")
    );
    pb.set_message(label.to_string());
    pb
}

/// Bar that never draws, for library callers and tests
pub fn create_hidden_progress_bar(total_items: u64) -> ProgressBar {
    let pb = ProgressBar::hidden();
    pb.set_length(total_items);
    pb
}
