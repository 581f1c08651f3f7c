//! Output formatting and progress bars for the CLI

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar over experiment runs.
pub fn create_run_progress(total_runs: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_runs);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} runs")
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );
    pb
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{key}:"), value);
}
