use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Generate fake nginx request_times logs for testing", long_about = None)]
pub struct CliArgs {
    /// Lines per second, 0 writes as fast as possible
    #[arg(long, default_value_t = 10)]
    rate: u64,

    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Stop after this many lines instead of running until interrupted
    #[arg(long)]
    count: Option<u64>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Append to this file instead of writing to stdout
    #[arg(long)]
    log_file: Option<String>,
}
