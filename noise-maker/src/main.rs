mod args;
mod generator;
mod stream;

use std::{
    fs::OpenOptions,
    io::{self, Write},
};

use args::CliArgs;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use stream::run_log_stream;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let mut rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    eprintln!(
        "Writing request_times logs at {} lines/sec in batches of {}",
        args.rate(),
        args.batch_size()
    );

    let mut out: Box<dyn Write> = match args.log_file() {
        Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let written = run_log_stream(
        &mut out,
        &mut rng,
        *args.rate(),
        *args.batch_size(),
        *args.count(),
    )?;
    eprintln!("Wrote {written} lines");
    Ok(())
}
