use std::{io::Write, thread::sleep, time::Duration};

use rand::Rng;

use crate::generator::generate_request_times_log;

const MAX_RATE_BEFORE_DISABLING_THROTTLING: u64 = 10_000;

/// Writes batches of generated lines until `count` lines are out, or forever
/// when `count` is `None`.
pub fn run_log_stream<W: Write, R: Rng + ?Sized>(
    out: &mut W,
    rng: &mut R,
    rate: u64,
    batch_size: usize,
    count: Option<u64>,
) -> std::io::Result<u64> {
    let batch_size = batch_size.max(1);
    let delay = if rate > 0 && rate < MAX_RATE_BEFORE_DISABLING_THROTTLING {
        Some(Duration::from_secs_f64(batch_size as f64 / rate as f64))
    } else {
        None
    };

    let mut written = 0u64;
    loop {
        let mut buffer = String::with_capacity(batch_size * 256);
        for _ in 0..batch_size {
            if count.is_some_and(|limit| written >= limit) {
                break;
            }
            buffer.push_str(&generate_request_times_log(rng));
            buffer.push('\n');
            written += 1;
        }
        out.write_all(buffer.as_bytes())?;
        out.flush()?;

        if count.is_some_and(|limit| written >= limit) {
            return Ok(written);
        }
        if let Some(d) = delay {
            sleep(d);
        }
    }
}
