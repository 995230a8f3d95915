use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use slow_pages::{
    LineParser, Settings, SlowPages,
    config::{DEFAULT_SLOW_THRESHOLD_SECS, SLOW_THRESHOLD_ENV},
    logging, report,
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Find slow pages in nginx request_times logs", long_about = None)]
struct Args {
    /// Log file to read, stdin when omitted or `-`
    #[arg(value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Upstream seconds at which a request counts as slow
    #[arg(long, env = SLOW_THRESHOLD_ENV, default_value_t = DEFAULT_SLOW_THRESHOLD_SECS)]
    slow_threshold: f64,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    /// Only show the N worst pages
    #[arg(long)]
    top: Option<usize>,

    /// Log and skip lines that match but cannot be parsed
    #[arg(long)]
    skip_malformed: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

#[derive(Debug, Default)]
struct Totals {
    lines: usize,
    unmatched: usize,
    malformed: usize,
    slow: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init("info");

    let reader: Box<dyn BufRead> = match &args.log_file {
        Some(path) if path.as_os_str() != "-" => {
            info!(path = %path.display(), "reading log file");
            Box::new(BufReader::new(File::open(path)?))
        }
        _ => {
            info!("reading log from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let parser = LineParser::request_times(Settings::with_slow_threshold(args.slow_threshold));
    let mut pages = SlowPages::new(args.slow_threshold);
    let mut totals = Totals::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        totals.lines += 1;

        let request = match parser.parse_line(&line) {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!(line_no, "line does not match request_times format");
                totals.unmatched += 1;
                continue;
            }
            Err(e) if args.skip_malformed => {
                warn!(line_no, error = %e, "skipping malformed line");
                totals.malformed += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match pages.record(&request) {
            Ok(true) => totals.slow += 1,
            Ok(false) => {}
            Err(e) if args.skip_malformed => {
                warn!(line_no, error = %e, "skipping request");
                totals.malformed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        dialect = parser.dialect().name,
        lines = totals.lines,
        unmatched = totals.unmatched,
        malformed = totals.malformed,
        slow = totals.slow,
        pages = pages.len(),
        threshold = args.slow_threshold,
        "finished reading log"
    );

    let ranked = report::rank(pages.into_pages(), args.top);
    match args.format {
        ReportFormat::Table => print!("{}", report::render_table(&ranked)),
        ReportFormat::Json => println!("{}", report::render_json(&ranked)?),
    }
    Ok(())
}
