mod error;
mod input;
mod output;

use std::path::PathBuf;
use std::process;

use av1_split::split_stream;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};
use crate::output::DirFrameSink;

#[derive(Parser, Debug)]
#[command(
    name = "obusplit",
    version,
    about = "Split an AV1 low-overhead OBU stream into one file per temporal unit"
)]
struct Args {
    /// Input AV1 elementary stream (obu_has_size_field=1 throughout)
    input: PathBuf,

    /// Directory to write frame-<N>.obu files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log every decoded OBU
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let data = input::read_input(&args.input)?;
    let sink = DirFrameSink::new(args.output_dir.clone());

    let outcome = split_stream(&data, sink)?;
    let stats = outcome.stats;

    if let Some(truncation) = outcome.truncation
        && stats.obus == 0
    {
        // Nothing was consumed before the stream fell apart.
        return Err(truncation.into());
    }

    println!(
        "Extracted {} frames / {} bytes (input file size: {} bytes)",
        stats.frames,
        stats.frame_bytes,
        data.len()
    );

    if stats.sink_errors > 0 {
        return Err(AppError::SinkFailures(stats.sink_errors));
    }

    Ok(())
}
