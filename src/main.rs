use std::error::Error;
use std::num::NonZeroUsize;
use std::process::ExitCode;

use bytesize::ByteSize;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use log::LevelFilter;
use thousands::Separable;

use cachescratch::{AllocatorChoice, Workload, elapsed_line};

/// Measure how an allocator copes with threads reusing memory that was allocated together.
#[derive(Debug, Parser)]
#[command(name = "cachescratch", version)]
struct Cli {
    /// Number of worker threads
    nthreads: u32,

    /// Allocate/write/free cycles per worker
    iterations: u64,

    /// Size of each object in bytes
    #[arg(value_name = "OBJSIZE")]
    obj_size: NonZeroUsize,

    /// Passes over each object, summed over all workers (split evenly, remainder dropped)
    repetitions: u64,

    /// Allocator under test
    #[arg(short, long, default_value_t = AllocatorChoice::System)]
    allocator: AllocatorChoice,

    /// Log more to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Anything after the four workload parameters is ignored
    #[arg(hide = true)]
    ignored: Vec<String>,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => { builder.filter_level(LevelFilter::Info); }
        _ => { builder.filter_level(LevelFilter::Debug); }
    }
    builder.format_timestamp(None).init();
}

fn conv(size: usize) -> String {
    ByteSize::b(size as u64).to_string_as(true) // true for binary units (KiB, MiB, GiB, etc.)
}

pub fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Nothing has been allocated or spawned yet.
            let msg = e.render().to_string();
            eprint!("{msg}");
            if !msg.contains("Usage:") {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            return ExitCode::from(1);
        }
    };

    init_logging(cli.verbose);
    if !cli.ignored.is_empty() {
        log::warn!("ignoring extra arguments: {}", cli.ignored.join(" "));
    }

    let workload = Workload {
        nthreads: cli.nthreads,
        iterations: cli.iterations,
        obj_size: cli.obj_size,
        repetitions: cli.repetitions,
    };

    log::info!(
        "allocator: {}, threads: {}, iters: {}, objsize: {}, reps/thread: {}",
        cli.allocator,
        workload.nthreads,
        workload.iterations.separate_with_commas(),
        conv(workload.obj_size.get()),
        workload.repetitions_per_thread().separate_with_commas(),
    );
    let dropped = workload.dropped_repetitions();
    if dropped > 0 {
        log::info!("{dropped} of {} repetitions dropped by the even split", workload.repetitions);
    }

    let report = match cli.allocator.run(&workload) {
        Ok(report) => report,
        Err(e) => {
            match e.source() {
                Some(source) => eprintln!("Error: {e}: {source}"),
                None => eprintln!("Error: {e}"),
            }
            return ExitCode::FAILURE;
        }
    };

    for t in &report.tallies {
        log::debug!("worker {:>4}: iters: {:>11}, rounds: {:>13}, bytes: {:>15}", t.index, t.iterations.separate_with_commas(), t.rounds.separate_with_commas(), t.bytes_written.separate_with_commas());
    }
    let iters = workload.iterations * u64::from(workload.nthreads);
    if iters > 0 {
        log::info!("wrote {} bytes, ns: {}, ns/i: {:.1}", report.bytes_written().separate_with_commas(), report.elapsed, report.elapsed.per_iter(iters));
    }

    println!("{}", elapsed_line(report.elapsed_seconds()));
    ExitCode::SUCCESS
}
