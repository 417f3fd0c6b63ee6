//! Calendar benchmark driver.
//!
//! For each selected strategy: bulk-load the generated event stream, then time
//! inserting, finding and deleting a fixed random sample, and finally the
//! report traversal. Run in release mode for meaningful numbers.

use std::io::{self, BufWriter};
use std::time::{Duration, Instant};

use calendar_index::{
    write_report, Calendar, CalendarError, CalendarKind, CalendarResult, WorkloadConfig,
    DEFAULT_BUCKET_SPAN, DEFAULT_EVENTS, DEFAULT_SAMPLE_BOUND, DEFAULT_SAMPLE_SEED,
    DEFAULT_SAMPLE_SIZE, DEFAULT_SEED,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Benchmark calendar event indexes", long_about = None)]
struct Args {
    /// Events in the bulk load.
    #[arg(long, default_value_t = DEFAULT_EVENTS)]
    events: usize,
    /// Seed of the event stream.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Keys in the insert/find/delete sample.
    #[arg(long = "samples", default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,
    /// Sample keys are drawn below this clock.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BOUND)]
    sample_bound: u32,
    /// Seed of the sample keys.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    sample_seed: u64,
    /// Bucket width of the refined array, in seconds. Must divide a day.
    #[arg(long, default_value_t = DEFAULT_BUCKET_SPAN)]
    bucket_span: u32,
    /// Strategy to run (linked, nested, refined). Repeatable; default all.
    #[arg(long = "strategy", value_name = "STRATEGY")]
    strategies: Vec<CalendarKind>,
    /// Write the report to stdout instead of discarding it.
    #[arg(long)]
    print_report: bool,
}

impl Args {
    fn workload(&self) -> WorkloadConfig {
        WorkloadConfig {
            events: self.events,
            seed: self.seed,
            sample_size: self.sample_size,
            sample_bound: self.sample_bound,
            sample_seed: self.sample_seed,
        }
    }

    fn strategies(&self) -> Vec<CalendarKind> {
        if self.strategies.is_empty() {
            CalendarKind::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }
}

/// Timings and outcomes of one strategy run.
#[derive(Debug, Default)]
struct PhaseResults {
    load: Duration,
    insert: Duration,
    find: Duration,
    delete: Duration,
    report: Duration,
    inserted: usize,
    duplicates: usize,
    found: usize,
    deleted: usize,
    reported: usize,
}

fn per_op(elapsed: Duration, ops: usize) -> f64 {
    elapsed.as_nanos() as f64 / ops.max(1) as f64
}

fn run(kind: CalendarKind, args: &Args) -> Result<PhaseResults, Box<dyn std::error::Error>> {
    let workload = args.workload();
    let mut calendar = kind.build_with_span(args.bucket_span)?;
    let mut results = PhaseResults::default();

    info!(strategy = %kind, events = workload.events, "loading {}", calendar.name());
    let stream = workload.event_stream()?;
    let start = Instant::now();
    for tuple in stream {
        calendar.load_tuple(&tuple)?;
    }
    results.load = start.elapsed();

    let sample = workload.sample_keys()?;

    let start = Instant::now();
    for tuple in sample.insert_tuples() {
        match calendar.insert_tuple(&tuple) {
            Ok(()) => results.inserted += 1,
            Err(err) if err.is_duplicate() => results.duplicates += 1,
            Err(err) => return Err(err.into()),
        }
    }
    results.insert = start.elapsed();

    let start = Instant::now();
    for key in sample.iter() {
        if calendar.find(key)?.is_some() {
            results.found += 1;
        }
    }
    results.find = start.elapsed();

    let start = Instant::now();
    for key in sample.iter() {
        if calendar.delete(key)? {
            results.deleted += 1;
        }
    }
    results.delete = start.elapsed();

    let start = Instant::now();
    results.reported = if args.print_report {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_report(calendar.as_ref(), &mut out)?
    } else {
        write_report(calendar.as_ref(), &mut io::sink())?
    };
    results.report = start.elapsed();

    verify(calendar.as_ref(), &results)?;
    Ok(results)
}

/// Post-run structural check. A report that disagrees with the event count is
/// corruption.
fn verify(calendar: &dyn Calendar, results: &PhaseResults) -> CalendarResult<()> {
    calendar.validate()?;
    if results.reported != calendar.total_events() {
        return Err(CalendarError::corrupted(
            calendar.name(),
            &format!(
                "report wrote {} events but the count is {}",
                results.reported,
                calendar.total_events()
            ),
        ));
    }
    Ok(())
}

fn log_results(kind: CalendarKind, workload: &WorkloadConfig, results: &PhaseResults) {
    let samples = workload.sample_size;
    info!(
        strategy = %kind,
        "load: {:?} ({:.1} ns/event)",
        results.load,
        per_op(results.load, workload.events)
    );
    info!(
        strategy = %kind,
        inserted = results.inserted,
        duplicates = results.duplicates,
        "insert: {:?} ({:.1} ns/op)",
        results.insert,
        per_op(results.insert, samples)
    );
    info!(
        strategy = %kind,
        found = results.found,
        "find: {:?} ({:.1} ns/op)",
        results.find,
        per_op(results.find, samples)
    );
    info!(
        strategy = %kind,
        deleted = results.deleted,
        "delete: {:?} ({:.1} ns/op)",
        results.delete,
        per_op(results.delete, samples)
    );
    info!(
        strategy = %kind,
        events = results.reported,
        "report: {:?}",
        results.report
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "calendar_index=info,calendar_bench=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    args.workload().validate()?;
    info!(
        "calendar-bench v{}: {} events, {} samples below {}",
        env!("CARGO_PKG_VERSION"),
        args.events,
        args.sample_size,
        args.sample_bound
    );

    for kind in args.strategies() {
        let results = run(kind, &args)?;
        log_results(kind, &args.workload(), &results);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calendar_index::Event;

    #[test]
    fn test_verify_accepts_matching_report() {
        let mut calendar = CalendarKind::NestedArray.build();
        calendar.insert(Event::new(10, 0, 1, 0).unwrap()).unwrap();
        let results = PhaseResults {
            reported: 1,
            ..PhaseResults::default()
        };
        assert!(verify(calendar.as_ref(), &results).is_ok());
    }

    #[test]
    fn test_verify_rejects_count_mismatch() {
        let calendar = CalendarKind::LinkedList.build();
        let results = PhaseResults {
            reported: 3,
            ..PhaseResults::default()
        };
        assert!(matches!(
            verify(calendar.as_ref(), &results),
            Err(CalendarError::CorruptedStructure(_))
        ));
    }

    #[test]
    fn test_strategy_flags() {
        let args =
            Args::parse_from(["calendar-bench", "--strategy", "nested", "--strategy", "list"]);
        assert_eq!(
            args.strategies(),
            vec![CalendarKind::NestedArray, CalendarKind::LinkedList]
        );
        let args = Args::parse_from(["calendar-bench"]);
        assert_eq!(args.strategies(), CalendarKind::ALL.to_vec());
        assert_eq!(args.workload(), WorkloadConfig::default());
    }
}
