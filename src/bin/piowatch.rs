//! piowatch - per-process disk I/O sampler.
//!
//! Samples every process's cumulative read/write byte counters twice across
//! a fixed interval and prints the bytes per second each process moved.
//!
//! Usage:
//!   sudo piowatch                 # one 5-second cycle
//!   sudo piowatch -f -t 10        # human-readable, 10-second interval
//!   sudo piowatch -u alice 6      # six cycles, alice's processes only
//!   piowatch -s -a                # own processes, including idle ones
//!   sudo piowatch 12 2            # twelve cycles, 2-second interval

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use piowatch::collector::RealFs;
use piowatch::engine::{CycleConfig, SamplingEngine};
use piowatch::report::{ReportOptions, Reporter};

/// Per-process disk I/O sampler.
#[derive(Parser)]
#[command(name = "piowatch", about = "Per-process disk I/O sampler", version)]
struct Args {
    /// Report every process, not only those with I/O during the interval.
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Human-readable output: header, K/M/G rate suffixes, and notes for
    /// processes that lived through only one pass.
    #[arg(short = 'f', long = "fancy")]
    fancy: bool,

    /// Sampling interval in seconds.
    #[arg(
        short = 't',
        long = "interval",
        value_name = "SECS",
        default_value = "5"
    )]
    interval: u64,

    /// Only sample processes owned by the invoking user.
    #[arg(short = 's', long = "same-user", conflicts_with = "user")]
    same_user: bool,

    /// Only sample processes owned by this login name.
    #[arg(short = 'u', long = "user", value_name = "LOGIN")]
    user: Option<String>,

    /// Skip the root privilege check.
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Number of sampling cycles to run.
    #[arg(value_name = "LOOPS")]
    loops: Option<u32>,

    /// Interval in seconds, overriding -t.
    #[arg(value_name = "SECS")]
    interval_override: Option<u64>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("piowatch={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the uid to filter by, if any. Unknown logins are a startup
/// error: no cycle runs with a filter that cannot match anything.
fn resolve_filter_uid(args: &Args, euid: nix::unistd::Uid) -> Option<u32> {
    if args.same_user {
        return Some(euid.as_raw());
    }
    let login = args.user.as_deref()?;
    match nix::unistd::User::from_name(login) {
        Ok(Some(user)) => Some(user.uid.as_raw()),
        Ok(None) => {
            eprintln!("Unknown user: {}", login);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Cannot resolve user {}: {}", login, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    // A trailing positional interval wins over -t.
    let interval_secs = args.interval_override.unwrap_or(args.interval);
    let loops = args.loops.unwrap_or(1).max(1);

    let euid = nix::unistd::geteuid();
    let filter_uid = resolve_filter_uid(&args, euid);

    // Other users' counter files are unreadable without privilege, so a
    // non-root unfiltered run would silently report almost nothing.
    if !euid.is_root() && !args.same_user && !args.debug {
        eprintln!(
            "You are not root (uid {}). Use sudo, or -s for your own processes.",
            euid
        );
        std::process::exit(1);
    }

    let config = CycleConfig {
        interval: Duration::from_secs(interval_secs),
        filter_uid,
    };
    let engine = SamplingEngine::new(RealFs::new(), &args.proc_path);
    let reporter = Reporter::new(
        engine.fs(),
        &args.proc_path,
        ReportOptions {
            show_all: args.all,
            fancy: args.fancy,
        },
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!(
        "piowatch {} starting: interval={}s, loops={}, proc={}",
        env!("CARGO_PKG_VERSION"),
        interval_secs,
        loops,
        args.proc_path
    );

    let stdout = std::io::stdout();
    for cycle in 1..=loops {
        if !running.load(Ordering::SeqCst) {
            info!("Received shutdown signal, stopping before cycle {}", cycle);
            break;
        }

        match engine.run_cycle(&config) {
            Ok(report) => {
                debug!(
                    "cycle {}: {} samples, {} vanished",
                    cycle,
                    report.samples.len(),
                    report.vanished.len()
                );
                let mut out = stdout.lock();
                if let Err(e) = reporter.print_cycle(&mut out, &report, interval_secs) {
                    error!("Failed to write report: {}", e);
                    std::process::exit(1);
                }
            }
            Err(e) => {
                // An unreadable process table does not heal between cycles.
                error!("Cycle {} aborted: {}", cycle, e);
                std::process::exit(1);
            }
        }
    }
}
