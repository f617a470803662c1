use clap::Parser;
use owon_listener::app::{Options, RealSource, RunError, run_with_io};
use std::panic::{self, PanicHookInfo};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(250);

/// Diagnostics go to stderr so stdout only carries readings.
fn init_logging(options: &Options) {
    let level = if options.debug {
        LevelFilter::DEBUG
    } else if options.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// How the listener stopped.
enum Outcome {
    Finished(Result<(), RunError>),
    Interrupted,
}

fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    init_logging(&options);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    };

    let outcome = runtime.block_on(async {
        let mut stdout = std::io::stdout();
        tokio::select! {
            result = run_with_io(options, &RealSource, &mut stdout) => Outcome::Finished(result),
            _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
        }
    });

    // Drops the source tasks, which kills gatttool before the process exits.
    // Reads of stdin are not cancellable, so do not wait on them.
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);

    match outcome {
        Outcome::Interrupted => {
            println!("\nExit requested");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Outcome::Finished(Ok(())) => std::process::exit(EXIT_SUCCESS),
        Outcome::Finished(Err(why)) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
