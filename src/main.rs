//! Region report CLI entry point

use anyhow::Result;
use region_report::config::{self, cli::Cli};
use region_report::{output, Coordinator, ReportError};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version print to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            if let Err(print_err) = e.print() {
                eprintln!("error: failed to print usage: {}", print_err);
                return ExitCode::from(1);
            }
            return ExitCode::from(code);
        }
    };

    init_logging(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Build configuration, run the workers, print the report
fn run(cli: &Cli) -> Result<()> {
    let config = config::build_config(cli)?;
    debug!(?config, "effective configuration");

    let outcome = Coordinator::from_config(&config).run()?;
    output::print_report(config.output.format, &outcome)?;

    Ok(())
}

/// Map a failure to the process exit status
fn exit_code(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<ReportError>()
        .map(ReportError::exit_code)
        .unwrap_or(1)
}

/// Initialize tracing on stderr
///
/// `--debug` forces debug level; otherwise `RUST_LOG` applies, defaulting to
/// warnings only so a successful run prints nothing but the report.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
