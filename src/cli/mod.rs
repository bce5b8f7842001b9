//! CLI entry points for the two binaries
// (c) 2025 the mftp developers

use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;

mod args;
pub use args::{ClientArgs, ServerArgs};

/// Main entrypoint for the `mftp` client binary.
///
/// Call this from `main` with argv.
#[must_use]
pub fn client<I, T>(argv: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match ClientArgs::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) => return exit_for_clap_error(&e),
    };
    run_reporting_errors(client_inner(args))
}

/// Main entrypoint for the `mftpserve` server binary.
///
/// Call this from `main` with argv.
#[must_use]
pub fn server<I, T>(argv: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match ServerArgs::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) => return exit_for_clap_error(&e),
    };
    run_reporting_errors(server_inner(args))
}

#[tokio::main(flavor = "current_thread")]
async fn client_inner(args: ClientArgs) -> anyhow::Result<()> {
    crate::util::setup_tracing(args.debug)?;
    crate::client::run(&args.host).await
}

#[tokio::main]
async fn server_inner(args: ServerArgs) -> anyhow::Result<()> {
    crate::util::setup_tracing(args.debug)?;
    crate::server::serve().await
}

/// Help and version requests are normal exits; anything else is a usage
/// error on stderr with exit code 1.
fn exit_for_clap_error(e: &clap::Error) -> ExitCode {
    match e.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
            print!("{e}");
            ExitCode::SUCCESS
        }
        _ => {
            eprint!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_reporting_errors(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
