//! mftp server - main entrypoint
// (c) 2025 the mftp developers

use std::process::ExitCode;

fn main() -> ExitCode {
    mftp::cli::server(std::env::args_os())
}
