//! mftp client - main entrypoint
// (c) 2025 the mftp developers

use std::process::ExitCode;

fn main() -> ExitCode {
    mftp::cli::client(std::env::args_os())
}
