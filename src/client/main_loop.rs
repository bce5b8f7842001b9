//! Main client mode event loop: the REPL driver
// (c) 2025 the mftp developers

use anyhow::{Context as _, Result};
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tracing::debug;

use super::session::{Outcome, Session};
use crate::config;
use crate::protocol::{Command, ControlStream};
use crate::util::io;

/// Client event loop: connects to `host` and drives the prompt until the
/// user exits or the input ends.
pub async fn run(host: &str) -> Result<()> {
    let control = TcpStream::connect((host, config::CONTROL_PORT))
        .await
        .with_context(|| format!("connecting to {host}:{}", config::CONTROL_PORT))?;
    debug!("connected to {host}:{}", config::CONTROL_PORT);

    let mut session = Session::new(control, host);
    let mut input = tokio::io::stdin();
    repl(&mut session, &mut input).await
}

/// The prompt loop, with the input source injected for testability.
///
/// EOF on the input ends the session by dropping the control connection; no
/// farewell message is owed to the server.
async fn repl<C, I>(session: &mut Session<C>, input: &mut I) -> Result<()>
where
    C: ControlStream,
    I: AsyncRead + Unpin,
{
    loop {
        prompt()?;
        let Some(line) = io::read_line(input, config::MAX_LINE).await? else {
            debug!("end of input; closing session");
            return Ok(());
        };
        if line.is_empty() {
            debug!("empty user input received; skipping");
            continue;
        }

        let outcome = match Command::parse(&line) {
            Err(_) => {
                println!("Unrecognized command: \"{line}\"");
                Outcome::Failure
            }
            Ok(cmd) => {
                match cmd.argument() {
                    Some(arg) => println!("Running \"{cmd}\" with argument \"{arg}\""),
                    None => println!("Running \"{cmd}\""),
                }
                session.run_command(&cmd).await?
            }
        };

        match outcome {
            Outcome::Quit => return Ok(()),
            Outcome::Success => println!("Command finished successfully (status = 0)"),
            Outcome::Failure => println!("Command finished unsuccessfully (status = 1)"),
        }
    }
}

fn prompt() -> Result<()> {
    use std::io::Write as _;
    print!("{}", config::PROMPT);
    std::io::stdout().flush()?;
    Ok(())
}
