//! Side-process composition: commands whose output feeds a byte sink
// (c) 2025 the mftp developers

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context as _, Result, anyhow};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;
use tracing::debug;

use super::io;

/// The pager used to present listings and remote file contents.
const PAGER: &[&str] = &["more", "-20"];

/// Runs `program` with `args` in `cwd`, streaming its standard output into
/// `sink`.
///
/// Returns the child's exit status. The status is reported for logging only;
/// callers decide success by whether the plumbing itself held up.
pub(crate) async fn run_to_sink<W>(
    program: &str,
    args: &[&str],
    cwd: &Path,
    sink: &mut W,
) -> Result<ExitStatus>
where
    W: AsyncWrite + Unpin,
{
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not spawn {program}"))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("could not access {program} stdout"))?;

    let copied = io::stream(&mut stdout, sink).await;
    if copied.is_err() {
        // Sink went away; don't leave the child writing into the void.
        let _ = child.start_kill();
    }
    let status = child.wait().await?;
    let copied = copied.with_context(|| format!("streaming {program} output"))?;

    debug!("{program} wrote {copied} bytes, {status}");
    Ok(status)
}

/// Feeds `src` through the pager until `src` reports EOF.
///
/// The pager's exit status is best-effort presentation detail; a pager quit
/// before the source was exhausted is not an error.
pub(crate) async fn page_stream<R>(src: &mut R) -> Result<ExitStatus>
where
    R: AsyncRead + Unpin,
{
    let mut child = Command::new(PAGER[0])
        .args(&PAGER[1..])
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("could not spawn {}", PAGER[0]))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("could not access pager stdin"))?;

    let copied = io::stream(src, &mut stdin).await;
    drop(stdin); // EOF to the pager
    let status = child.wait().await?;

    match copied {
        // the user quit the pager early
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => (),
        other => {
            let _ = other.context("streaming into pager")?;
        }
    }
    Ok(status)
}

/// Runs `program` with `args` in the current directory and feeds its output
/// through the pager.
pub(crate) async fn page_command_output(program: &str, args: &[&str]) -> Result<ExitStatus> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("could not spawn {program}"))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("could not access {program} stdout"))?;

    let paged = page_stream(&mut stdout).await;
    if paged.is_err() {
        let _ = child.start_kill();
    }
    let status = child.wait().await?;
    let _ = paged?;
    Ok(status)
}
