//! Tracing helpers
// (c) 2025 the mftp developers

use tracing_subscriber::EnvFilter;

/// Environment variable that controls what gets logged to stderr
const STANDARD_ENV_VAR: &str = "RUST_LOG";

/// Log filter setup:
/// Use `RUST_LOG` if set; if it wasn't present, log only mftp items at the
/// level selected on the command line.
fn filter_for(debug: bool) -> anyhow::Result<EnvFilter> {
    let trace_level = if debug { "debug" } else { "info" };
    EnvFilter::try_from_env(STANDARD_ENV_VAR).or_else(|e| {
        // The env var was unset or invalid. Which is it?
        if std::env::var(STANDARD_ENV_VAR).is_ok() {
            anyhow::bail!("{STANDARD_ENV_VAR} (set in environment) was not understood: {e}");
        }
        // It was unset. Fall back.
        Ok(EnvFilter::try_new(format!("mftp={trace_level}"))?)
    })
}

/// Initialises the tracing subscriber for one of the binaries.
///
/// Log output goes to stderr so that it cannot interleave with the client's
/// prompt and command chatter on stdout.
pub(crate) fn setup(debug: bool) -> anyhow::Result<()> {
    let filter = filter_for(debug)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::filter_for;

    #[test]
    fn default_filters() {
        // Only sound while RUST_LOG is unset, which is the case in CI.
        if std::env::var(super::STANDARD_ENV_VAR).is_ok() {
            return;
        }
        assert_eq!(filter_for(true).unwrap().to_string(), "mftp=debug");
        assert_eq!(filter_for(false).unwrap().to_string(), "mftp=info");
    }
}
