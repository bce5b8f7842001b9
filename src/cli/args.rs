//! Command-line argument definitions
// (c) 2025 the mftp developers

use clap::Parser;

/// Arguments accepted by the `mftp` client binary.
#[derive(Debug, Parser, Clone)]
#[command(name = "mftp", about = "Interactive file transfer client")]
pub struct ClientArgs {
    /// Enable debug output.
    ///
    /// This has the same effect as setting `RUST_LOG=mftp=debug` in the
    /// environment. If present, `RUST_LOG` overrides this option.
    #[arg(short, long)]
    pub debug: bool,

    /// The server host to connect to.
    #[arg(value_name = "HOSTNAME")]
    pub host: String,
}

/// Arguments accepted by the `mftpserve` server binary.
#[derive(Debug, Parser, Clone)]
#[command(name = "mftpserve", about = "File transfer server")]
pub struct ServerArgs {
    /// Enable debug output.
    ///
    /// This has the same effect as setting `RUST_LOG=mftp=debug` in the
    /// environment. If present, `RUST_LOG` overrides this option.
    #[arg(short, long)]
    pub debug: bool,
}

#[cfg(test)]
mod test {
    use super::{ClientArgs, ServerArgs};
    use clap::Parser;

    #[test]
    fn client_args() {
        let args = ClientArgs::parse_from(["mftp", "myserver"]);
        assert!(!args.debug);
        assert_eq!(args.host, "myserver");

        let args = ClientArgs::parse_from(["mftp", "-d", "myserver"]);
        assert!(args.debug);
    }

    #[test]
    fn client_requires_a_host() {
        assert!(ClientArgs::try_parse_from(["mftp"]).is_err());
        assert!(ClientArgs::try_parse_from(["mftp", "a", "b"]).is_err());
    }

    #[test]
    fn server_args() {
        let args = ServerArgs::parse_from(["mftpserve"]);
        assert!(!args.debug);
        let args = ServerArgs::parse_from(["mftpserve", "--debug"]);
        assert!(args.debug);
    }

    #[test]
    fn server_takes_no_positional() {
        assert!(ServerArgs::try_parse_from(["mftpserve", "extra"]).is_err());
    }
}
