//! Per-client session engine
// (c) 2025 the mftp developers

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error, warn};

use crate::protocol::{ControlMessage, ControlStream, ProtocolError, Response};
use crate::protocol::{read_message, write_response};
use crate::server::listen_ephemeral;
use crate::util::{fs, io, process};

/// One client's server-side session.
///
/// The session owns its control connection, at most one data connection at
/// a time, and a private working directory. The working directory is a
/// per-session value, never the process working directory, so any number of
/// sessions can run in one process without interfering.
pub struct Session<C: ControlStream> {
    control: C,
    data: Option<TcpStream>,
    cwd: PathBuf,
}

impl<C: ControlStream> Session<C> {
    /// Creates a session rooted at the process's current directory.
    pub fn new(control: C) -> std::io::Result<Self> {
        Ok(Self::with_cwd(control, std::env::current_dir()?))
    }

    /// Creates a session rooted at an explicit directory.
    pub fn with_cwd(control: C, cwd: PathBuf) -> Self {
        Self {
            control,
            data: None,
            cwd,
        }
    }

    /// Runs the session to completion: reads commands until the client quits
    /// or the control connection goes away.
    ///
    /// Per-command failures are reported to the client and the session
    /// continues; only a control-connection transport failure is an error
    /// here.
    pub async fn run(mut self) -> Result<()> {
        loop {
            match read_message(&mut self.control).await {
                Ok(None) => {
                    debug!("client closed the control connection");
                    return Ok(());
                }
                Ok(Some(ControlMessage::Quit)) => {
                    self.respond(Response::Ack).await?;
                    debug!("session ended by client");
                    return Ok(());
                }
                Ok(Some(msg)) => self.process(msg).await?,
                Err(ProtocolError::Io(e)) => {
                    return Err(anyhow!(e).context("reading control connection"));
                }
                Err(e) => {
                    // Malformed line from a misbehaving client; tell it and
                    // carry on.
                    self.respond(Response::Error(e.to_string())).await?;
                }
            }
        }
    }

    async fn process(&mut self, msg: ControlMessage) -> Result<()> {
        match msg {
            ControlMessage::Quit => unreachable!("handled by the session loop"),
            ControlMessage::OpenData => self.open_data().await,
            ControlMessage::Chdir(path) => self.chdir(&path).await,
            ControlMessage::List | ControlMessage::Get(_) | ControlMessage::Show(_)
            | ControlMessage::Put(_) => {
                let Some(data) = self.data.take() else {
                    return self
                        .respond(Response::Error("Data connection not established".into()))
                        .await;
                };
                match msg {
                    ControlMessage::List => self.list(data).await,
                    ControlMessage::Get(path) | ControlMessage::Show(path) => {
                        self.send_file(&path, data).await
                    }
                    ControlMessage::Put(path) => self.receive_file(&path, data).await,
                    _ => unreachable!(),
                }
            }
        }
    }

    async fn respond(&mut self, rsp: Response) -> Result<()> {
        write_response(&mut self.control, &rsp)
            .await
            .context("writing control connection")
    }

    /// Reports the outcome of a command: plain ack on success, the error's
    /// text on failure.
    async fn respond_outcome(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => self.respond(Response::Ack).await,
            Err(e) => self.respond(Response::Error(format!("{e:#}"))).await,
        }
    }

    /// Resolves a client-supplied path against the session working
    /// directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// `D`: binds an ephemeral listener, publishes its port, accepts exactly
    /// one peer.
    async fn open_data(&mut self) -> Result<()> {
        if self.data.is_some() {
            return self
                .respond(Response::Error("Data connection already established".into()))
                .await;
        }

        let (listener, port) = match listen_ephemeral().await {
            Ok(lp) => lp,
            Err(e) => {
                warn!("could not create data socket: {e:#}");
                return self
                    .respond(Response::Error("Failed to create data socket".into()))
                    .await;
            }
        };

        // The port must be published before the accept; until the client
        // knows the port, nobody will ever connect.
        self.respond(Response::AckPort(port)).await?;

        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("accepted data connection from {peer}");
                self.data = Some(stream);
            }
            Err(e) => {
                // The ack is already on the wire, so a second response would
                // desynchronise the session. The next data-bearing command
                // reports the missing connection instead.
                error!("accepting data connection: {e}");
            }
        }
        Ok(())
    }

    /// `C`: repoints the session working directory.
    async fn chdir(&mut self, path: &str) -> Result<()> {
        let target = self.resolve(path);
        let outcome = match tokio::fs::canonicalize(&target).await {
            Ok(canonical) => match tokio::fs::metadata(&canonical).await {
                Ok(meta) if meta.is_dir() => {
                    debug!("changing directory to {}", canonical.display());
                    self.cwd = canonical;
                    Ok(())
                }
                Ok(_) => Err(anyhow!("{} is not a directory", canonical.display())),
                Err(e) => Err(anyhow!(e)),
            },
            Err(e) => Err(anyhow!(e)),
        };
        self.respond_outcome(outcome).await
    }

    /// `L`: runs the directory listing into the data connection.
    async fn list(&mut self, mut data: TcpStream) -> Result<()> {
        let result = process::run_to_sink("ls", &["-l"], &self.cwd, &mut data)
            .await
            // The listing's own exit status is not part of the protocol;
            // only the plumbing is.
            .map(|_status| ());
        let _ = data.shutdown().await;
        drop(data);
        self.respond_outcome(result).await
    }

    /// `G`/`S`: streams a regular file into the data connection.
    async fn send_file(&mut self, path: &str, mut data: TcpStream) -> Result<()> {
        let result = self.stream_path(path, &mut data).await;
        let _ = data.shutdown().await;
        drop(data);
        self.respond_outcome(result).await
    }

    async fn stream_path(&self, path: &str, data: &mut TcpStream) -> Result<()> {
        let source = self.resolve(path);
        let meta = tokio::fs::metadata(&source).await?;
        if !meta.is_file() {
            anyhow::bail!("{path} is not a regular file");
        }
        let mut file = File::open(&source).await?;
        let sent = io::stream(&mut file, data).await?;
        debug!("sent {sent} bytes from {}", source.display());
        Ok(())
    }

    /// `P`: opens the destination, acks, then drains the data connection
    /// into it.
    ///
    /// This is the one command that acknowledges before its transfer: the
    /// client must not send the payload until the destination is known to be
    /// writable. No further response follows the payload.
    async fn receive_file(&mut self, path: &str, mut data: TcpStream) -> Result<()> {
        let dest = match fs::basename(path) {
            Some(name) => self.cwd.join(name),
            None => {
                return self
                    .respond(Response::Error(format!("{path:?} does not name a file")))
                    .await;
            }
        };

        let open_result = fs::exclusive_create(&dest).await;
        let mut file = match open_result {
            Ok(file) => {
                self.respond(Response::Ack).await?;
                file
            }
            Err(e) => {
                return self.respond(Response::Error(format!("{e:#}"))).await;
            }
        };

        match io::stream(&mut data, &mut file).await {
            Ok(received) => debug!("received {received} bytes into {}", dest.display()),
            // Transfer already under way; there is no response slot left in
            // the protocol to report this in.
            Err(e) => error!("receiving {}: {e}", dest.display()),
        }
        drop(data);
        Ok(())
    }
}
