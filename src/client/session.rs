//! Client-side session engine: command dispatch and handshakes
// (c) 2025 the mftp developers

use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use crate::protocol::{Command, ControlMessage, ControlStream, ProtocolError, Response};
use crate::protocol::{read_response, write_message};
use crate::util::{fs, io, process};

/// How one command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command completed; status 0.
    Success,
    /// The command failed but the session is intact; status 1.
    Failure,
    /// The server acknowledged `exit`; the session is over.
    Quit,
}

/// The client's half of a session.
///
/// Owns the control connection for its whole lifetime; data connections are
/// opened against `host` on server-issued ports, one per transfer.
pub struct Session<C: ControlStream> {
    control: C,
    host: String,
}

impl<C: ControlStream> Session<C> {
    /// Wraps an established control connection to `host`.
    pub fn new(control: C, host: impl Into<String>) -> Self {
        Self {
            control,
            host: host.into(),
        }
    }

    /// Runs one user command to completion.
    ///
    /// `Ok` carries the command's outcome, including ordinary failures the
    /// user has already been told about. `Err` means the session itself is
    /// broken (transport or protocol failure) and the caller should stop.
    pub async fn run_command(&mut self, cmd: &Command) -> Result<Outcome> {
        match cmd {
            Command::Cd(path) => Ok(local_cd(path)),
            Command::Ls => Ok(local_ls().await),
            Command::Rcd(_) | Command::Exit => self.simple_remote(cmd).await,
            Command::Rls | Command::Show(_) => self.paged_transfer(cmd).await,
            Command::Get(path) => self.get(path).await,
            Command::Put(path) => self.put(path).await,
        }
    }

    async fn send(&mut self, msg: &ControlMessage) -> Result<()> {
        write_message(&mut self.control, msg)
            .await
            .context("writing control connection")
    }

    /// Reads the next response; EOF here is always a session-fatal protocol
    /// error.
    async fn expect_response(&mut self) -> Result<Response> {
        read_response(&mut self.control)
            .await?
            .ok_or_else(|| anyhow!(ProtocolError::UnexpectedEof))
    }

    /// Commands that are one message and one response: `rcd`, `exit`.
    async fn simple_remote(&mut self, cmd: &Command) -> Result<Outcome> {
        let msg = cmd
            .to_wire()
            .ok_or_else(|| anyhow!("{cmd} has no wire form"))?;
        self.send(&msg).await?;
        match self.expect_response().await? {
            Response::Error(reason) => {
                print_server_error(&reason);
                Ok(Outcome::Failure)
            }
            Response::Ack | Response::AckPort(_) => Ok(match cmd {
                Command::Exit => Outcome::Quit,
                _ => Outcome::Success,
            }),
        }
    }

    /// Runs the data-channel handshake.
    ///
    /// `Ok(None)` means the server refused (already reported to the user);
    /// `Err` means the session is broken.
    async fn open_data(&mut self) -> Result<Option<TcpStream>> {
        self.send(&ControlMessage::OpenData).await?;
        match self.expect_response().await? {
            Response::Error(reason) => {
                print_server_error(&reason);
                Ok(None)
            }
            Response::Ack => Err(anyhow!(ProtocolError::MissingPort)),
            Response::AckPort(port) => {
                let stream = TcpStream::connect((self.host.as_str(), port))
                    .await
                    .with_context(|| format!("connecting to data port {port}"))?;
                debug!("initialized data connection to {}:{port}", self.host);
                Ok(Some(stream))
            }
        }
    }

    /// `rls` and `show`: payload flows server to client, into the pager,
    /// then the terminal response arrives on the control connection.
    async fn paged_transfer(&mut self, cmd: &Command) -> Result<Outcome> {
        let msg = cmd
            .to_wire()
            .ok_or_else(|| anyhow!("{cmd} has no wire form"))?;
        let Some(mut data) = self.open_data().await? else {
            return Ok(Outcome::Failure);
        };
        self.send(&msg).await?;

        let paged = process::page_stream(&mut data).await;
        drop(data);

        let rsp = self.expect_response().await?;
        if let Err(e) = paged {
            eprintln!("Error: {e:#}");
            return Ok(Outcome::Failure);
        }
        Ok(match rsp {
            Response::Error(reason) => {
                print_server_error(&reason);
                Outcome::Failure
            }
            _ => Outcome::Success,
        })
    }

    /// `get`: payload flows server to client into `basename(path)` in the
    /// working directory, exclusive-create.
    async fn get(&mut self, path: &str) -> Result<Outcome> {
        let Some(dest) = fs::basename(path) else {
            eprintln!("Error: {path:?} does not name a file");
            return Ok(Outcome::Failure);
        };

        let Some(mut data) = self.open_data().await? else {
            return Ok(Outcome::Failure);
        };
        self.send(&ControlMessage::Get(path.to_string())).await?;

        let mut file = match fs::exclusive_create(Path::new(dest)).await {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Error: {dest}: {e}");
                // Closing the data socket unblocks the server; its terminal
                // response still has to be consumed.
                drop(data);
                let _ = self.expect_response().await?;
                return Ok(Outcome::Failure);
            }
        };

        let received = io::stream(&mut data, &mut file)
            .await
            .context("receiving file")?;
        drop(data);
        debug!("received {received} bytes into {dest}");

        match self.expect_response().await? {
            Response::Error(reason) => {
                print_server_error(&reason);
                Ok(Outcome::Failure)
            }
            _ => Ok(Outcome::Success),
        }
    }

    /// `put`: the local path must be a readable regular file before any
    /// traffic is sent; the server acks after opening its destination, and
    /// only then does the payload flow.
    async fn put(&mut self, path: &str) -> Result<Outcome> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Error: {path}: {e}");
                return Ok(Outcome::Failure);
            }
        };
        match file.metadata().await {
            Ok(meta) if meta.is_file() => (),
            _ => {
                eprintln!("Path \"{path}\" is not a readable regular file");
                return Ok(Outcome::Failure);
            }
        }

        let Some(mut data) = self.open_data().await? else {
            return Ok(Outcome::Failure);
        };
        self.send(&ControlMessage::Put(path.to_string())).await?;

        match self.expect_response().await? {
            Response::Error(reason) => {
                print_server_error(&reason);
                Ok(Outcome::Failure)
            }
            _ => {
                let sent = io::stream(&mut file, &mut data)
                    .await
                    .context("sending file")?;
                data.shutdown().await.context("closing data connection")?;
                drop(data);
                debug!("sent {sent} bytes from {path}");
                Ok(Outcome::Success)
            }
        }
    }
}

fn print_server_error(reason: &str) {
    eprintln!("Server error: {reason}");
}

fn local_cd(path: &str) -> Outcome {
    debug!("changing directory to {path}");
    match std::env::set_current_dir(path) {
        Ok(()) => Outcome::Success,
        Err(e) => {
            eprintln!("Error: {e}");
            Outcome::Failure
        }
    }
}

async fn local_ls() -> Outcome {
    match process::page_command_output("ls", &["-l"]).await {
        Ok(_status) => Outcome::Success,
        Err(e) => {
            eprintln!("Error: {e:#}");
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Outcome, Session};
    use crate::protocol::Command;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

    fn scripted_session() -> (Session<DuplexStream>, DuplexStream) {
        let (client, server) = duplex(1024);
        (Session::new(client, "localhost"), server)
    }

    async fn read_line_from(stream: &mut DuplexStream) -> String {
        let mut line = String::new();
        let mut byte = [0u8; 1];
        loop {
            let n = stream.read(&mut byte).await.unwrap();
            assert_ne!(n, 0, "unexpected EOF from client");
            if byte[0] == b'\n' {
                return line;
            }
            line.push(byte[0] as char);
        }
    }

    #[tokio::test]
    async fn rcd_sends_chdir_and_accepts_ack() {
        let (mut session, mut server) = scripted_session();
        let task = tokio::spawn(async move {
            session.run_command(&Command::Rcd("/tmp".into())).await
        });

        assert_eq!(read_line_from(&mut server).await, "C/tmp");
        server.write_all(b"A\n").await.unwrap();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn rcd_surfaces_server_error() {
        let (mut session, mut server) = scripted_session();
        let task = tokio::spawn(async move {
            session.run_command(&Command::Rcd("/nope".into())).await
        });

        assert_eq!(read_line_from(&mut server).await, "C/nope");
        server
            .write_all(b"ENo such file or directory\n")
            .await
            .unwrap();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, Outcome::Failure);
    }

    #[tokio::test]
    async fn exit_sends_quit_and_reports_quit() {
        let (mut session, mut server) = scripted_session();
        let task = tokio::spawn(async move { session.run_command(&Command::Exit).await });

        assert_eq!(read_line_from(&mut server).await, "Q");
        server.write_all(b"A\n").await.unwrap();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, Outcome::Quit);
    }

    #[tokio::test]
    async fn response_eof_is_fatal() {
        let (mut session, server) = scripted_session();
        let task = tokio::spawn(async move { session.run_command(&Command::Exit).await });
        drop(server);
        let result = task.await.unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn handshake_ack_without_port_is_fatal() {
        let (mut session, mut server) = scripted_session();
        let task = tokio::spawn(async move { session.run_command(&Command::Rls).await });

        assert_eq!(read_line_from(&mut server).await, "D");
        server.write_all(b"A\n").await.unwrap();

        let result = task.await.unwrap();
        let err = format!("{:#}", result.unwrap_err());
        assertables::assert_contains!(err, "port");
    }

    #[tokio::test]
    async fn handshake_refusal_fails_the_command_only() {
        let (mut session, mut server) = scripted_session();
        let task = tokio::spawn(async move { session.run_command(&Command::Rls).await });

        assert_eq!(read_line_from(&mut server).await, "D");
        server
            .write_all(b"EFailed to create data socket\n")
            .await
            .unwrap();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, Outcome::Failure);
    }

    #[tokio::test]
    async fn put_refuses_missing_local_file_without_traffic() {
        let (mut session, mut server) = scripted_session();
        let outcome = session
            .run_command(&Command::Put("definitely-no-such-file".into()))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failure);

        // Nothing may have been written to the control connection.
        drop(session);
        let mut leftover = Vec::new();
        let _ = server.read_to_end(&mut leftover).await.unwrap();
        assert!(leftover.is_empty(), "unexpected traffic: {leftover:?}");
    }

    #[tokio::test]
    async fn put_refuses_directory_without_traffic() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut server) = scripted_session();
        let outcome = session
            .run_command(&Command::Put(dir.path().to_str().unwrap().into()))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failure);

        drop(session);
        let mut leftover = Vec::new();
        let _ = server.read_to_end(&mut leftover).await.unwrap();
        assert!(leftover.is_empty(), "unexpected traffic: {leftover:?}");
    }
}
