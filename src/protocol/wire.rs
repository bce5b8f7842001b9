//! Control-connection framing: messages, responses, line codecs
// (c) 2025 the mftp developers

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::config::MAX_LINE;
use crate::util::io::{read_line, write_line};

/// A message sent from client to server on the control connection.
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum ControlMessage {
    /// `D`: request a fresh data connection.
    OpenData,
    /// `C<path>`: change the server session's working directory.
    Chdir(String),
    /// `L`: send a directory listing over the data connection.
    List,
    /// `G<path>`: send the file at `path` over the data connection.
    Get(String),
    /// `S<path>`: same transfer as `Get`; the client pages it instead of
    /// saving it.
    Show(String),
    /// `P<path>`: receive a file over the data connection into the server
    /// session's working directory.
    Put(String),
    /// `Q`: end the session.
    Quit,
}

/// A response sent from server to client on the control connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `A`: the command succeeded.
    Ack,
    /// `A<port>`: the server is listening for a data connection on `port`.
    /// Only ever sent in reply to [`ControlMessage::OpenData`].
    AckPort(u16),
    /// `E<reason>`: the command failed; `reason` is shown to the user.
    Error(String),
}

/// Errors arising from the wire protocol itself, as distinct from the
/// operations the protocol carries.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unexpected EOF on control connection")]
    UnexpectedEof,
    #[error("empty control line")]
    EmptyLine,
    #[error("unrecognized message code {0:?}")]
    UnknownCode(char),
    #[error("missing argument for {0:?} command")]
    MissingArgument(char),
    #[error("unexpected argument for {0:?} command")]
    UnexpectedArgument(char),
    #[error("expected a port number from server")]
    MissingPort,
    #[error("malformed port number {0:?}")]
    BadPort(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ControlMessage {
    /// The single-character wire code for this message.
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            ControlMessage::OpenData => 'D',
            ControlMessage::Chdir(_) => 'C',
            ControlMessage::List => 'L',
            ControlMessage::Get(_) => 'G',
            ControlMessage::Show(_) => 'S',
            ControlMessage::Put(_) => 'P',
            ControlMessage::Quit => 'Q',
        }
    }

    /// The message argument, if it carries one.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        match self {
            ControlMessage::OpenData | ControlMessage::List | ControlMessage::Quit => None,
            ControlMessage::Chdir(arg)
            | ControlMessage::Get(arg)
            | ControlMessage::Show(arg)
            | ControlMessage::Put(arg) => Some(arg),
        }
    }

    /// Renders the message as one wire line, newline included.
    #[must_use]
    pub fn encode(&self) -> String {
        match self.argument() {
            Some(arg) => format!("{}{}\n", self.code(), arg),
            None => format!("{}\n", self.code()),
        }
    }

    /// Parses one control line (without its newline).
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        let mut chars = line.chars();
        let code = chars.next().ok_or(ProtocolError::EmptyLine)?;
        let arg = chars.as_str();

        let with_arg = |build: fn(String) -> ControlMessage| {
            if arg.is_empty() {
                Err(ProtocolError::MissingArgument(code))
            } else {
                Ok(build(arg.to_string()))
            }
        };
        let no_arg = |msg: ControlMessage| {
            if arg.is_empty() {
                Ok(msg)
            } else {
                Err(ProtocolError::UnexpectedArgument(code))
            }
        };

        match code {
            'D' => no_arg(ControlMessage::OpenData),
            'C' => with_arg(ControlMessage::Chdir),
            'L' => no_arg(ControlMessage::List),
            'G' => with_arg(ControlMessage::Get),
            'S' => with_arg(ControlMessage::Show),
            'P' => with_arg(ControlMessage::Put),
            'Q' => no_arg(ControlMessage::Quit),
            other => Err(ProtocolError::UnknownCode(other)),
        }
    }
}

impl Response {
    /// Renders the response as one wire line, newline included.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Response::Ack => "A\n".to_string(),
            Response::AckPort(port) => format!("A{port}\n"),
            Response::Error(reason) => format!("E{reason}\n"),
        }
    }

    /// Parses one response line (without its newline).
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        let mut chars = line.chars();
        let code = chars.next().ok_or(ProtocolError::EmptyLine)?;
        let payload = chars.as_str();

        match code {
            'A' if payload.is_empty() => Ok(Response::Ack),
            'A' => payload
                .parse()
                .map(Response::AckPort)
                .map_err(|_| ProtocolError::BadPort(payload.to_string())),
            'E' => Ok(Response::Error(payload.to_string())),
            other => Err(ProtocolError::UnknownCode(other)),
        }
    }
}

/// Reads one control message. `Ok(None)` means the peer closed the
/// connection before sending anything.
pub(crate) async fn read_message<R>(
    reader: &mut R,
) -> Result<Option<ControlMessage>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let Some(line) = read_line(reader, MAX_LINE).await? else {
        return Ok(None);
    };
    let msg = ControlMessage::decode(&line)?;
    debug!("received command: {line:?}");
    Ok(Some(msg))
}

/// Writes one control message as a single line.
pub(crate) async fn write_message<W>(
    writer: &mut W,
    msg: &ControlMessage,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let encoded = msg.encode();
    write_line(writer, &encoded).await?;
    debug!("sent command: {:?}", encoded.trim_end());
    Ok(())
}

/// Reads one response. `Ok(None)` means the peer closed the connection; the
/// caller decides whether that is tolerable.
pub(crate) async fn read_response<R>(reader: &mut R) -> Result<Option<Response>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let Some(line) = read_line(reader, MAX_LINE).await? else {
        debug!("received response: EOF");
        return Ok(None);
    };
    let rsp = Response::decode(&line)?;
    debug!("received response: {line:?}");
    Ok(Some(rsp))
}

/// Writes one response as a single line.
pub(crate) async fn write_response<W>(writer: &mut W, rsp: &Response) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let encoded = rsp.encode();
    write_line(writer, &encoded).await?;
    debug!("sent response: {:?}", encoded.trim_end());
    Ok(())
}
