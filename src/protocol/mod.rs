//! mftp protocol definitions and helper types
// (c) 2025 the mftp developers
//!
//! The protocol runs over two kinds of TCP connection:
//!
//! * a persistent, line-oriented **control connection**, carrying one
//!   [`ControlMessage`] per line from client to server and one [`Response`]
//!   per line back, and
//! * short-lived **data connections**, one per bulk transfer (a directory
//!   listing or a file body), established on demand.
//!
//! # Wire encoding
//!
//! Every control line is ASCII text terminated by `\n`: a single code
//! character followed immediately by the argument, if the message carries
//! one. Responses are `A` (acknowledgement, optionally carrying the decimal
//! data port when answering [`ControlMessage::OpenData`]) or `E` followed by
//! a one-line human-readable reason. Lines are bounded by
//! [`MAX_LINE`](crate::config::MAX_LINE); an over-length line is a protocol
//! error.
//!
//! # Data-channel handshake
//!
//! * C ➡ S : `D`
//! * S ➡ C : `A<port>`: the server has bound an ephemeral listener.
//!   On failure it answers `E<reason>` instead and no data connection exists.
//! * The client connects to the server host on that port; the server accepts
//!   exactly one peer and closes the listener.
//!
//! Immediately afterwards the client sends the data-bearing command (`L`,
//! `G`, `S` or `P`) on the control connection and the transfer proceeds on
//! the data socket.
//!
//! # Command sequences
//!
//! For the read-from-server commands (`L`, `G`, `S`) the server streams the
//! payload, closes the data socket, then sends the terminal `A`/`E` on the
//! control connection. `P` is the exception: the server acknowledges *after
//! opening the destination file* but *before* the payload flows, and sends
//! nothing further once the transfer completes.

use tokio::io::{AsyncRead, AsyncWrite};

mod command;
pub use command::{Command, ParseError};

mod wire;
pub use wire::{ControlMessage, ProtocolError, Response};
pub(crate) use wire::{read_message, read_response, write_message, write_response};

/// Marker trait for streams usable as a session's control connection.
///
/// Real sessions run over [`tokio::net::TcpStream`]; tests substitute
/// in-memory pipes.
pub trait ControlStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> ControlStream for T {}
