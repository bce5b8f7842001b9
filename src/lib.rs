// (c) 2025 the mftp developers

//! mftp is a minimal file-transfer utility in the classic two-channel mould:
//! an interactive client and a concurrent server converse over a persistent
//! line-oriented **control connection**, and open a short-lived **data
//! connection** per bulk transfer (directory listings and file bodies).
//!
//! ## Overview
//! - The client ([`mftp`](crate::cli::client)) reads shell-like command
//!   lines: `cd`, `rcd`, `ls`, `rls`, `get`, `show`, `put`, `exit`. Local
//!   commands never touch the wire; remote ones send a one-line control
//!   message and read a one-line response; transfer commands additionally
//!   negotiate a data connection.
//! - The server ([`mftpserve`](crate::cli::server)) accepts any number of
//!   clients, each served by its own task with a private working directory
//!   and at most one data connection at a time.
//!
//! The wire format and the handshake that establishes a data connection are
//! documented in the [protocol] module.
//!
//! ## What mftp is not
//!
//! There is no authentication, no encryption, and no transfer resumption;
//! destinations are never overwritten (transfers fail instead). Use it where
//! you would use any other plain-text protocol: behind a trust boundary.

pub mod cli;
pub mod client;
pub mod config;
pub mod protocol;
pub mod server;
pub(crate) mod util;
