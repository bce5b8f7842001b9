//! Build-time configuration constants
// (c) 2025 the mftp developers

/// The well-known TCP port the server listens on for control connections.
pub const CONTROL_PORT: u16 = 49999;

/// Listen backlog for the control socket.
pub const LISTEN_BACKLOG: u32 = 4;

/// Upper bound on the length of a single control line (command or response),
/// excluding the terminating newline. Lines that reach this length without a
/// newline are a protocol error, not a truncation.
pub const MAX_LINE: usize = 8192;

/// The prompt printed by the interactive client.
pub const PROMPT: &str = "mftp$ ";
