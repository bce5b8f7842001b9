//! General utility code that didn't fit anywhere else
//!
//! Note that most of this module is not exported.
// (c) 2025 the mftp developers

pub(crate) mod fs;
pub(crate) mod io;
pub(crate) mod process;

mod tracing;
pub(crate) use tracing::setup as setup_tracing;
