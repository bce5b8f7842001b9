//! Client-side (interactive) event loop and session engine
// (c) 2025 the mftp developers

mod main_loop;
pub use main_loop::run;

mod session;
pub use session::{Outcome, Session};
