//! Per-request middleware.
//!
//! The server runs every request through [`trace`], [`timeout`] and
//! [`recover`] before it reaches the router:
//!
//! ```text
//! trace ─▶ timeout ─▶ recover ─▶ Router::handle ─▶ handler
//! ```

mod recover;
mod timeout;
mod trace;

pub(crate) use recover::recover;
pub(crate) use timeout::timeout;
pub(crate) use trace::trace;
