//! Email transmission for ready-to-send digests.
//!
//! [`EmailClient`] wraps the transactional email HTTP API; [`run_dispatch`]
//! is the dispatch stage: scan digests marked `ready_to_send`, transmit
//! each, and record the sent/failed transition.

mod client;
mod dispatch;
mod error;

pub use client::EmailClient;
pub use dispatch::{run_dispatch, DispatchSummary};
pub use error::MailError;
