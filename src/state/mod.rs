//! State management module.
//!
//! Contains the Registry (shared membership state) and session identifiers.

mod registry;
mod session_id;

pub use registry::{Member, Outbox, Registry};
pub use session_id::{SessionId, SessionIdGenerator};
