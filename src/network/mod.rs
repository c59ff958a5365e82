//! Network layer: the TCP gateway and per-client sessions.

mod gateway;
mod session;

pub use gateway::Gateway;
pub use session::SessionSettings;
