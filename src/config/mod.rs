//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, TimeoutsConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Framing and queue limits (LimitsConfig)
//! - [`policy`]: Routing and login policy switches (PolicyConfig)
//! - [`validation`]: Startup sanity checks

mod limits;
mod listen;
mod policy;
mod types;
mod validation;

pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use policy::PolicyConfig;
pub use types::{Config, ConfigError, ServerConfig, TimeoutsConfig};
pub use validation::{ValidationError, validate};
