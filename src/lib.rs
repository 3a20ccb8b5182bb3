//! vxagent - forwarding-plane endpoint agent
//!
//! Derives the startup dataplane configuration for a VXLAN tunnel endpoint
//! from host network state, and provides chain elements that run downstream
//! chain operations inside another network namespace.

pub mod chain;
pub mod config;
pub mod dataplane;
pub mod endpoint;
pub mod error;
pub mod host;
pub mod netns;
pub mod telemetry;

pub use error::{Error, Result};
