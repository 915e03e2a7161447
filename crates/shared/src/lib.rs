pub mod client_config;
pub mod config;
pub mod tracing;

pub use client_config::*;
pub use config::*;
pub use tracing::*;
