//! Subcommand implementations

pub mod crd;
pub mod health;
pub mod monitors;
pub mod window;
