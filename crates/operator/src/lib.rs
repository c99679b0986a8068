//! Monitor operator process components
//!
//! The binary wires these together; they live in a library target so the
//! HTTP API can be exercised from integration tests.

pub mod api;
pub mod config;
