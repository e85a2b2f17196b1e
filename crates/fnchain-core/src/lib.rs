//! fnchain-core library.
//!
//! Loads a backend config's function map, injects synthetic `"function"`
//! dependency edges until a target share of functions sit in a dependency
//! chain, and validates that the result is acyclic.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module, each mapping to a stable
//!   [`error::ErrorCode`]; `anyhow::Result` only for the project config loader.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod percent;
pub mod store;
pub mod synth;
pub mod templates;
