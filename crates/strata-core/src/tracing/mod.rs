//! Observability for Strata.
//! `tracing` crate with `EnvFilter`, per-subsystem log levels.

pub mod setup;

pub use setup::{env_filter, init_tracing, DEFAULT_DIRECTIVES};
