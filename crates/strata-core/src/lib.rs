//! Core types shared by the Strata structure-compliance engine:
//! errors, layered configuration, tracing setup, constants, and cancellation.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
