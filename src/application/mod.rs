//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic; it does no I/O of its own.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, SaveError};
