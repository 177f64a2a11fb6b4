//! Infrastructure layer: I/O implementations
//!
//! Loads tree definitions from disk and persists session state.

pub mod error;
pub mod loader;
pub mod storage;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use loader::TreeLoader;
pub use storage::JsonFileSaveHandler;
