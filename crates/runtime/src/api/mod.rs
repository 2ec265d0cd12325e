//! Public API surface for runtime consumers.
//!
//! Re-exports the handle and error types so clients can depend on the
//! runtime without reaching into worker internals.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
