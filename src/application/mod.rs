// Application layer - billing operations built on the repository.
// Owns no state of its own beyond the write lock; every call re-reads the store.

pub mod analysis;
pub mod error;
pub mod service;

pub use analysis::*;
pub use error::*;
pub use service::*;
