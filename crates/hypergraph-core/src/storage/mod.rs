//! Storage abstraction
//!
//! [`GraphStore`] is the contract transports and the ingestion pipeline call;
//! backends map their own errors into [`StorageError`].

pub mod error;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use traits::GraphStore;
