//! Common types, protocol definitions, and errors shared across `rinha-backend-2025` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
