//! Builder API for ergonomic definition construction.
//!
//! Definitions are usually loaded from JSON, but tests and small embedded
//! machines are easier to write in code.

pub mod definition;
pub mod error;

pub use definition::DefinitionBuilder;
pub use error::BuildError;
