//! Build errors for definition builders.

use crate::definition::DefinitionError;
use thiserror::Error;

/// Errors that can occur when building a machine definition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Machine definition is invalid: {}", describe(.errors))]
    Invalid { errors: Vec<DefinitionError> },
}

fn describe(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
