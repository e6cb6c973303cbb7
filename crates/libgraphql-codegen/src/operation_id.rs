use crate::OperationDescriptor;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// The persisted-query id assigned to one operation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct OperationId {
    pub id: String,
    pub name: String,
}
impl OperationId {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Check that `ids` is a well-formed answer for `descriptors`.
///
/// `ids[i]` must belong to `descriptors[i]`: ids are never reordered, so an
/// entry naming a different operation than the descriptor at the same
/// position is rejected. Identifiers must be non-empty and unique within the
/// batch.
pub fn validate_operation_ids(
    descriptors: &[OperationDescriptor],
    ids: &[OperationId],
) -> Result<(), OperationIdValidationError> {
    if descriptors.len() != ids.len() {
        return Err(OperationIdValidationError::CardinalityMismatch {
            expected: descriptors.len(),
            actual: ids.len(),
        });
    }

    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(ids.len());
    for (position, (descriptor, op_id)) in descriptors.iter().zip(ids).enumerate() {
        if op_id.name != descriptor.name() {
            return Err(OperationIdValidationError::NameMismatch {
                actual: op_id.name.to_owned(),
                expected: descriptor.name().to_string(),
                position,
            });
        }

        if op_id.id.trim().is_empty() {
            return Err(OperationIdValidationError::EmptyIdentifier {
                name: op_id.name.to_owned(),
                position,
            });
        }

        if let Some(first_name) = seen.insert(op_id.id.as_str(), op_id.name.as_str()) {
            return Err(OperationIdValidationError::DuplicateIdentifier {
                first_name: first_name.to_string(),
                id: op_id.id.to_owned(),
                second_name: op_id.name.to_owned(),
            });
        }
    }

    Ok(())
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OperationIdValidationError {
    #[error("Expected {expected} operation ids, got {actual}")]
    CardinalityMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("Operations '{first_name}' and '{second_name}' were both assigned the id `{id}`")]
    DuplicateIdentifier {
        first_name: String,
        id: String,
        second_name: String,
    },

    #[error("Operation '{name}' (position {position}) was assigned an empty id")]
    EmptyIdentifier {
        name: String,
        position: usize,
    },

    #[error("No operation id was assigned to operation '{name}'")]
    MissingOperation {
        name: String,
    },

    #[error(
        "Operation id at position {position} names '{actual}', but the \
        operation at that position is '{expected}'"
    )]
    NameMismatch {
        actual: String,
        expected: String,
        position: usize,
    },
}
