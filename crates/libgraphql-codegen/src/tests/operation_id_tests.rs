use crate::validate_operation_ids;
use crate::OperationId;
use crate::OperationIdValidationError;
use crate::tests::test_utils::query_descriptors;

#[test]
fn empty_batches_are_well_formed() {
    assert_eq!(validate_operation_ids(&[], &[]), Ok(()));
}

#[test]
fn positionally_matching_ids_are_well_formed() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let ids = vec![OperationId::new("id1", "opA"), OperationId::new("id2", "opB")];
    assert_eq!(validate_operation_ids(&descriptors, &ids), Ok(()));
}

#[test]
fn short_id_lists_are_rejected() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let ids = vec![OperationId::new("id1", "opA")];
    assert_eq!(
        validate_operation_ids(&descriptors, &ids),
        Err(OperationIdValidationError::CardinalityMismatch {
            expected: 2,
            actual: 1,
        }),
    );
}

#[test]
fn long_id_lists_are_rejected() {
    let descriptors = query_descriptors(&["opA"]);
    let ids = vec![OperationId::new("id1", "opA"), OperationId::new("id2", "opB")];
    assert!(matches!(
        validate_operation_ids(&descriptors, &ids),
        Err(OperationIdValidationError::CardinalityMismatch { expected: 1, actual: 2 }),
    ));
}

#[test]
fn empty_identifiers_are_rejected() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let ids = vec![OperationId::new("id1", "opA"), OperationId::new("  ", "opB")];
    assert_eq!(
        validate_operation_ids(&descriptors, &ids),
        Err(OperationIdValidationError::EmptyIdentifier {
            name: "opB".to_string(),
            position: 1,
        }),
    );
}

#[test]
fn duplicate_identifiers_are_rejected() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let ids = vec![OperationId::new("same", "opA"), OperationId::new("same", "opB")];
    assert_eq!(
        validate_operation_ids(&descriptors, &ids),
        Err(OperationIdValidationError::DuplicateIdentifier {
            first_name: "opA".to_string(),
            id: "same".to_string(),
            second_name: "opB".to_string(),
        }),
    );
}

#[test]
fn reordered_ids_are_rejected() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let ids = vec![OperationId::new("id2", "opB"), OperationId::new("id1", "opA")];
    assert_eq!(
        validate_operation_ids(&descriptors, &ids),
        Err(OperationIdValidationError::NameMismatch {
            actual: "opB".to_string(),
            expected: "opA".to_string(),
            position: 0,
        }),
    );
}
