use crate::ManifestFormat;
use crate::OperationId;
use crate::OperationIdValidationError;
use crate::OperationOutput;
use crate::tests::test_utils::query_descriptors;

fn sample_output() -> OperationOutput {
    let descriptors = query_descriptors(&["opA", "opB"]);
    OperationOutput::from_ids(&descriptors, &[
        OperationId::new("id1", "opA"),
        OperationId::new("id2", "opB"),
    ]).unwrap()
}

#[test]
fn ids_map_to_their_operations_in_compilation_order() {
    let output = sample_output();
    let ids: Vec<&str> = output.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["id1", "id2"]);
    assert_eq!(output.get("id2").unwrap().name(), "opB");
    assert_eq!(output.id_for("opA"), Some("id1"));
    assert_eq!(output.id_for("opC"), None);
}

#[test]
fn persisted_query_manifest_lists_every_operation() {
    let json: serde_json::Value =
        serde_json::from_str(
            &sample_output().to_json(ManifestFormat::PersistedQueryManifest).unwrap(),
        ).unwrap();

    assert_eq!(json["format"], "apollo-persisted-query-manifest");
    assert_eq!(json["version"], 1);
    let operations = json["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0]["id"], "id1");
    assert_eq!(operations[0]["name"], "opA");
    assert_eq!(operations[0]["type"], "query");
    assert!(operations[0]["body"].as_str().unwrap().starts_with("query opA"));
}

#[test]
fn operation_output_format_is_keyed_by_id() {
    let json: serde_json::Value =
        serde_json::from_str(
            &sample_output().to_json(ManifestFormat::OperationOutput).unwrap(),
        ).unwrap();

    assert_eq!(json["id1"]["name"], "opA");
    assert_eq!(json["id2"]["name"], "opB");
    assert!(json["id2"]["source"].as_str().unwrap().starts_with("query opB"));
}

#[test]
fn manifest_formats_parse_from_their_names() {
    assert_eq!(
        "persisted-query-manifest".parse::<ManifestFormat>(),
        Ok(ManifestFormat::PersistedQueryManifest),
    );
    assert_eq!(
        "operation-output".parse::<ManifestFormat>(),
        Ok(ManifestFormat::OperationOutput),
    );
    assert!("yaml".parse::<ManifestFormat>().is_err());
}

#[test]
fn ids_for_follows_descriptor_order() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let mut output = OperationOutput::new();
    output.insert("id2", descriptors[1].clone());
    output.insert("id1", descriptors[0].clone());

    assert_eq!(output.ids_for(&descriptors).unwrap(), vec![
        OperationId::new("id1", "opA"),
        OperationId::new("id2", "opB"),
    ]);
}

#[test]
fn ids_for_rejects_missing_operations() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let others = query_descriptors(&["opA", "opC"]);
    let mut output = OperationOutput::new();
    output.insert("id1", others[0].clone());
    output.insert("id3", others[1].clone());

    assert_eq!(
        output.ids_for(&descriptors),
        Err(OperationIdValidationError::MissingOperation {
            name: "opB".to_string(),
        }),
    );
}

#[test]
fn ids_for_rejects_wrong_cardinality() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let mut output = OperationOutput::new();
    output.insert("id1", descriptors[0].clone());

    assert_eq!(
        output.ids_for(&descriptors),
        Err(OperationIdValidationError::CardinalityMismatch {
            expected: 2,
            actual: 1,
        }),
    );
}

#[test]
fn from_ids_rejects_duplicate_ids() {
    let descriptors = query_descriptors(&["opA", "opB"]);
    let err = OperationOutput::from_ids(&descriptors, &[
        OperationId::new("same", "opA"),
        OperationId::new("same", "opB"),
    ]).unwrap_err();
    assert!(matches!(err, OperationIdValidationError::DuplicateIdentifier { .. }));
}

#[test]
fn write_to_creates_missing_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated").join("manifest.json");

    sample_output().write_to(&path, ManifestFormat::PersistedQueryManifest).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"id1\""));
}
