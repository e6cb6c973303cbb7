use crate::BuildConstants;
use crate::BuildConstantsError;

#[test]
fn empty_constants_render_only_the_header() {
    assert_eq!(
        BuildConstants::new().render(),
        "// @generated by graphql-codegen. Do not edit.\n",
    );
}

#[test]
fn constants_render_in_insertion_order() {
    let mut constants = BuildConstants::new();
    constants.add("REGISTRY_URL", "https://registry.example.com").unwrap()
        .add("API_KEY_ENV", "REGISTRY_KEY").unwrap();

    assert_eq!(constants.render(), concat!(
        "// @generated by graphql-codegen. Do not edit.\n",
        "\n",
        "pub const REGISTRY_URL: &str = \"https://registry.example.com\";\n",
        "pub const API_KEY_ENV: &str = \"REGISTRY_KEY\";\n",
    ));
    assert_eq!(constants.len(), 2);
}

#[test]
fn values_are_escaped() {
    let mut constants = BuildConstants::new();
    constants.add("QUOTED", "say \"hi\"\n").unwrap();
    assert!(constants.render().contains(r#"pub const QUOTED: &str = "say \"hi\"\n";"#));
}

#[test]
fn names_must_be_screaming_snake_case() {
    let mut constants = BuildConstants::new();
    for name in ["", "lower", "Mixed", "1LEADING_DIGIT", "HAS-DASH", "_"] {
        assert!(
            matches!(constants.add(name, "x"), Err(BuildConstantsError::InvalidName(_))),
            "expected `{name}` to be rejected",
        );
    }
    assert!(constants.add("_PRIVATE", "x").is_ok());
    assert!(constants.add("V2_ENDPOINT", "x").is_ok());
}

#[test]
fn duplicate_names_are_rejected() {
    let mut constants = BuildConstants::new();
    constants.add("NAME", "a").unwrap();
    assert!(matches!(
        constants.add("NAME", "b"),
        Err(BuildConstantsError::DuplicateName(name)) if name == "NAME",
    ));
}

#[test]
fn assignments_split_on_the_first_equals_sign() {
    let mut constants = BuildConstants::new();
    constants.add_assignment("QUERY=a=b").unwrap();
    assert!(constants.render().contains(r#"pub const QUERY: &str = "a=b";"#));

    assert!(matches!(
        constants.add_assignment("NO_VALUE"),
        Err(BuildConstantsError::InvalidAssignment(_)),
    ));
}

#[test]
fn write_to_writes_the_rendered_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("constants.rs");
    let mut constants = BuildConstants::new();
    constants.add("NAME", "value").unwrap();

    constants.write_to(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), constants.render());
}
