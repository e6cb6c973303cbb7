use crate::CodegenConfig;
use crate::Compiler;
use crate::ConfigLoadError;
use crate::ConfigurationError;
use crate::ExtensionRegistry;
use crate::ManifestFormat;
use crate::PackageNameStrategy;
use crate::ProcessExtensionSpec;
use crate::SourceDocument;
use crate::CONTRACT_NAME;
use crate::REGISTRATIONS_DIR;
use std::path::PathBuf;

#[test]
fn minimal_config_uses_defaults() {
    let config = CodegenConfig::from_str(r#"package_name = "com.example""#).unwrap();
    assert_eq!(config.package_name, "com.example");
    assert_eq!(config.manifest_format, ManifestFormat::PersistedQueryManifest);
    assert_eq!(config.package_name_strategy, PackageNameStrategy::Flat);
    assert!(config.extensions.is_empty());
    assert!(config.process_extensions.is_empty());
    assert_eq!(config.registrations_dir, None);
}

#[test]
fn full_config_parses() {
    let config = CodegenConfig::from_str(r#"
        package_name = "com.example"
        manifest_format = "operation-output"
        package_name_strategy = "file-path"
        operations_root = "graphql"
        registrations_dir = "meta/extensions"
        extensions = ["registry"]

        [process_extensions.registry]
        command = "node"
        args = ["register.js", "--dry-run"]
    "#).unwrap();

    assert_eq!(config.manifest_format, ManifestFormat::OperationOutput);
    assert_eq!(config.package_name_strategy, PackageNameStrategy::FilePath);
    assert_eq!(config.operations_root, Some(PathBuf::from("graphql")));
    assert_eq!(config.registrations_dir, Some(PathBuf::from("meta/extensions")));
    assert_eq!(config.extensions, vec!["registry".to_string()]);
    assert_eq!(
        config.process_extensions["registry"],
        ProcessExtensionSpec::new("node").arg("register.js").arg("--dry-run"),
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let err = CodegenConfig::from_str(r#"
        package_name = "com.example"
        operation_id_strategy = "md5"
    "#).unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse(_)));
}

#[test]
fn package_name_is_required() {
    assert!(matches!(
        CodegenConfig::from_str(r#"manifest_format = "operation-output""#),
        Err(ConfigLoadError::Parse(_)),
    ));
}

#[test]
fn configured_extensions_are_registered_for_the_contract() {
    let project = tempfile::tempdir().unwrap();
    let config = CodegenConfig::from_str(r#"
        package_name = "com.example"
        extensions = ["registry"]

        [process_extensions.registry]
        command = "registry-extension"
    "#).unwrap();

    let (options, host) =
        config.into_compiler_parts(project.path(), ExtensionRegistry::new()).unwrap();

    assert_eq!(options.package_name(), "com.example");
    assert!(options.custom_generators().is_empty());
    assert!(host.registry().contains("registry"));
    assert_eq!(host.registered_implementation(CONTRACT_NAME), Ok(Some("registry")));
}

#[test]
fn registration_files_in_the_project_are_loaded() {
    let project = tempfile::tempdir().unwrap();
    let registrations_dir = project.path().join(REGISTRATIONS_DIR);
    std::fs::create_dir(&registrations_dir).unwrap();
    std::fs::write(registrations_dir.join(CONTRACT_NAME), "from-file\n").unwrap();

    let config = CodegenConfig::from_str(r#"package_name = "com.example""#).unwrap();
    let (_, host) =
        config.into_compiler_parts(project.path(), ExtensionRegistry::new()).unwrap();

    assert_eq!(host.registered_implementation(CONTRACT_NAME), Ok(Some("from-file")));
}

#[test]
fn file_path_strategy_installs_a_package_name_generator() {
    let project = tempfile::tempdir().unwrap();
    let config = CodegenConfig::from_str(r#"
        package_name = "com.example"
        package_name_strategy = "file-path"
    "#).unwrap();

    let (options, _) =
        config.into_compiler_parts(project.path(), ExtensionRegistry::new()).unwrap();
    assert_eq!(options.custom_generators(), vec!["package_name_generator"]);
}

#[test]
fn process_extensions_cannot_shadow_registered_implementations() {
    let project = tempfile::tempdir().unwrap();
    let mut registry = ExtensionRegistry::new();
    registry.register("registry", || Err("unused".into())).unwrap();

    let config = CodegenConfig::from_str(r#"
        package_name = "com.example"

        [process_extensions.registry]
        command = "registry-extension"
    "#).unwrap();

    assert!(matches!(
        config.into_compiler_parts(project.path(), registry),
        Err(ConfigLoadError::Configuration(
            ConfigurationError::DuplicateImplementation { .. },
        )),
    ));
}

#[test]
fn config_files_are_read_from_disk() {
    let project = tempfile::tempdir().unwrap();
    let path = project.path().join(crate::DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(&path, "package_name = \"com.example\"\n").unwrap();

    let config = CodegenConfig::from_file(&path).unwrap();
    assert_eq!(config.package_name, "com.example");

    assert!(matches!(
        CodegenConfig::from_file(project.path().join("missing.toml")),
        Err(ConfigLoadError::Read(_)),
    ));
}

#[test]
fn file_path_packages_resolve_against_canonical_document_paths() {
    let project = tempfile::tempdir().unwrap();
    let users_dir = project.path().join("graphql").join("users");
    std::fs::create_dir_all(&users_dir).unwrap();
    std::fs::create_dir(project.path().join("config")).unwrap();
    let doc_path = users_dir.join("get_user.graphql");
    std::fs::write(&doc_path, "query GetUser { user { id } }").unwrap();

    let config = CodegenConfig::from_str(r#"
        package_name = "com.example"
        package_name_strategy = "file-path"
        operations_root = "graphql"
    "#).unwrap();

    // Not the canonical spelling of the project dir, as with `--config ./x.toml`.
    let project_dir = project.path().join("config").join("..");
    let (options, host) =
        config.into_compiler_parts(&project_dir, ExtensionRegistry::new()).unwrap();

    let document =
        SourceDocument::from_file(std::fs::canonicalize(&doc_path).unwrap()).unwrap();
    let output = Compiler::new(options, host).compile(&[document]).unwrap();
    assert_eq!(output.layouts["GetUser"].package_name, "com.example.users");
}
