use crate::commands::ExtensionsCmd;
use crate::CommandResult;
use std::process::ExitCode;

fn describe_config(content: &str) -> CommandResult {
    let project = tempfile::tempdir().unwrap();
    let config = project.path().join(libgraphql_codegen::DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(&config, content).unwrap();
    ExtensionsCmd { config }.describe()
}

#[test]
fn projects_without_extensions_use_built_in_generators() {
    let result = describe_config("package_name = \"com.example\"\n");

    assert_eq!(result.exit_code, ExitCode::SUCCESS);
    let stdout = result.stdout.unwrap();
    assert!(stdout.starts_with(
        "Known implementations:\n  (none)\nRegistrations:\n  (none)\n",
    ));
    assert!(stdout.contains("the built-in generators will be used"));
}

#[test]
fn unknown_implementations_are_reported_as_errors() {
    let result = describe_config(r#"
        package_name = "com.example"
        extensions = ["missing"]
    "#);

    assert_eq!(result.exit_code, ExitCode::FAILURE);
    assert!(result.stdout.is_none());
    let stderr = result.stderr.unwrap();
    assert!(stderr.contains("Registrations:\n  * "));
    assert!(stderr.contains(": missing\n"));
    assert!(stderr.contains(
        "`missing` is registered for `libgraphql_codegen.CompilerExtension`, \
        but no such implementation is known (known implementations: none)",
    ));
}

#[test]
fn implementations_that_fail_to_start_are_reported_as_errors() {
    let result = describe_config(r#"
        package_name = "com.example"
        extensions = ["registry"]

        [process_extensions.registry]
        command = "/nonexistent/graphql-codegen-extension"
    "#);

    assert_eq!(result.exit_code, ExitCode::FAILURE);
    let stderr = result.stderr.unwrap();
    assert!(stderr.contains("Known implementations:\n  * registry\n"));
    assert!(stderr.contains(
        "Failed to instantiate extension implementation `registry`",
    ));
}
