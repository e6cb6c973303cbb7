use thiserror::Error;

/// Ambiguous or conflicting compiler configuration. Always detected before
/// any operation is processed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error(
        "Multiple implementations are registered for `{contract_name}`: {}. \
        At most one compiler extension may be registered.",
        format_names(.implementations)
    )]
    AmbiguousExtensions {
        contract_name: String,
        implementations: Vec<String>,
    },

    #[error(
        "Custom generators cannot be combined: {}. Use either a custom \
        operation id generator or a custom operation output generator.",
        format_names(.options)
    )]
    ConflictingGenerators {
        options: Vec<&'static str>,
    },

    #[error(
        "Compiler extension `{extension}` cannot be combined with {}. Either \
        remove these options or move their logic into the extension.",
        format_names(.options)
    )]
    ConflictsWithExtension {
        extension: String,
        options: Vec<&'static str>,
    },

    #[error("An extension implementation named `{implementation}` is already registered")]
    DuplicateImplementation {
        implementation: String,
    },

    #[error("`package_name` must not be empty")]
    EmptyPackageName,
}

fn format_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter()
        .map(|name| format!("`{}`", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
