use crate::file_reader;
use crate::CompilerOptions;
use crate::ConfigurationError;
use crate::ExtensionRegistry;
use crate::FilePathPackageName;
use crate::ManifestFormat;
use crate::PluginHost;
use crate::ProcessExtensionSpec;
use crate::RegistrationError;
use crate::RegistrationSet;
use crate::CONTRACT_NAME;
use crate::REGISTRATIONS_DIR;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, ConfigLoadError>;

/// The default name of the configuration file in a project directory.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "graphql-codegen.toml";

/// How generated artifacts are assigned to packages when no extension
/// provides a layout.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum PackageNameStrategy {
    /// Everything goes into `package_name`.
    #[default]
    Flat,

    /// `package_name` plus the document's directory relative to
    /// `operations_root`. Counts as a custom package name generator.
    FilePath,
}

/// A project's code-generation configuration, as read from
/// [`DEFAULT_CONFIG_FILE_NAME`]:
///
/// ```toml
/// package_name = "com.example.graphql"
/// manifest_format = "persisted-query-manifest"
/// extensions = ["registry"]
///
/// [process_extensions.registry]
/// command = "node"
/// args = ["scripts/register-operations.js"]
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CodegenConfig {
    /// Implementations to register for the compiler extension contract, in
    /// addition to whatever registration files declare.
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub manifest_format: ManifestFormat,

    #[serde(default)]
    pub operations_root: Option<PathBuf>,

    pub package_name: String,

    #[serde(default)]
    pub package_name_strategy: PackageNameStrategy,

    #[serde(default)]
    pub process_extensions: BTreeMap<String, ProcessExtensionSpec>,

    /// Defaults to [`REGISTRATIONS_DIR`].
    #[serde(default)]
    pub registrations_dir: Option<PathBuf>,
}

impl CodegenConfig {
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let content = file_reader::read_content(file_path)
            .map_err(ConfigLoadError::Read)?;
        log::debug!("Loading codegen config from {file_path:#?}.");
        Self::from_str(content.as_str())
    }

    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(ConfigLoadError::Parse)
    }

    /// Build the compiler options and plugin host this configuration
    /// describes. Relative paths are resolved against `project_dir`.
    ///
    /// `registry` holds the in-process extension implementations the caller
    /// knows about; the configured process extensions are added to it.
    pub fn into_compiler_parts(
        self,
        project_dir: impl AsRef<Path>,
        mut registry: ExtensionRegistry,
    ) -> Result<(CompilerOptions, PluginHost)> {
        let project_dir = project_dir.as_ref();

        for (implementation, mut spec) in self.process_extensions {
            spec.working_dir = Some(match spec.working_dir {
                Some(dir) => project_dir.join(dir),
                None => project_dir.to_path_buf(),
            });
            registry.register_process(implementation, spec)?;
        }

        let mut registrations = RegistrationSet::new();
        let registrations_dir = project_dir.join(
            self.registrations_dir.unwrap_or_else(|| PathBuf::from(REGISTRATIONS_DIR)),
        );
        registrations.load_dir(&registrations_dir)?;
        for implementation in self.extensions {
            registrations.register(CONTRACT_NAME, implementation);
        }

        let mut options_builder =
            CompilerOptions::builder(self.package_name.as_str())
                .manifest_format(self.manifest_format);
        if self.package_name_strategy == PackageNameStrategy::FilePath {
            let root_dir = match self.operations_root {
                Some(root) => project_dir.join(root),
                None => project_dir.to_path_buf(),
            };
            // Documents are usually loaded from canonical paths.
            let root_dir = std::fs::canonicalize(&root_dir).unwrap_or(root_dir);
            options_builder = options_builder.package_name_generator(Box::new(
                FilePathPackageName {
                    root_dir,
                    root_package: self.package_name,
                },
            ));
        }

        Ok((options_builder.build(), PluginHost::new(registry, registrations)))
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to parse codegen config: {0}")]
    Parse(toml::de::Error),

    #[error("Failed to read codegen config: {0}")]
    Read(file_reader::ReadContentError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
