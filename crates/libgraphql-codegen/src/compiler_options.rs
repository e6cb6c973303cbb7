use crate::ConfigurationError;
use crate::ManifestFormat;
use crate::OperationIdGenerator;
use crate::OperationOutputGenerator;
use crate::PackageNameGenerator;
use crate::CONTRACT_NAME;

/// Everything about a compilation that is decided before any operation is
/// loaded.
///
/// Built with [`CompilerOptionsBuilder`].
pub struct CompilerOptions {
    pub(crate) extension_contract: String,
    pub(crate) manifest_format: ManifestFormat,
    pub(crate) operation_id_generator: Option<Box<dyn OperationIdGenerator>>,
    pub(crate) operation_output_generator: Option<Box<dyn OperationOutputGenerator>>,
    pub(crate) package_name: String,
    pub(crate) package_name_generator: Option<Box<dyn PackageNameGenerator>>,
}

impl CompilerOptions {
    pub fn builder(package_name: impl Into<String>) -> CompilerOptionsBuilder {
        CompilerOptionsBuilder::new(package_name)
    }

    pub fn extension_contract(&self) -> &str {
        self.extension_contract.as_str()
    }

    pub fn manifest_format(&self) -> ManifestFormat {
        self.manifest_format
    }

    pub fn package_name(&self) -> &str {
        self.package_name.as_str()
    }

    /// The custom generators configured in these options, by option name.
    pub fn custom_generators(&self) -> Vec<&'static str> {
        let mut options = vec![];
        if self.package_name_generator.is_some() {
            options.push("package_name_generator");
        }
        if self.operation_id_generator.is_some() {
            options.push("operation_id_generator");
        }
        if self.operation_output_generator.is_some() {
            options.push("operation_output_generator");
        }
        options
    }

    /// Check these options for conflicts, given the name of the extension
    /// implementation registered for this compilation (if any).
    ///
    /// A compiler extension replaces the compiler's generators wholesale, so
    /// it cannot be combined with any custom generator. A custom operation
    /// output generator already assigns ids, so it cannot be combined with a
    /// custom operation id generator either.
    pub fn validate(&self, extension: Option<&str>) -> Result<(), ConfigurationError> {
        if self.package_name.trim().is_empty() && self.package_name_generator.is_none() {
            return Err(ConfigurationError::EmptyPackageName);
        }

        let custom_generators = self.custom_generators();
        if let Some(extension) = extension
            && !custom_generators.is_empty() {
            return Err(ConfigurationError::ConflictsWithExtension {
                extension: extension.to_string(),
                options: custom_generators,
            });
        }

        if self.operation_id_generator.is_some() && self.operation_output_generator.is_some() {
            return Err(ConfigurationError::ConflictingGenerators {
                options: vec!["operation_id_generator", "operation_output_generator"],
            });
        }

        Ok(())
    }
}
impl std::fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("extension_contract", &self.extension_contract)
            .field("manifest_format", &self.manifest_format)
            .field("operation_id_generator", &self.operation_id_generator.as_ref().map(|g| g.name()))
            .field("operation_output_generator", &self.operation_output_generator.as_ref().map(|g| g.name()))
            .field("package_name", &self.package_name)
            .field("package_name_generator", &self.package_name_generator.as_ref().map(|g| g.name()))
            .finish()
    }
}

/// Builder for [`CompilerOptions`].
///
/// # Example
///
/// ```
/// use libgraphql_codegen::CompilerOptions;
/// use libgraphql_codegen::ManifestFormat;
///
/// let options = CompilerOptions::builder("com.example.graphql")
///     .manifest_format(ManifestFormat::OperationOutput)
///     .build();
/// assert!(options.validate(None).is_ok());
/// assert!(options.custom_generators().is_empty());
/// ```
pub struct CompilerOptionsBuilder {
    options: CompilerOptions,
}

impl CompilerOptionsBuilder {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            options: CompilerOptions {
                extension_contract: CONTRACT_NAME.to_string(),
                manifest_format: ManifestFormat::default(),
                operation_id_generator: None,
                operation_output_generator: None,
                package_name: package_name.into(),
                package_name_generator: None,
            },
        }
    }

    pub fn build(self) -> CompilerOptions {
        self.options
    }

    /// Look extensions up under a contract other than [`CONTRACT_NAME`].
    pub fn extension_contract(mut self, contract_name: impl Into<String>) -> Self {
        self.options.extension_contract = contract_name.into();
        self
    }

    pub fn manifest_format(mut self, format: ManifestFormat) -> Self {
        self.options.manifest_format = format;
        self
    }

    pub fn operation_id_generator(mut self, generator: Box<dyn OperationIdGenerator>) -> Self {
        self.options.operation_id_generator = Some(generator);
        self
    }

    pub fn operation_output_generator(
        mut self,
        generator: Box<dyn OperationOutputGenerator>,
    ) -> Self {
        self.options.operation_output_generator = Some(generator);
        self
    }

    pub fn package_name_generator(mut self, generator: Box<dyn PackageNameGenerator>) -> Self {
        self.options.package_name_generator = Some(generator);
        self
    }
}
