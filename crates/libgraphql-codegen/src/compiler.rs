use crate::CompilerOptions;
use crate::ConfigurationError;
use crate::DefaultLayout;
use crate::DiscoveryError;
use crate::DocumentLoadError;
use crate::DocumentLoader;
use crate::ExtensionExecutionError;
use crate::FlatPackageName;
use crate::HostError;
use crate::LayoutDecision;
use crate::LoadedExtension;
use crate::OperationDescriptor;
use crate::OperationId;
use crate::OperationIdGenerator;
use crate::OperationIdValidationError;
use crate::OperationOutput;
use crate::PackageNameGenerator;
use crate::PluginHost;
use crate::Sha256OperationIdGenerator;
use crate::SourceDocument;
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

type Result<T> = std::result::Result<T, CompileError>;

/// Everything one successful compilation produces.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilationOutput {
    /// The name of the compiler extension that took part, if any.
    pub extension: Option<String>,

    /// Layout decisions keyed by operation name, in compilation order.
    pub layouts: IndexMap<String, LayoutDecision>,

    pub operation_output: OperationOutput,
}

/// Runs one compilation: loads operations, assigns their persisted-query ids,
/// and decides the layout of their generated artifacts.
///
/// Compilation is all-or-nothing. Any configuration, discovery, document,
/// extension or generator error aborts the whole compilation and nothing is
/// produced; in particular a failing extension never causes ids to be
/// generated by the default generator instead.
///
/// # Example
///
/// ```
/// use libgraphql_codegen::Compiler;
/// use libgraphql_codegen::CompilerOptions;
/// use libgraphql_codegen::PluginHost;
/// use libgraphql_codegen::SourceDocument;
///
/// let compiler = Compiler::new(
///     CompilerOptions::builder("com.example").build(),
///     PluginHost::default(),
/// );
/// let output = compiler.compile(&[
///     SourceDocument::from_str("query GetUser { user { id } }"),
/// ]).unwrap();
///
/// assert_eq!(output.operation_output.len(), 1);
/// assert_eq!(output.layouts["GetUser"].class_name, "GetUserQuery");
/// ```
#[derive(Debug)]
pub struct Compiler {
    host: PluginHost,
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions, host: PluginHost) -> Self {
        Self {
            host,
            options,
        }
    }

    pub fn host(&self) -> &PluginHost {
        &self.host
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn compile(&self, documents: &[SourceDocument]) -> Result<CompilationOutput> {
        let extension = self.prepare()?;

        let mut errors = vec![];
        let mut loader = DocumentLoader::new();
        for document in documents {
            if let Err(err) = loader.add_source(document) {
                errors.push(err);
            }
        }
        if !errors.is_empty() {
            return Err(CompileError::Document(errors));
        }
        let descriptors = loader.build().map_err(CompileError::Document)?;

        self.generate(extension.as_ref(), &descriptors)
    }

    /// Compile operations that were already loaded.
    ///
    /// Operation names must be unique across `descriptors`.
    pub fn compile_descriptors(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<CompilationOutput> {
        let extension = self.prepare()?;

        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if let Some(first_position) = positions.insert(descriptor.name(), position) {
                return Err(CompileError::DuplicateOperationName {
                    first_position,
                    operation_name: descriptor.name().to_string(),
                    second_position: position,
                });
            }
        }

        self.generate(extension.as_ref(), descriptors)
    }

    /// Validate the configuration and load the registered extension before
    /// any operation is looked at.
    fn prepare(&self) -> Result<Option<LoadedExtension>> {
        let contract_name = self.options.extension_contract();
        let registered = self.host.registered_implementation(contract_name)?;
        self.options.validate(registered)?;
        Ok(self.host.load_extension(contract_name)?)
    }

    fn generate(
        &self,
        extension: Option<&LoadedExtension>,
        descriptors: &[OperationDescriptor],
    ) -> Result<CompilationOutput> {
        let ids = self.resolve_ids(extension, descriptors)?;
        let layouts = self.resolve_layouts(extension, descriptors)?;

        let operation_output = OperationOutput::from_ids(descriptors, &ids)
            .map_err(|err| CompileError::GeneratorOutput {
                err,
                generator: "operation output".to_string(),
            })?;

        log::info!(
            "Compiled {} operations{}.",
            descriptors.len(),
            extension.map(|ext| format!(" with extension `{}`", ext.name()))
                .unwrap_or_default(),
        );
        Ok(CompilationOutput {
            extension: extension.map(|ext| ext.name().to_string()),
            layouts,
            operation_output,
        })
    }

    fn resolve_ids(
        &self,
        extension: Option<&LoadedExtension>,
        descriptors: &[OperationDescriptor],
    ) -> Result<Vec<OperationId>> {
        if let Some(extension) = extension
            && let Some(ids) = self.host.resolve_identifiers(extension, descriptors)? {
            return Ok(ids);
        }

        if let Some(generator) = &self.options.operation_output_generator {
            log::debug!("Generating operation output with `{}`.", generator.name());
            let output = generator.generate(descriptors)
                .map_err(|err| CompileError::GeneratorFailed {
                    generator: generator.name().to_string(),
                    message: err.to_string(),
                })?;
            return output.ids_for(descriptors)
                .map_err(|err| CompileError::GeneratorOutput {
                    err,
                    generator: generator.name().to_string(),
                });
        }

        let default_generator = Sha256OperationIdGenerator;
        let generator: &dyn OperationIdGenerator =
            self.options.operation_id_generator
                .as_deref()
                .unwrap_or(&default_generator);
        log::debug!("Generating operation ids with `{}`.", generator.name());

        let ids: Vec<OperationId> =
            descriptors.iter()
                .map(|descriptor| OperationId::new(
                    generator.generate(descriptor),
                    descriptor.name(),
                ))
                .collect();
        crate::operation_id::validate_operation_ids(descriptors, &ids)
            .map_err(|err| CompileError::GeneratorOutput {
                err,
                generator: generator.name().to_string(),
            })?;
        Ok(ids)
    }

    fn resolve_layouts(
        &self,
        extension: Option<&LoadedExtension>,
        descriptors: &[OperationDescriptor],
    ) -> Result<IndexMap<String, LayoutDecision>> {
        let extension_layouts = match extension {
            Some(extension) => self.host.resolve_layouts(extension, descriptors)?,
            None => None,
        };

        let decisions = match extension_layouts {
            Some(decisions) => decisions,
            None => {
                let flat = FlatPackageName(self.options.package_name.to_owned());
                let generator: &dyn PackageNameGenerator =
                    self.options.package_name_generator
                        .as_deref()
                        .unwrap_or(&flat);
                let layout = DefaultLayout::new(generator);
                descriptors.iter()
                    .map(|descriptor| layout.resolve_layout(descriptor))
                    .collect()
            },
        };

        let mut claimed: HashMap<(&str, &str), &str> = HashMap::new();
        for (descriptor, decision) in descriptors.iter().zip(&decisions) {
            let key = (decision.package_name.as_str(), decision.file_name.as_str());
            if let Some(first_operation) = claimed.insert(key, descriptor.name()) {
                return Err(CompileError::LayoutCollision {
                    file_name: decision.file_name.to_owned(),
                    first_operation: first_operation.to_string(),
                    package_name: decision.package_name.to_owned(),
                    second_operation: descriptor.name().to_string(),
                });
            }
        }

        Ok(descriptors.iter()
            .map(|descriptor| descriptor.name().to_string())
            .zip(decisions)
            .collect())
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("{} error(s) loading operations:\n{}", .0.len(), format_document_errors(.0))]
    Document(Vec<DocumentLoadError>),

    #[error(
        "Operation name '{operation_name}' is used at positions \
        {first_position} and {second_position}"
    )]
    DuplicateOperationName {
        first_position: usize,
        operation_name: String,
        second_position: usize,
    },

    #[error(transparent)]
    ExtensionExecution(#[from] ExtensionExecutionError),

    #[error("Generator `{generator}` failed: {message}")]
    GeneratorFailed {
        generator: String,
        message: String,
    },

    #[error("Generator `{generator}` produced malformed operation ids: {err}")]
    GeneratorOutput {
        err: OperationIdValidationError,
        generator: String,
    },

    #[error(
        "Operations '{first_operation}' and '{second_operation}' would both be \
        generated into `{file_name}` in package `{package_name}`"
    )]
    LayoutCollision {
        file_name: String,
        first_operation: String,
        package_name: String,
        second_operation: String,
    },
}
impl From<HostError> for CompileError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Configuration(err) => Self::Configuration(err),
            HostError::Discovery(err) => Self::Discovery(err),
        }
    }
}

fn format_document_errors(errors: &[DocumentLoadError]) -> String {
    errors.iter()
        .map(|err| format!("  * {err}"))
        .collect::<Vec<_>>()
        .join("\n")
}
