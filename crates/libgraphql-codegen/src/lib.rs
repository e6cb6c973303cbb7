//! A pluggable code-generation host for GraphQL client operations.
//!
//! A compilation loads operation documents into [`OperationDescriptor`]s,
//! assigns each operation a persisted-query id, decides where the generated
//! artifact for each operation goes, and assembles an [`OperationOutput`]
//! (the persisted-query manifest).
//!
//! Id assignment and layout can be taken over by at most one
//! [`CompilerExtension`], registered against [`CONTRACT_NAME`] and loaded by a
//! [`PluginHost`]. Without an extension, ids are content hashes of the
//! normalized operation text ([`Sha256OperationIdGenerator`]) and the layout
//! follows [`DefaultLayout`].

mod ast;
mod build_constants;
mod compiler;
mod compiler_options;
mod config;
mod configuration_error;
mod document_loader;
mod extension;
mod extension_registry;
pub mod file_reader;
pub mod loc;
mod layout;
mod operation_descriptor;
mod operation_id;
mod operation_id_generator;
mod operation_output;
mod plugin_host;
mod process_extension;
mod registration;

pub use build_constants::BuildConstants;
pub use build_constants::BuildConstantsError;
pub use compiler::CompilationOutput;
pub use compiler::CompileError;
pub use compiler::Compiler;
pub use compiler_options::CompilerOptions;
pub use compiler_options::CompilerOptionsBuilder;
pub use config::CodegenConfig;
pub use config::ConfigLoadError;
pub use config::PackageNameStrategy;
pub use config::DEFAULT_CONFIG_FILE_NAME;
pub use configuration_error::ConfigurationError;
pub use document_loader::DocumentLoadError;
pub use document_loader::DocumentLoader;
pub use document_loader::SourceDocument;
pub use extension::CompilerExtension;
pub use extension::ExtensionFailure;
pub use extension::LayoutResolver;
pub use extension::OperationIdResolver;
pub use extension::CONTRACT_NAME;
pub use extension_registry::ExtensionFactory;
pub use extension_registry::ExtensionRegistry;
pub use layout::DefaultLayout;
pub use layout::FilePathPackageName;
pub use layout::FlatPackageName;
pub use layout::LayoutDecision;
pub use layout::PackageNameGenerator;
pub use operation_descriptor::OperationDescriptor;
pub use operation_descriptor::OperationKind;
pub use operation_id::validate_operation_ids;
pub use operation_id::OperationId;
pub use operation_id::OperationIdValidationError;
pub use operation_id_generator::OperationIdGenerator;
pub use operation_id_generator::Sha256OperationIdGenerator;
pub use operation_output::ManifestFormat;
pub use operation_output::OperationOutput;
pub use operation_output::OperationOutputGenerator;
pub use operation_output::OperationOutputWriteError;
pub use operation_output::PERSISTED_QUERY_MANIFEST_FORMAT;
pub use operation_output::PERSISTED_QUERY_MANIFEST_VERSION;
pub use plugin_host::Capability;
pub use plugin_host::DiscoveryError;
pub use plugin_host::ExtensionExecutionError;
pub use plugin_host::HostError;
pub use plugin_host::LoadedExtension;
pub use plugin_host::PluginHost;
pub use process_extension::ProcessExtension;
pub use process_extension::ProcessExtensionError;
pub use process_extension::ProcessExtensionSpec;
pub use registration::parse_registration_file;
pub use registration::RegistrationError;
pub use registration::RegistrationSet;
pub use registration::REGISTRATIONS_DIR;

#[cfg(test)]
mod tests;
