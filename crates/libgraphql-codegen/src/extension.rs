use crate::LayoutDecision;
use crate::OperationDescriptor;
use crate::OperationId;

/// The well-known key compiler extensions are registered under.
pub const CONTRACT_NAME: &str = "libgraphql_codegen.CompilerExtension";

/// Any error raised by an extension (or by an extension's factory).
pub type ExtensionFailure = Box<dyn std::error::Error + Send + Sync>;

/// An externally supplied implementation that customizes code generation.
///
/// An extension offers zero or more capabilities. A capability it does not
/// offer is handled by the compiler's default behavior; a capability it does
/// offer replaces that default entirely for the compilation.
///
/// # Example
///
/// ```
/// use libgraphql_codegen::CompilerExtension;
/// use libgraphql_codegen::ExtensionFailure;
/// use libgraphql_codegen::OperationDescriptor;
/// use libgraphql_codegen::OperationId;
/// use libgraphql_codegen::OperationIdResolver;
///
/// struct NameAsId;
///
/// impl OperationIdResolver for NameAsId {
///     fn resolve_operation_ids(
///         &self,
///         descriptors: &[OperationDescriptor],
///     ) -> Result<Vec<OperationId>, ExtensionFailure> {
///         Ok(descriptors.iter()
///             .map(|d| OperationId::new(d.name(), d.name()))
///             .collect())
///     }
/// }
///
/// impl CompilerExtension for NameAsId {
///     fn name(&self) -> &str {
///         "name-as-id"
///     }
///
///     fn operation_id_resolver(&self) -> Option<&dyn OperationIdResolver> {
///         Some(self)
///     }
/// }
/// ```
pub trait CompilerExtension: Send + Sync {
    fn name(&self) -> &str;

    fn layout(&self) -> Option<&dyn LayoutResolver> {
        None
    }

    fn operation_id_resolver(&self) -> Option<&dyn OperationIdResolver> {
        None
    }
}

/// Assigns persisted-query ids to a whole batch of operations at once
/// (typically by registering them with a remote service).
pub trait OperationIdResolver {
    /// Must return exactly one [`OperationId`] per descriptor, in the same
    /// order as `descriptors`. Ids must be non-empty and unique within the
    /// batch.
    fn resolve_operation_ids(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<Vec<OperationId>, ExtensionFailure>;
}

/// Overrides the default naming and placement of generated artifacts.
pub trait LayoutResolver {
    fn resolve_layout(
        &self,
        descriptor: &OperationDescriptor,
    ) -> Result<LayoutDecision, ExtensionFailure>;
}
