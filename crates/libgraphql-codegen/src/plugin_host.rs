use crate::operation_id::validate_operation_ids;
use crate::CompilerExtension;
use crate::ConfigurationError;
use crate::ExtensionRegistry;
use crate::LayoutDecision;
use crate::OperationDescriptor;
use crate::OperationId;
use crate::OperationIdValidationError;
use crate::RegistrationSet;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use thiserror::Error;

/// An instantiated compiler extension along with the implementation name it
/// was registered under.
pub struct LoadedExtension {
    extension: Box<dyn CompilerExtension>,
    implementation: String,
}
impl LoadedExtension {
    pub fn extension(&self) -> &dyn CompilerExtension {
        self.extension.as_ref()
    }

    pub fn implementation(&self) -> &str {
        self.implementation.as_str()
    }

    pub fn name(&self) -> &str {
        self.extension.name()
    }
}
impl std::fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("implementation", &self.implementation)
            .field("name", &self.name())
            .finish()
    }
}

/// Discovers the (at most one) compiler extension registered for a contract
/// and dispatches the compiler's extension points to it.
///
/// The host owns both the catalog of implementations it can build
/// ([`ExtensionRegistry`]) and the registration records saying which of them
/// are active ([`RegistrationSet`]). Neither changes after construction.
///
/// # Example
///
/// ```
/// use libgraphql_codegen::ExtensionRegistry;
/// use libgraphql_codegen::PluginHost;
/// use libgraphql_codegen::RegistrationSet;
/// use libgraphql_codegen::CONTRACT_NAME;
///
/// let host = PluginHost::new(ExtensionRegistry::new(), RegistrationSet::new());
/// assert!(host.load_extension(CONTRACT_NAME).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct PluginHost {
    registrations: RegistrationSet,
    registry: ExtensionRegistry,
}

impl PluginHost {
    pub fn new(registry: ExtensionRegistry, registrations: RegistrationSet) -> Self {
        Self {
            registrations,
            registry,
        }
    }

    pub fn registrations(&self) -> &RegistrationSet {
        &self.registrations
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// The implementation registered for `contract_name`, if any, without
    /// instantiating it.
    ///
    /// More than one distinct registered implementation is rejected rather
    /// than resolved by picking one.
    pub fn registered_implementation(
        &self,
        contract_name: &str,
    ) -> Result<Option<&str>, ConfigurationError> {
        match self.registrations.implementations(contract_name) {
            [] => Ok(None),
            [implementation] => Ok(Some(implementation.as_str())),
            implementations => {
                let mut implementations = implementations.to_vec();
                implementations.sort();
                Err(ConfigurationError::AmbiguousExtensions {
                    contract_name: contract_name.to_string(),
                    implementations,
                })
            },
        }
    }

    /// Instantiate the extension registered for `contract_name`.
    ///
    /// Returns `Ok(None)` when nothing is registered.
    pub fn load_extension(
        &self,
        contract_name: &str,
    ) -> Result<Option<LoadedExtension>, HostError> {
        let Some(implementation) = self.registered_implementation(contract_name)? else {
            log::debug!("No extension registered for `{contract_name}`.");
            return Ok(None);
        };

        let extension = self.registry.instantiate(contract_name, implementation)?;
        log::debug!(
            "Loaded extension `{}` (implementation `{implementation}`) for \
            `{contract_name}`.",
            extension.name(),
        );
        Ok(Some(LoadedExtension {
            extension,
            implementation: implementation.to_string(),
        }))
    }

    /// Ask `extension` for the persisted-query ids of `descriptors`.
    ///
    /// Returns `Ok(None)` if the extension does not resolve operation ids.
    /// Otherwise the resolver is invoked exactly once (never for an empty
    /// batch) and its answer is validated before being returned.
    pub fn resolve_identifiers(
        &self,
        extension: &LoadedExtension,
        descriptors: &[OperationDescriptor],
    ) -> Result<Option<Vec<OperationId>>, ExtensionExecutionError> {
        let resolver = catch_panic(extension, Capability::OperationIds, || {
            extension.extension().operation_id_resolver()
        })?;
        let Some(resolver) = resolver else {
            return Ok(None);
        };

        if descriptors.is_empty() {
            return Ok(Some(vec![]));
        }

        log::debug!(
            "Resolving {} operation ids with extension `{}`...",
            descriptors.len(),
            extension.name(),
        );
        let ids = invoke(extension, Capability::OperationIds, || {
            resolver.resolve_operation_ids(descriptors)
        })?;

        validate_operation_ids(descriptors, &ids)
            .map_err(|err| ExtensionExecutionError::MalformedOperationIds {
                err,
                extension: extension.name().to_string(),
            })?;

        Ok(Some(ids))
    }

    /// Ask `extension` for the layout of every descriptor.
    ///
    /// Returns `Ok(None)` if the extension does not provide a layout.
    pub fn resolve_layouts(
        &self,
        extension: &LoadedExtension,
        descriptors: &[OperationDescriptor],
    ) -> Result<Option<Vec<LayoutDecision>>, ExtensionExecutionError> {
        let layout = catch_panic(extension, Capability::Layout, || {
            extension.extension().layout()
        })?;
        let Some(layout) = layout else {
            return Ok(None);
        };

        let mut decisions = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let decision = invoke(extension, Capability::Layout, || {
                layout.resolve_layout(descriptor)
            })?;

            let empty_fields = decision.empty_fields();
            if !empty_fields.is_empty() {
                return Err(ExtensionExecutionError::MalformedLayout {
                    empty_fields,
                    extension: extension.name().to_string(),
                    operation_name: descriptor.name().to_string(),
                });
            }
            decisions.push(decision);
        }
        Ok(Some(decisions))
    }
}

/// An extension capability the host dispatches to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    Layout,
    OperationIds,
}
impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Layout => "layout",
            Self::OperationIds => "operation_ids",
        })
    }
}

fn catch_panic<T>(
    extension: &LoadedExtension,
    capability: Capability,
    call: impl FnOnce() -> T,
) -> Result<T, ExtensionExecutionError> {
    std::panic::catch_unwind(AssertUnwindSafe(call))
        .map_err(|payload| ExtensionExecutionError::Panicked {
            capability,
            extension: extension.name().to_string(),
            message: panic_message(payload.as_ref()),
        })
}

fn invoke<T>(
    extension: &LoadedExtension,
    capability: Capability,
    call: impl FnOnce() -> Result<T, crate::ExtensionFailure>,
) -> Result<T, ExtensionExecutionError> {
    catch_panic(extension, capability, call)?
        .map_err(|err| ExtensionExecutionError::Failed {
            capability,
            extension: extension.name().to_string(),
            message: err.to_string(),
        })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.to_owned()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// The declared extension implementation could not be found or built.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DiscoveryError {
    #[error("Failed to instantiate extension implementation `{implementation}`: {message}")]
    InstantiationFailed {
        implementation: String,
        message: String,
    },

    #[error(
        "`{implementation}` is registered for `{contract_name}`, but no such \
        implementation is known (known implementations: {})",
        format_available(.available)
    )]
    UnknownImplementation {
        available: Vec<String>,
        contract_name: String,
        implementation: String,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// A compiler extension raised an error, panicked, or answered with
/// malformed data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExtensionExecutionError {
    #[error("Extension `{extension}` failed to resolve {capability}: {message}")]
    Failed {
        capability: Capability,
        extension: String,
        message: String,
    },

    #[error(
        "Extension `{extension}` returned a layout for '{operation_name}' with \
        empty fields: {}",
        .empty_fields.join(", ")
    )]
    MalformedLayout {
        empty_fields: Vec<&'static str>,
        extension: String,
        operation_name: String,
    },

    #[error("Extension `{extension}` returned malformed operation ids: {err}")]
    MalformedOperationIds {
        err: OperationIdValidationError,
        extension: String,
    },

    #[error("Extension `{extension}` panicked while resolving {capability}: {message}")]
    Panicked {
        capability: Capability,
        extension: String,
        message: String,
    },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum HostError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}
