use crate::CompilerExtension;
use crate::ConfigurationError;
use crate::DiscoveryError;
use crate::ExtensionFailure;
use crate::plugin_host::panic_message;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

/// Builds a fresh instance of one extension implementation.
///
/// Factories take no arguments: values an extension needs at build time have
/// to be compiled into it (see [`BuildConstants`](crate::BuildConstants)).
pub type ExtensionFactory =
    Box<dyn Fn() -> Result<Box<dyn CompilerExtension>, ExtensionFailure> + Send + Sync>;

/// The catalog of extension implementations a [`PluginHost`](crate::PluginHost)
/// is able to instantiate, keyed by implementation name.
///
/// Being in the catalog does not make an implementation active; it also has
/// to be registered against a contract in a
/// [`RegistrationSet`](crate::RegistrationSet).
#[derive(Default)]
pub struct ExtensionRegistry {
    factories: BTreeMap<String, ExtensionFactory>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, implementation: &str) -> bool {
        self.factories.contains_key(implementation)
    }

    pub fn implementation_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn register<F>(
        &mut self,
        implementation: impl Into<String>,
        factory: F,
    ) -> Result<(), ConfigurationError>
    where
        F: Fn() -> Result<Box<dyn CompilerExtension>, ExtensionFailure> + Send + Sync + 'static,
    {
        let implementation = implementation.into();
        if self.factories.contains_key(&implementation) {
            return Err(ConfigurationError::DuplicateImplementation { implementation });
        }

        log::trace!("Adding extension implementation `{implementation}` to the registry.");
        self.factories.insert(implementation, Box::new(factory));
        Ok(())
    }

    pub(crate) fn instantiate(
        &self,
        contract_name: &str,
        implementation: &str,
    ) -> Result<Box<dyn CompilerExtension>, DiscoveryError> {
        let Some(factory) = self.factories.get(implementation) else {
            return Err(DiscoveryError::UnknownImplementation {
                available: self.implementation_names().map(str::to_string).collect(),
                contract_name: contract_name.to_string(),
                implementation: implementation.to_string(),
            });
        };

        match std::panic::catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(extension)) => Ok(extension),
            Ok(Err(err)) => Err(DiscoveryError::InstantiationFailed {
                implementation: implementation.to_string(),
                message: err.to_string(),
            }),
            Err(payload) => Err(DiscoveryError::InstantiationFailed {
                implementation: implementation.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}
impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
