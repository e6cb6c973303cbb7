use crate::CompilerExtension;
use crate::ExtensionFailure;
use crate::ExtensionRegistry;
use crate::LayoutDecision;
use crate::LayoutResolver;
use crate::OperationDescriptor;
use crate::OperationId;
use crate::OperationIdResolver;
use crate::OperationKind;
use crate::PluginHost;
use crate::RegistrationSet;
use crate::CONTRACT_NAME;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

pub(super) fn query_descriptor(name: &str, position: usize) -> OperationDescriptor {
    OperationDescriptor::new(
        name,
        OperationKind::Query,
        format!("query {name} {{\n  viewer {{\n    id\n  }}\n}}"),
        position,
        None,
    )
}

pub(super) fn query_descriptors(names: &[&str]) -> Vec<OperationDescriptor> {
    names.iter()
        .enumerate()
        .map(|(position, name)| query_descriptor(name, position))
        .collect()
}

/// What a [`ScriptedExtension`] answers when asked for operation ids.
#[derive(Clone, Debug)]
pub(super) enum IdsScript {
    /// `custom-<operation name>` for every descriptor.
    Echo,
    Fail(&'static str),
    Fixed(Vec<OperationId>),
    Panic(&'static str),
}

/// An in-process extension whose answers are scripted by the test, and which
/// counts how often each capability was invoked.
#[derive(Clone, Debug)]
pub(super) struct ScriptedExtension {
    pub ids: Option<IdsScript>,
    pub id_calls: Arc<AtomicUsize>,
    pub layout: Option<LayoutDecision>,
    pub layout_calls: Arc<AtomicUsize>,
    pub name: &'static str,
}
impl ScriptedExtension {
    pub fn new(name: &'static str) -> Self {
        Self {
            ids: None,
            id_calls: Arc::new(AtomicUsize::new(0)),
            layout: None,
            layout_calls: Arc::new(AtomicUsize::new(0)),
            name,
        }
    }

    pub fn with_ids(mut self, script: IdsScript) -> Self {
        self.ids = Some(script);
        self
    }

    pub fn with_layout(mut self, layout: LayoutDecision) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn id_calls(&self) -> usize {
        self.id_calls.load(Ordering::SeqCst)
    }

    pub fn layout_calls(&self) -> usize {
        self.layout_calls.load(Ordering::SeqCst)
    }

    /// A host with this extension registered (as `name`) for
    /// [`CONTRACT_NAME`].
    pub fn into_host(self) -> PluginHost {
        let name = self.name;
        let mut registry = ExtensionRegistry::new();
        registry.register(name, move || {
            Ok(Box::new(self.clone()) as Box<dyn CompilerExtension>)
        }).unwrap();

        let mut registrations = RegistrationSet::new();
        registrations.register(CONTRACT_NAME, name);
        PluginHost::new(registry, registrations)
    }
}

impl CompilerExtension for ScriptedExtension {
    fn name(&self) -> &str {
        self.name
    }

    fn layout(&self) -> Option<&dyn LayoutResolver> {
        self.layout.as_ref().map(|_| self as &dyn LayoutResolver)
    }

    fn operation_id_resolver(&self) -> Option<&dyn OperationIdResolver> {
        self.ids.as_ref().map(|_| self as &dyn OperationIdResolver)
    }
}

impl OperationIdResolver for ScriptedExtension {
    fn resolve_operation_ids(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<Vec<OperationId>, ExtensionFailure> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        match self.ids.as_ref() {
            Some(IdsScript::Echo) | None => Ok(
                descriptors.iter()
                    .map(|d| OperationId::new(format!("custom-{}", d.name()), d.name()))
                    .collect()
            ),
            Some(IdsScript::Fail(message)) => Err((*message).into()),
            Some(IdsScript::Fixed(ids)) => Ok(ids.clone()),
            Some(IdsScript::Panic(message)) => panic!("{message}"),
        }
    }
}

impl LayoutResolver for ScriptedExtension {
    fn resolve_layout(
        &self,
        descriptor: &OperationDescriptor,
    ) -> Result<LayoutDecision, ExtensionFailure> {
        self.layout_calls.fetch_add(1, Ordering::SeqCst);
        let mut layout = self.layout.clone().unwrap_or_else(|| LayoutDecision {
            class_name: String::new(),
            file_name: String::new(),
            package_name: String::new(),
        });
        if !layout.class_name.is_empty() {
            layout.class_name = format!("{}{}", layout.class_name, descriptor.name());
        }
        if !layout.file_name.is_empty() {
            layout.file_name = format!("{}_{}", descriptor.name(), layout.file_name);
        }
        Ok(layout)
    }
}
