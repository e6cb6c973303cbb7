use crate::CompilerExtension;
use crate::ConfigurationError;
use crate::ExtensionFailure;
use crate::ExtensionRegistry;
use crate::LayoutDecision;
use crate::LayoutResolver;
use crate::OperationDescriptor;
use crate::OperationId;
use crate::OperationIdResolver;
use serde::Deserialize;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use thiserror::Error;

/// How to launch an extension that runs as its own process.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProcessExtensionSpec {
    #[serde(default)]
    pub args: Vec<String>,
    pub command: String,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}
impl ProcessExtensionSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            args: vec![],
            command: command.into(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// One request per process invocation, written to the child's stdin.
#[derive(Debug, Serialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
enum ExtensionRequest<'a> {
    Describe,
    Layout {
        descriptor: &'a OperationDescriptor,
    },
    OperationIds {
        descriptors: &'a [OperationDescriptor],
    },
}

/// The child's answer, read from its stdout.
#[derive(Debug, Default, Deserialize)]
struct ExtensionResponse {
    capabilities: Option<Vec<String>>,
    error: Option<String>,
    layout: Option<LayoutDecision>,
    operation_ids: Option<Vec<OperationId>>,
}

/// A [`CompilerExtension`] that runs outside of the compiler's process.
///
/// The extension shares nothing with the compiler: every call spawns the
/// configured command, writes one JSON request to its stdin and reads one
/// JSON response from its stdout. The compiler blocks until the child exits.
///
/// Requests:
///
/// ```text
/// {"capability": "describe"}
/// {"capability": "operation_ids", "descriptors": [{"name": ..., "kind": ..., "position": ..., "source": ...}]}
/// {"capability": "layout", "descriptor": {...}}
/// ```
///
/// Responses are respectively `{"capabilities": ["operation_ids", "layout"]}`,
/// `{"operation_ids": [{"id": ..., "name": ...}]}` and
/// `{"layout": {"package_name": ..., "class_name": ..., "file_name": ...}}`.
/// Any request may instead be answered with `{"error": "..."}` or a non-zero
/// exit status.
#[derive(Clone, Debug)]
pub struct ProcessExtension {
    name: String,
    provides_layout: bool,
    provides_operation_ids: bool,
    spec: ProcessExtensionSpec,
}

impl ProcessExtension {
    /// Launch the extension once to learn which capabilities it provides.
    pub fn describe(
        name: impl Into<String>,
        spec: ProcessExtensionSpec,
    ) -> Result<Self, ProcessExtensionError> {
        let name = name.into();
        let response = run(&spec, &ExtensionRequest::Describe)?;
        let capabilities = response.capabilities
            .ok_or(ProcessExtensionError::MissingField("capabilities"))?;

        let mut extension = Self {
            name,
            provides_layout: false,
            provides_operation_ids: false,
            spec,
        };
        for capability in capabilities {
            match capability.as_str() {
                "layout" => extension.provides_layout = true,
                "operation_ids" => extension.provides_operation_ids = true,
                other => log::warn!(
                    "Extension `{}` declared an unknown capability `{other}`; \
                    ignoring it.",
                    extension.name,
                ),
            }
        }
        log::debug!(
            "Process extension `{}` provides operation_ids={} layout={}.",
            extension.name,
            extension.provides_operation_ids,
            extension.provides_layout,
        );
        Ok(extension)
    }

    pub fn spec(&self) -> &ProcessExtensionSpec {
        &self.spec
    }
}

impl CompilerExtension for ProcessExtension {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn layout(&self) -> Option<&dyn LayoutResolver> {
        self.provides_layout.then_some(self as &dyn LayoutResolver)
    }

    fn operation_id_resolver(&self) -> Option<&dyn OperationIdResolver> {
        self.provides_operation_ids.then_some(self as &dyn OperationIdResolver)
    }
}

impl OperationIdResolver for ProcessExtension {
    fn resolve_operation_ids(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<Vec<OperationId>, ExtensionFailure> {
        let response = run(&self.spec, &ExtensionRequest::OperationIds { descriptors })?;
        Ok(response.operation_ids.ok_or(ProcessExtensionError::MissingField("operation_ids"))?)
    }
}

impl LayoutResolver for ProcessExtension {
    fn resolve_layout(
        &self,
        descriptor: &OperationDescriptor,
    ) -> Result<LayoutDecision, ExtensionFailure> {
        let response = run(&self.spec, &ExtensionRequest::Layout { descriptor })?;
        Ok(response.layout.ok_or(ProcessExtensionError::MissingField("layout"))?)
    }
}

impl ExtensionRegistry {
    /// Make a process-backed extension available under `implementation`.
    ///
    /// The process is first launched when the extension is instantiated.
    pub fn register_process(
        &mut self,
        implementation: impl Into<String>,
        spec: ProcessExtensionSpec,
    ) -> Result<(), ConfigurationError> {
        let implementation = implementation.into();
        let name = implementation.to_owned();
        self.register(implementation, move || {
            let extension = ProcessExtension::describe(name.as_str(), spec.clone())?;
            Ok(Box::new(extension) as Box<dyn CompilerExtension>)
        })
    }
}

fn run(
    spec: &ProcessExtensionSpec,
    request: &ExtensionRequest<'_>,
) -> Result<ExtensionResponse, ProcessExtensionError> {
    let payload = serde_json::to_vec(request)
        .map_err(ProcessExtensionError::EncodeRequest)?;

    let mut command = Command::new(&spec.command);
    command.args(&spec.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(working_dir) = &spec.working_dir {
        command.current_dir(working_dir);
    }

    log::trace!("Spawning extension process `{}` {:?}.", spec.command, spec.args);
    let mut child = command.spawn()
        .map_err(|err| ProcessExtensionError::Spawn {
            command: spec.command.to_owned(),
            err,
        })?;

    // Feed stdin from another thread so a child that writes a lot before
    // reading all of its input can't deadlock against us.
    let stdin = child.stdin.take();
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        if let Some(mut stdin) = stdin {
            stdin.write_all(&payload)?;
        }
        Ok(())
    });

    let output = child.wait_with_output().map_err(ProcessExtensionError::Io)?;
    let write_result = writer.join()
        .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

    if !output.status.success() {
        return Err(ProcessExtensionError::NonZeroExit {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    // A child that exits successfully without reading its input is fine.
    if let Err(err) = write_result
        && err.kind() != std::io::ErrorKind::BrokenPipe {
        return Err(ProcessExtensionError::Io(err));
    }

    let response: ExtensionResponse = serde_json::from_slice(&output.stdout)
        .map_err(|err| ProcessExtensionError::InvalidResponse {
            err,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })?;

    if let Some(message) = response.error {
        return Err(ProcessExtensionError::Reported(message));
    }
    Ok(response)
}

#[derive(Debug, Error)]
pub enum ProcessExtensionError {
    #[error("Failed to encode extension request: {0}")]
    EncodeRequest(serde_json::Error),

    #[error("Extension process answered with invalid JSON ({err}): {stdout}")]
    InvalidResponse {
        err: serde_json::Error,
        stdout: String,
    },

    #[error("I/O error talking to extension process: {0}")]
    Io(std::io::Error),

    #[error("Extension process response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Extension process exited with {status}: {stderr}")]
    NonZeroExit {
        status: String,
        stderr: String,
    },

    #[error("{0}")]
    Reported(String),

    #[error("Failed to spawn extension process `{command}`: {err}")]
    Spawn {
        command: String,
        err: std::io::Error,
    },
}
