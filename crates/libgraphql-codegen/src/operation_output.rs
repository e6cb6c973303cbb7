use crate::operation_id::validate_operation_ids;
use crate::ExtensionFailure;
use crate::OperationDescriptor;
use crate::OperationId;
use crate::OperationIdValidationError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const PERSISTED_QUERY_MANIFEST_FORMAT: &str = "apollo-persisted-query-manifest";
pub const PERSISTED_QUERY_MANIFEST_VERSION: u32 = 1;

/// The on-disk format [`OperationOutput`] is written in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    /// `{"<id>": {"name": ..., "source": ...}, ...}`
    OperationOutput,

    /// `{"format": "apollo-persisted-query-manifest", "version": 1, "operations": [...]}`
    #[default]
    PersistedQueryManifest,
}
impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operation-output" => Ok(Self::OperationOutput),
            "persisted-query-manifest" => Ok(Self::PersistedQueryManifest),
            other => Err(format!(
                "Unknown manifest format `{other}` (expected \
                `persisted-query-manifest` or `operation-output`)"
            )),
        }
    }
}

/// Persisted-query ids mapped to the operations they stand for, in the order
/// the operations were compiled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationOutput {
    entries: IndexMap<String, OperationDescriptor>,
}

impl OperationOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair up `descriptors` with the ids assigned to them.
    pub fn from_ids(
        descriptors: &[OperationDescriptor],
        ids: &[OperationId],
    ) -> Result<Self, OperationIdValidationError> {
        validate_operation_ids(descriptors, ids)?;
        Ok(Self {
            entries: ids.iter()
                .zip(descriptors)
                .map(|(op_id, descriptor)| (op_id.id.to_owned(), descriptor.clone()))
                .collect(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&OperationDescriptor> {
        self.entries.get(id)
    }

    /// The id assigned to the operation named `operation_name`.
    pub fn id_for(&self, operation_name: &str) -> Option<&str> {
        self.entries.iter()
            .find(|(_, descriptor)| descriptor.name() == operation_name)
            .map(|(id, _)| id.as_str())
    }

    /// Add an entry. Returns the descriptor previously stored under `id`, if
    /// any.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        descriptor: OperationDescriptor,
    ) -> Option<OperationDescriptor> {
        self.entries.insert(id.into(), descriptor)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationDescriptor)> {
        self.entries.iter().map(|(id, descriptor)| (id.as_str(), descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The ids in this output, reordered to line up with `descriptors`, and
    /// checked the same way extension-provided ids are.
    pub fn ids_for(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<Vec<OperationId>, OperationIdValidationError> {
        if self.entries.len() != descriptors.len() {
            return Err(OperationIdValidationError::CardinalityMismatch {
                actual: self.entries.len(),
                expected: descriptors.len(),
            });
        }

        let ids = descriptors.iter()
            .map(|descriptor| match self.id_for(descriptor.name()) {
                Some(id) => Ok(OperationId::new(id, descriptor.name())),
                None => Err(OperationIdValidationError::MissingOperation {
                    name: descriptor.name().to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        validate_operation_ids(descriptors, &ids)?;
        Ok(ids)
    }

    pub fn to_json(&self, format: ManifestFormat) -> serde_json::Result<String> {
        match format {
            ManifestFormat::OperationOutput => {
                let entries: IndexMap<&str, LegacyEntry<'_>> =
                    self.entries.iter()
                        .map(|(id, descriptor)| (id.as_str(), LegacyEntry {
                            name: descriptor.name(),
                            source: descriptor.source(),
                        }))
                        .collect();
                serde_json::to_string_pretty(&entries)
            },

            ManifestFormat::PersistedQueryManifest => {
                serde_json::to_string_pretty(&PersistedQueryManifest {
                    format: PERSISTED_QUERY_MANIFEST_FORMAT,
                    operations: self.entries.iter()
                        .map(|(id, descriptor)| ManifestOperation {
                            body: descriptor.source(),
                            id: id.as_str(),
                            name: descriptor.name(),
                            r#type: descriptor.kind().as_str(),
                        })
                        .collect(),
                    version: PERSISTED_QUERY_MANIFEST_VERSION,
                })
            },
        }
    }

    pub fn write_to(
        &self,
        path: impl AsRef<Path>,
        format: ManifestFormat,
    ) -> Result<(), OperationOutputWriteError> {
        let path = path.as_ref();
        let json = self.to_json(format).map_err(OperationOutputWriteError::Serialize)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| OperationOutputWriteError::Write {
                    err,
                    path: path.to_path_buf(),
                })?;
        }
        std::fs::write(path, json)
            .map_err(|err| OperationOutputWriteError::Write {
                err,
                path: path.to_path_buf(),
            })?;
        log::debug!("Wrote {} operations to {path:#?}.", self.entries.len());
        Ok(())
    }
}

/// Produces the complete [`OperationOutput`] for a compilation, replacing
/// both operation id generation and manifest assembly.
pub trait OperationOutputGenerator: Send + Sync {
    /// Identifies the generator in logs and configuration errors.
    fn name(&self) -> &str;

    fn generate(
        &self,
        descriptors: &[OperationDescriptor],
    ) -> Result<OperationOutput, ExtensionFailure>;
}

#[derive(Serialize)]
struct LegacyEntry<'a> {
    name: &'a str,
    source: &'a str,
}

#[derive(Serialize)]
struct PersistedQueryManifest<'a> {
    format: &'static str,
    version: u32,
    operations: Vec<ManifestOperation<'a>>,
}

#[derive(Serialize)]
struct ManifestOperation<'a> {
    id: &'a str,
    body: &'a str,
    name: &'a str,
    r#type: &'static str,
}

#[derive(Debug, Error)]
pub enum OperationOutputWriteError {
    #[error("Failed to serialize operation output: {0}")]
    Serialize(serde_json::Error),

    #[error("Failed to write operation output to {path:?}: {err}")]
    Write {
        err: std::io::Error,
        path: PathBuf,
    },
}
