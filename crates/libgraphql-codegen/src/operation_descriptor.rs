use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Similar to [`OperationDescriptor`], except without the corresponding
/// operation metadata.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Mutation,
    Query,
    Subscription,
}
impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mutation => "mutation",
            Self::Query => "query",
            Self::Subscription => "subscription",
        }
    }

    /// The suffix appended to generated class names for operations of this
    /// kind (i.e. `GetUser` -> `GetUserQuery`).
    pub fn class_name_suffix(&self) -> &'static str {
        match self {
            Self::Mutation => "Mutation",
            Self::Query => "Query",
            Self::Subscription => "Subscription",
        }
    }
}
impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed client operation as it is handed to id generators and
/// compiler extensions.
///
/// `source` holds the normalized operation body: the canonically printed
/// operation followed by every fragment it (transitively) spreads, sorted by
/// fragment name. Resolvers should treat it as opaque text.
///
/// Descriptors are immutable once built. `position` is the descriptor's
/// index within the batch it was loaded in.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OperationDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
    kind: OperationKind,
    name: String,
    position: usize,
    source: String,
}
impl OperationDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: OperationKind,
        source: impl Into<String>,
        position: usize,
        file_path: Option<PathBuf>,
    ) -> Self {
        Self {
            file_path,
            kind,
            name: name.into(),
            position,
            source: source.into(),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }
}
