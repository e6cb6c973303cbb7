use crate::ast;
use crate::file_reader;
use crate::loc;
use crate::OperationDescriptor;
use crate::OperationKind;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, Vec<DocumentLoadError>>;

/// A GraphQL executable document that has not been loaded yet.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceDocument {
    pub content: String,
    pub path: Option<PathBuf>,
}
impl SourceDocument {
    pub fn from_str(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            path: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, file_reader::ReadContentError> {
        let path = path.as_ref();
        Ok(Self {
            content: file_reader::read_content(path)?,
            path: Some(path.to_path_buf()),
        })
    }
}

#[derive(Debug)]
struct ParsedDocument {
    ast: ast::operation::Document,
    file_path: Option<PathBuf>,
}

#[derive(Debug)]
struct FragmentEntry<'doc> {
    def: &'doc ast::operation::FragmentDefinition,
    def_location: loc::FilePosition,
}

#[derive(Debug)]
struct OperationEntry<'doc> {
    def: &'doc ast::operation::OperationDefinition,
    file_path: Option<&'doc Path>,
    kind: OperationKind,
    name: &'doc str,
}

/// Loads GraphQL executable documents and turns the operations they define
/// into an ordered list of [`OperationDescriptor`]s.
///
/// Fragments may be defined in any loaded document. Every operation must be
/// named and operation names must be unique across everything loaded into
/// one `DocumentLoader`.
///
/// # Example
///
/// ```
/// use libgraphql_codegen::DocumentLoader;
///
/// let mut loader = DocumentLoader::new();
/// loader.add_str("query GetUser { user { ...UserFields } }", None).unwrap();
/// loader.add_str("fragment UserFields on User { id name }", None).unwrap();
///
/// let descriptors = loader.build().unwrap();
/// assert_eq!(descriptors.len(), 1);
/// assert_eq!(descriptors[0].name(), "GetUser");
/// assert!(descriptors[0].source().contains("fragment UserFields"));
/// ```
#[derive(Debug, Default)]
pub struct DocumentLoader {
    documents: Vec<ParsedDocument>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from a file and add it to the loader.
    pub fn add_file(
        &mut self,
        file_path: impl AsRef<Path>,
    ) -> std::result::Result<(), DocumentLoadError> {
        let file_path = file_path.as_ref();
        let content = file_reader::read_content(file_path)
            .map_err(DocumentLoadError::FileReadError)?;
        self.add_str(content, Some(file_path))
    }

    /// Parse a [`SourceDocument`] and add it to the loader.
    pub fn add_source(
        &mut self,
        document: &SourceDocument,
    ) -> std::result::Result<(), DocumentLoadError> {
        self.add_str(document.content.as_str(), document.path.as_deref())
    }

    /// Parse a document from a string and add it to the loader.
    pub fn add_str(
        &mut self,
        content: impl AsRef<str>,
        file_path: Option<&Path>,
    ) -> std::result::Result<(), DocumentLoadError> {
        let ast = ast::operation::parse(content.as_ref())
            .map_err(|err| DocumentLoadError::ParseError {
                file_path: file_path.map(Path::to_path_buf),
                err: err.to_string(),
            })?;

        let file_path = file_path.map(Path::to_path_buf);
        log::trace!(
            "Parsed {} definitions from {}.",
            ast.definitions.len(),
            format_file_path(&file_path),
        );
        self.documents.push(ParsedDocument { ast, file_path });
        Ok(())
    }

    /// Validate everything loaded so far and produce one
    /// [`OperationDescriptor`] per operation, in load order.
    ///
    /// All validation errors are returned at once rather than failing on the
    /// first error.
    pub fn build(self) -> Result<Vec<OperationDescriptor>> {
        let mut errors = vec![];
        let fragments = self.collect_fragments(&mut errors);
        let operations = self.collect_operations(&mut errors);

        let mut seen_cycles = HashSet::new();
        let mut descriptors = Vec::with_capacity(operations.len());
        for (position, op) in operations.iter().enumerate() {
            let mut referenced = BTreeSet::new();
            let mut stack = vec![];
            let mut spreads = vec![];
            collect_spreads(op_selection_set(op.def), &mut spreads);
            for spread in spreads {
                visit_fragment(
                    op.name,
                    spread,
                    &fragments,
                    &mut referenced,
                    &mut stack,
                    &mut seen_cycles,
                    &mut errors,
                );
            }

            let mut definitions = vec![
                ast::operation::Definition::Operation(op.def.clone()),
            ];
            definitions.extend(
                referenced.iter()
                    .filter_map(|name| fragments.get(name.as_str()))
                    .map(|frag| ast::operation::Definition::Fragment(frag.def.clone())),
            );
            let normalized = ast::operation::Document { definitions }.to_string();

            descriptors.push(OperationDescriptor::new(
                op.name,
                op.kind,
                normalized.trim_end(),
                position,
                op.file_path.map(Path::to_path_buf),
            ));
        }

        // Cycles among fragments no operation uses.
        let mut fragment_names: Vec<&str> = fragments.keys().copied().collect();
        fragment_names.sort_unstable();
        let mut visited = HashSet::new();
        for fragment_name in fragment_names {
            find_fragment_cycles(
                fragment_name,
                &fragments,
                &mut visited,
                &mut vec![],
                &mut seen_cycles,
                &mut errors,
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        log::debug!("Loaded {} operation descriptors.", descriptors.len());
        Ok(descriptors)
    }

    fn collect_fragments<'doc>(
        &'doc self,
        errors: &mut Vec<DocumentLoadError>,
    ) -> HashMap<&'doc str, FragmentEntry<'doc>> {
        let mut fragments: HashMap<&str, FragmentEntry<'_>> = HashMap::new();
        for doc in &self.documents {
            for def in &doc.ast.definitions {
                let ast::operation::Definition::Fragment(frag_def) = def else {
                    continue;
                };

                let def_location = loc::FilePosition::from_pos(
                    doc.file_path.as_ref(),
                    frag_def.position,
                );
                if let Some(existing) = fragments.get(frag_def.name.as_str()) {
                    errors.push(DocumentLoadError::DuplicateFragmentDefinition {
                        fragment_name: frag_def.name.to_string(),
                        first_def_location: existing.def_location.clone(),
                        second_def_location: def_location,
                    });
                    continue;
                }

                fragments.insert(frag_def.name.as_str(), FragmentEntry {
                    def: frag_def,
                    def_location,
                });
            }
        }
        fragments
    }

    fn collect_operations<'doc>(
        &'doc self,
        errors: &mut Vec<DocumentLoadError>,
    ) -> Vec<OperationEntry<'doc>> {
        use ast::operation::OperationDefinition as OpDef;

        let mut operations = vec![];
        let mut def_locations: HashMap<&str, loc::FilePosition> = HashMap::new();
        for doc in &self.documents {
            for def in &doc.ast.definitions {
                let ast::operation::Definition::Operation(op_def) = def else {
                    continue;
                };

                let (kind, name, pos) = match op_def {
                    OpDef::SelectionSet(ss) => (OperationKind::Query, None, ss.span.0),
                    OpDef::Query(q) => (OperationKind::Query, q.name.as_deref(), q.position),
                    OpDef::Mutation(m) => (OperationKind::Mutation, m.name.as_deref(), m.position),
                    OpDef::Subscription(s) => (OperationKind::Subscription, s.name.as_deref(), s.position),
                };
                let def_location = loc::FilePosition::from_pos(
                    doc.file_path.as_ref(),
                    pos,
                );

                let Some(name) = name else {
                    errors.push(DocumentLoadError::AnonymousOperation {
                        def_location,
                        kind,
                    });
                    continue;
                };

                if let Some(existing) = def_locations.get(name) {
                    errors.push(DocumentLoadError::DuplicateOperationName {
                        operation_name: name.to_string(),
                        first_def_location: existing.clone(),
                        second_def_location: def_location,
                    });
                    continue;
                }

                def_locations.insert(name, def_location);
                operations.push(OperationEntry {
                    def: op_def,
                    file_path: doc.file_path.as_deref(),
                    kind,
                    name,
                });
            }
        }
        operations
    }
}

fn op_selection_set(
    def: &ast::operation::OperationDefinition,
) -> &ast::operation::SelectionSet {
    use ast::operation::OperationDefinition as OpDef;
    match def {
        OpDef::SelectionSet(ss) => ss,
        OpDef::Query(q) => &q.selection_set,
        OpDef::Mutation(m) => &m.selection_set,
        OpDef::Subscription(s) => &s.selection_set,
    }
}

fn collect_spreads<'doc>(
    selection_set: &'doc ast::operation::SelectionSet,
    spreads: &mut Vec<&'doc str>,
) {
    use ast::operation::Selection;
    for selection in &selection_set.items {
        match selection {
            Selection::Field(field) => collect_spreads(&field.selection_set, spreads),
            Selection::FragmentSpread(spread) => spreads.push(spread.fragment_name.as_str()),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, spreads),
        }
    }
}

fn visit_fragment(
    operation_name: &str,
    fragment_name: &str,
    fragments: &HashMap<&str, FragmentEntry<'_>>,
    referenced: &mut BTreeSet<String>,
    stack: &mut Vec<String>,
    seen_cycles: &mut HashSet<BTreeSet<String>>,
    errors: &mut Vec<DocumentLoadError>,
) {
    if let Some(cycle_start) = stack.iter().position(|name| name == fragment_name) {
        let mut cycle_path = stack[cycle_start..].to_vec();
        cycle_path.push(fragment_name.to_string());

        // Rotations of the same cycle are reported once.
        let members: BTreeSet<String> = cycle_path.iter().cloned().collect();
        if seen_cycles.insert(members) {
            errors.push(DocumentLoadError::FragmentCycleDetected { cycle_path });
        }
        return;
    }

    if referenced.contains(fragment_name) {
        return;
    }

    let Some(fragment) = fragments.get(fragment_name) else {
        errors.push(DocumentLoadError::UndefinedFragmentReference {
            operation_name: operation_name.to_string(),
            undefined_fragment: fragment_name.to_string(),
        });
        return;
    };

    referenced.insert(fragment_name.to_string());
    stack.push(fragment_name.to_string());
    let mut spreads = vec![];
    collect_spreads(&fragment.def.selection_set, &mut spreads);
    for spread in spreads {
        visit_fragment(
            operation_name,
            spread,
            fragments,
            referenced,
            stack,
            seen_cycles,
            errors,
        );
    }
    stack.pop();
}

/// Depth-first search over fragment spreads that only reports cycles.
/// Undefined spreads are reported per operation by [`visit_fragment`].
fn find_fragment_cycles<'doc>(
    fragment_name: &'doc str,
    fragments: &HashMap<&'doc str, FragmentEntry<'doc>>,
    visited: &mut HashSet<&'doc str>,
    stack: &mut Vec<&'doc str>,
    seen_cycles: &mut HashSet<BTreeSet<String>>,
    errors: &mut Vec<DocumentLoadError>,
) {
    if let Some(cycle_start) = stack.iter().position(|name| *name == fragment_name) {
        let mut cycle_path: Vec<String> =
            stack[cycle_start..].iter().map(|name| name.to_string()).collect();
        cycle_path.push(fragment_name.to_string());

        let members: BTreeSet<String> = cycle_path.iter().cloned().collect();
        if seen_cycles.insert(members) {
            errors.push(DocumentLoadError::FragmentCycleDetected { cycle_path });
        }
        return;
    }

    let Some(fragment) = fragments.get(fragment_name) else {
        return;
    };
    if !visited.insert(fragment_name) {
        return;
    }

    let def: &'doc ast::operation::FragmentDefinition = fragment.def;
    stack.push(fragment_name);
    let mut spreads = vec![];
    collect_spreads(&def.selection_set, &mut spreads);
    for spread in spreads {
        find_fragment_cycles(spread, fragments, visited, stack, seen_cycles, errors);
    }
    stack.pop();
}

#[derive(Debug, Error)]
pub enum DocumentLoadError {
    #[error("Anonymous {kind} at {def_location}: every operation must be named")]
    AnonymousOperation {
        def_location: loc::FilePosition,
        kind: OperationKind,
    },

    #[error(
        "Duplicate fragment definition: '{fragment_name}' (first defined at \
        {first_def_location}, redefined at {second_def_location})"
    )]
    DuplicateFragmentDefinition {
        fragment_name: String,
        first_def_location: loc::FilePosition,
        second_def_location: loc::FilePosition,
    },

    #[error(
        "Duplicate operation name: '{operation_name}' (first defined at \
        {first_def_location}, redefined at {second_def_location})"
    )]
    DuplicateOperationName {
        operation_name: String,
        first_def_location: loc::FilePosition,
        second_def_location: loc::FilePosition,
    },

    #[error("Failed to read operation document: {0}")]
    FileReadError(file_reader::ReadContentError),

    #[error("Fragment cycle detected: {}", format_cycle_path(.cycle_path))]
    FragmentCycleDetected {
        cycle_path: Vec<String>,
    },

    #[error("Failed to parse {}: {err}", format_file_path(.file_path))]
    ParseError {
        file_path: Option<PathBuf>,
        err: String,
    },

    #[error("Operation '{operation_name}' references undefined fragment '{undefined_fragment}'")]
    UndefinedFragmentReference {
        operation_name: String,
        undefined_fragment: String,
    },
}

fn format_cycle_path(cycle: &[String]) -> String {
    cycle.join(" → ")
}

fn format_file_path(file_path: &Option<PathBuf>) -> String {
    file_path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<str>".to_string())
}
