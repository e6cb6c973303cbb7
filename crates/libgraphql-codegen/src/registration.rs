use crate::file_reader;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, RegistrationError>;

/// The directory (relative to a project root) that registration files are
/// discovered in.
pub const REGISTRATIONS_DIR: &str = "codegen-extensions";

/// Which extension implementations are registered against which contract.
///
/// Registrations come either from explicit [`register`](Self::register)
/// calls or from registration files: a file named after the contract whose
/// lines each name one implementation. `#` starts a comment and blank lines
/// are ignored:
///
/// ```text
/// # codegen-extensions/libgraphql_codegen.CompilerExtension
/// my-persisted-query-registry
/// ```
///
/// Registering the same implementation for the same contract more than once
/// only records it once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationSet {
    records: BTreeMap<String, Vec<String>>,
}

impl RegistrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Implementation names registered for `contract_name`, in registration
    /// order.
    pub fn implementations(&self, contract_name: &str) -> &[String] {
        self.records
            .get(contract_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load every registration file in `dir`. A missing directory holds no
    /// registrations.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            log::debug!("No extension registrations directory at {dir:#?}.");
            return Ok(());
        }

        let entries = std::fs::read_dir(dir)
            .map_err(|err| RegistrationError::ReadDirError {
                dir: dir.to_path_buf(),
                err,
            })?;

        let mut file_paths = vec![];
        for entry in entries {
            let entry = entry.map_err(|err| RegistrationError::ReadDirError {
                dir: dir.to_path_buf(),
                err,
            })?;
            let path = entry.path();
            if path.is_file() {
                file_paths.push(path);
            } else {
                log::trace!("Skipping non-file: {path:#?}.");
            }
        }

        // Directory iteration order is platform-dependent.
        file_paths.sort();
        for path in file_paths {
            let Some(contract_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            self.load_file(contract_name, &path)?;
        }
        Ok(())
    }

    /// Load a single registration file for `contract_name`.
    pub fn load_file(
        &mut self,
        contract_name: impl Into<String>,
        file_path: impl AsRef<Path>,
    ) -> Result<()> {
        let file_path = file_path.as_ref();
        let contract_name = contract_name.into();
        let content = file_reader::read_content(file_path)
            .map_err(RegistrationError::FileReadError)?;

        for implementation in parse_registration_file(&content, Some(file_path))? {
            log::debug!(
                "Registration file {file_path:#?} registers `{implementation}` \
                for `{contract_name}`.",
            );
            self.register(contract_name.as_str(), implementation);
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        contract_name: impl Into<String>,
        implementation: impl Into<String>,
    ) {
        let implementation = implementation.into();
        let implementations = self.records.entry(contract_name.into()).or_default();
        if !implementations.contains(&implementation) {
            implementations.push(implementation);
        }
    }
}

/// Parse the contents of one registration file into implementation names.
pub fn parse_registration_file(
    content: &str,
    file_path: Option<&Path>,
) -> Result<Vec<String>> {
    let mut implementations = vec![];
    for (idx, line) in content.lines().enumerate() {
        let line = match line.find('#') {
            Some(comment_start) => &line[..comment_start],
            None => line,
        }.trim();

        if line.is_empty() {
            continue;
        }

        if line.chars().any(char::is_whitespace) {
            return Err(RegistrationError::InvalidLine {
                file_path: file_path.map(Path::to_path_buf),
                line: line.to_string(),
                line_number: idx + 1,
            });
        }

        implementations.push(line.to_string());
    }
    Ok(implementations)
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Failed to read registration file: {0}")]
    FileReadError(file_reader::ReadContentError),

    #[error(
        "Invalid registration on line {line_number} of {file_path:?}: `{line}` \
        (expected one implementation name per line)"
    )]
    InvalidLine {
        file_path: Option<PathBuf>,
        line: String,
        line_number: usize,
    },

    #[error("Failed to read registrations directory {dir:?}: {err}")]
    ReadDirError {
        dir: PathBuf,
        err: std::io::Error,
    },
}
