use indexmap::IndexMap;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, BuildConstantsError>;

/// Renders a Rust source file of `&str` constants.
///
/// Extensions are instantiated without arguments, so anything one needs to
/// know at build time (an endpoint, an API key name, ...) has to be compiled
/// into it. `BuildConstants` is the code-generation step that produces those
/// constants ahead of compiling the extension.
///
/// # Example
///
/// ```
/// use libgraphql_codegen::BuildConstants;
///
/// let mut constants = BuildConstants::new();
/// constants.add("REGISTRY_URL", "https://registry.example.com").unwrap();
///
/// let source = constants.render();
/// assert!(source.contains(
///     r#"pub const REGISTRY_URL: &str = "https://registry.example.com";"#
/// ));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildConstants {
    constants: IndexMap<String, String>,
}

impl BuildConstants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if !is_constant_name(&name) {
            return Err(BuildConstantsError::InvalidName(name));
        }
        if self.constants.contains_key(&name) {
            return Err(BuildConstantsError::DuplicateName(name));
        }
        self.constants.insert(name, value.into());
        Ok(self)
    }

    /// Parse a `NAME=VALUE` pair and add it.
    pub fn add_assignment(&mut self, assignment: &str) -> Result<&mut Self> {
        let Some((name, value)) = assignment.split_once('=') else {
            return Err(BuildConstantsError::InvalidAssignment(assignment.to_string()));
        };
        self.add(name.trim(), value)
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("// @generated by graphql-codegen. Do not edit.\n");
        if !self.constants.is_empty() {
            out.push('\n');
        }
        for (name, value) in &self.constants {
            out.push_str(&format!("pub const {name}: &str = {value:?};\n"));
        }
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render())
            .map_err(|err| BuildConstantsError::Write {
                err,
                path: path.to_path_buf(),
            })
    }
}

fn is_constant_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_uppercase() || (first == '_' && name.len() > 1))
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[derive(Debug, Error)]
pub enum BuildConstantsError {
    #[error("Constant `{0}` is defined more than once")]
    DuplicateName(String),

    #[error("Expected `NAME=VALUE`, got `{0}`")]
    InvalidAssignment(String),

    #[error("`{0}` is not a valid constant name (expected SCREAMING_SNAKE_CASE)")]
    InvalidName(String),

    #[error("Failed to write constants to {path:?}: {err}")]
    Write {
        err: std::io::Error,
        path: PathBuf,
    },
}
