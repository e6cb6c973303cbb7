use crate::OperationDescriptor;
use inherent::inherent;
use serde::Deserialize;
use serde::Serialize;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Where the generated artifact for one operation goes and what it is called.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LayoutDecision {
    pub class_name: String,
    pub file_name: String,
    pub package_name: String,
}
impl LayoutDecision {
    /// Names of the fields that are empty (or only whitespace).
    pub(crate) fn empty_fields(&self) -> Vec<&'static str> {
        [
            ("class_name", &self.class_name),
            ("file_name", &self.file_name),
            ("package_name", &self.package_name),
        ].into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect()
    }
}

/// Chooses the package a generated artifact is placed in.
pub trait PackageNameGenerator: Send + Sync {
    /// Identifies the generator in logs and configuration errors.
    fn name(&self) -> &str;

    fn package_name(&self, descriptor: &OperationDescriptor) -> String;
}

/// Places every artifact in one fixed package.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatPackageName(pub String);

#[inherent]
impl PackageNameGenerator for FlatPackageName {
    pub fn name(&self) -> &str {
        "flat"
    }

    pub fn package_name(&self, _descriptor: &OperationDescriptor) -> String {
        self.0.to_owned()
    }
}

/// Derives the package from the directory of the document that defines the
/// operation, relative to `root_dir`, appended to `root_package`.
///
/// Operations loaded from strings, or from files outside of `root_dir`, land
/// in `root_package`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilePathPackageName {
    pub root_dir: PathBuf,
    pub root_package: String,
}

#[inherent]
impl PackageNameGenerator for FilePathPackageName {
    pub fn name(&self) -> &str {
        "file-path"
    }

    pub fn package_name(&self, descriptor: &OperationDescriptor) -> String {
        let relative_dir =
            descriptor.file_path()
                .and_then(|path| path.parent())
                .and_then(|dir| self.relative_dir(dir));

        let mut segments: Vec<String> =
            self.root_package
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        if let Some(relative_dir) = relative_dir {
            segments.extend(
                relative_dir.components()
                    .filter_map(|c| match c {
                        Component::Normal(segment) => Some(segment.to_string_lossy().replace('-', "_")),
                        _ => None,
                    }),
            );
        }
        segments.join(".")
    }
}
impl FilePathPackageName {
    /// `dir` relative to `root_dir`. Relative and canonical spellings of the
    /// same directory are treated as equal.
    fn relative_dir(&self, dir: &Path) -> Option<PathBuf> {
        if let Ok(relative_dir) = dir.strip_prefix(&self.root_dir) {
            return Some(relative_dir.to_path_buf());
        }
        let dir = std::fs::canonicalize(dir).ok()?;
        let root_dir = std::fs::canonicalize(&self.root_dir).ok()?;
        dir.strip_prefix(root_dir).ok().map(Path::to_path_buf)
    }
}

/// The layout used when no compiler extension provides one.
#[derive(Clone, Copy)]
pub struct DefaultLayout<'a> {
    package_name_generator: &'a dyn PackageNameGenerator,
}
impl<'a> DefaultLayout<'a> {
    pub fn new(package_name_generator: &'a dyn PackageNameGenerator) -> Self {
        Self {
            package_name_generator,
        }
    }

    /// `GetUser` (query) -> `GetUserQuery` in `get_user_query.rs`.
    pub fn resolve_layout(&self, descriptor: &OperationDescriptor) -> LayoutDecision {
        let class_name = class_name(descriptor);
        LayoutDecision {
            file_name: format!("{}.rs", snake_case(&class_name)),
            class_name,
            package_name: self.package_name_generator.package_name(descriptor),
        }
    }
}
impl std::fmt::Debug for DefaultLayout<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultLayout")
            .field("package_name_generator", &self.package_name_generator.name())
            .finish()
    }
}

fn class_name(descriptor: &OperationDescriptor) -> String {
    let base = pascal_case(descriptor.name());
    let suffix = descriptor.kind().class_name_suffix();
    if base.ends_with(suffix) {
        base
    } else {
        format!("{base}{suffix}")
    }
}

pub(crate) fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

pub(crate) fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
