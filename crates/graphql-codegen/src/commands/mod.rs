mod compile;
mod constants;
mod extensions;

use crate::CommandResult;
pub(crate) use compile::CompileCmd;
use constants::ConstantsCmd;
pub(crate) use extensions::ExtensionsCmd;

#[derive(Debug, clap::Parser)]
#[command(name = "graphql-codegen")]
pub(crate) enum CommandEnum {
    /// Compile GraphQL operations into a persisted-query manifest.
    Compile(Box<CompileCmd>),

    /// Render `NAME=VALUE` pairs into a Rust source file of constants.
    Constants(Box<ConstantsCmd>),

    /// Show the compiler extensions a project registers.
    Extensions(Box<ExtensionsCmd>),
}
impl CommandEnum {
    pub(crate) async fn run(self) -> CommandResult {
        match self {
            Self::Compile(cmd) => cmd.run().await,
            Self::Constants(cmd) => cmd.run().await,
            Self::Extensions(cmd) => cmd.run().await,
        }
    }
}

/// The directory relative paths in a config file are resolved against.
pub(crate) fn project_dir(config_path: &std::path::Path) -> std::path::PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    }
}
