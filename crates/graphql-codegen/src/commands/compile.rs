use crate::commands::project_dir;
use crate::output_utils;
use crate::CommandResult;
use crate::RunnableCommand;
use libgraphql_codegen::CodegenConfig;
use libgraphql_codegen::Compiler;
use libgraphql_codegen::ExtensionRegistry;
use libgraphql_codegen::SourceDocument;
use libgraphql_codegen::DEFAULT_CONFIG_FILE_NAME;
use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Debug, clap::Args)]
pub(crate) struct CompileCmd {
    #[arg(
        default_value=DEFAULT_CONFIG_FILE_NAME,
        help="Path to the project's codegen config file. Relative paths in \
             the config are resolved against the directory containing it.",
        long,
    )]
    config: PathBuf,

    #[arg(
        default_values_t=[
            "graphql".to_string(),
            "gql".to_string(),
        ],
        help="Set of file extensions to filter to when searching for files \
             within a directory.",
        long,
        value_delimiter = ',',
    )]
    graphql_file_exts: Vec<String>,

    #[arg(
        default_value="persisted-query-manifest.json",
        help="Where to write the operation manifest.",
        long,
        short='o',
    )]
    output: PathBuf,

    #[arg(
        help="Paths to one or more GraphQL files or directories containing \
             GraphQL files whose operations should be compiled.",
        name="FILE_OR_DIR_PATHS",
        required=true,
    )]
    file_or_dir_paths: Vec<PathBuf>,
}

impl CompileCmd {
    pub(crate) fn find_graphql_files(
        &self,
        errors: &mut Vec<Box<dyn Error + Send + Sync>>,
    ) -> (Vec<PathBuf>, usize) {
        let graphql_file_exts: HashSet<String> =
            self.graphql_file_exts.iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();

        log::debug!(
            "Scanning {} input paths...",
            self.file_or_dir_paths.len(),
        );
        let mut num_skipped_files: usize = 0;
        let mut file_paths = vec![];
        for path in &self.file_or_dir_paths {
            for entry in WalkDir::new(path.as_path()).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::trace!(
                            "Encountered an error while iterating recursive \
                            filesystem entities at/under {path:#?}."
                        );
                        errors.push(Box::new(e));
                        continue
                    },
                };

                let path = entry.path();
                if !entry.file_type().is_file() {
                    log::trace!("Skipping non-file: {path:#?}.");
                    continue
                }

                let matches_ext =
                    path.extension()
                        .map(|ext| graphql_file_exts.contains(&*ext.to_string_lossy()))
                        .unwrap_or(false);
                if !matches_ext {
                    log::trace!("Skipping non-graphql file: {path:#?}.");
                    num_skipped_files += 1;
                    continue
                }

                log::trace!("Found file at {path:#?}.");
                match std::fs::canonicalize(path) {
                    Ok(path) => file_paths.push(path),
                    Err(e) => errors.push(Box::new(e)),
                }
            }
        }

        // A single explicitly named file is compiled regardless of its
        // extension.
        if file_paths.is_empty()
            && self.file_or_dir_paths.len() == 1
            && let Some(first_arg_path) = self.file_or_dir_paths.first()
            && first_arg_path.is_file() {
            match std::fs::canonicalize(first_arg_path) {
                Ok(path) => {
                    log::warn!(
                        "Proceeding to compile {path:#?} even though it doesn't \
                        match any of the --graphql-file-exts ({}).",
                        graphql_file_exts.iter()
                            .map(|ext| format!("`.{ext}`"))
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                    file_paths.push(path);
                    num_skipped_files = num_skipped_files.saturating_sub(1);
                },
                Err(e) => errors.push(Box::new(e)),
            }
        }

        (file_paths, num_skipped_files)
    }
}

#[inherent::inherent]
impl RunnableCommand for CompileCmd {
    pub async fn run(self) -> CommandResult {
        let mut errors: Vec<Box<dyn Error + Send + Sync>> = vec![];

        let config = match CodegenConfig::from_file(&self.config) {
            Ok(config) => config,
            Err(e) => return CommandResult::stderr(format_args!(
                "{} Failed to load {:#?}: {e}",
                output_utils::RED_X,
                self.config,
            )),
        };
        let (options, host) =
            match config.into_compiler_parts(project_dir(&self.config), ExtensionRegistry::new()) {
                Ok(parts) => parts,
                Err(e) => return CommandResult::stderr(format_args!(
                    "{} Invalid codegen configuration: {e}",
                    output_utils::RED_X,
                )),
            };

        let (file_paths, num_skipped_files) = self.find_graphql_files(&mut errors);
        log::debug!("Found {} GraphQL files to be compiled.", file_paths.len());

        let mut documents = Vec::with_capacity(file_paths.len());
        for path in &file_paths {
            match SourceDocument::from_file(path) {
                Ok(document) => documents.push(document),
                Err(e) => errors.push(Box::new(e)),
            }
        }

        if !errors.is_empty() {
            return CommandResult::stderr(format_args!(
                "{} Errors reading GraphQL files: {errors:#?}",
                output_utils::RED_X,
            ));
        }

        // Extensions may block on external processes.
        let compiler = Compiler::new(options, host);
        let compile_result = tokio::task::spawn_blocking(move || {
            let output = compiler.compile(&documents);
            (compiler, output)
        }).await;

        let (compiler, output) = match compile_result {
            Ok((compiler, Ok(output))) => (compiler, output),
            Ok((_, Err(e))) => return CommandResult::stderr(format_args!(
                "{} Compilation failed: {e}",
                output_utils::RED_X,
            )),
            Err(e) => return CommandResult::stderr(format_args!(
                "{} Compilation aborted: {e}",
                output_utils::RED_X,
            )),
        };

        let manifest_format = compiler.options().manifest_format();
        if let Err(e) = output.operation_output.write_to(&self.output, manifest_format) {
            return CommandResult::stderr(format_args!(
                "{} {e}",
                output_utils::RED_X,
            ));
        }

        CommandResult::stdout(format_args!(
            concat!(
                "{} Compiled GraphQL operations successfully:\n",
                "  * Analyzed {} files.\n",
                "  * Skipped {} non-graphql files.\n",
                "  * Compiled {} operations.\n",
                "  * Compiler extension: {}.\n",
                "  * Wrote manifest to {}.",
            ),
            output_utils::GREEN_CHECK,
            file_paths.len(),
            num_skipped_files,
            output.operation_output.len(),
            output.extension.as_deref().unwrap_or("none"),
            self.output.display(),
        ))
    }
}
