use crate::commands::project_dir;
use crate::output_utils;
use crate::CommandResult;
use crate::RunnableCommand;
use libgraphql_codegen::CodegenConfig;
use libgraphql_codegen::ExtensionRegistry;
use libgraphql_codegen::PluginHost;
use libgraphql_codegen::DEFAULT_CONFIG_FILE_NAME;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub(crate) struct ExtensionsCmd {
    #[arg(
        default_value=DEFAULT_CONFIG_FILE_NAME,
        help="Path to the project's codegen config file.",
        long,
    )]
    pub(crate) config: PathBuf,
}

impl ExtensionsCmd {
    pub(crate) fn describe(&self) -> CommandResult {
        let parts =
            CodegenConfig::from_file(&self.config)
                .and_then(|config| config.into_compiler_parts(
                    project_dir(&self.config),
                    ExtensionRegistry::new(),
                ));
        let (options, host) = match parts {
            Ok(parts) => parts,
            Err(e) => return CommandResult::stderr(format_args!(
                "{} Invalid codegen configuration in {:#?}: {e}",
                output_utils::RED_X,
                self.config,
            )),
        };

        let report = format_registrations(&host);
        let contract_name = options.extension_contract();
        let implementation = match host.registered_implementation(contract_name) {
            Ok(implementation) => implementation,
            Err(e) => return CommandResult::stderr(format_args!(
                "{report}{} {e}",
                output_utils::RED_X,
            )),
        };
        if let Err(e) = options.validate(implementation) {
            return CommandResult::stderr(format_args!(
                "{report}{} {e}",
                output_utils::RED_X,
            ));
        }

        match host.load_extension(contract_name) {
            Ok(Some(extension)) => CommandResult::stdout(format_args!(
                "{report}{} `{contract_name}` resolves to `{}` (implementation `{}`).",
                output_utils::GREEN_CHECK,
                extension.name(),
                extension.implementation(),
            )),
            Ok(None) => CommandResult::stdout(format_args!(
                "{report}{} No extension registered for `{contract_name}`; \
                the built-in generators will be used.",
                output_utils::GREEN_CHECK,
            )),
            Err(e) => CommandResult::stderr(format_args!(
                "{report}{} {e}",
                output_utils::RED_X,
            )),
        }
    }
}

#[inherent::inherent]
impl RunnableCommand for ExtensionsCmd {
    pub async fn run(self) -> CommandResult {
        self.describe()
    }
}

fn format_registrations(host: &PluginHost) -> String {
    let known: Vec<String> =
        host.registry().implementation_names()
            .map(|implementation| format!("  * {implementation}\n"))
            .collect();
    let registrations: Vec<String> =
        host.registrations().contract_names()
            .map(|contract_name| format!(
                "  * {contract_name}: {}\n",
                host.registrations().implementations(contract_name).join(", "),
            ))
            .collect();

    format!(
        "Known implementations:\n{}Registrations:\n{}",
        format_list(&known),
        format_list(&registrations),
    )
}

fn format_list(lines: &[String]) -> String {
    if lines.is_empty() {
        "  (none)\n".to_string()
    } else {
        lines.concat()
    }
}
