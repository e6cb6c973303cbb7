use crate::output_utils;
use crate::CommandResult;
use crate::RunnableCommand;
use libgraphql_codegen::BuildConstants;
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
pub(crate) struct ConstantsCmd {
    #[arg(
        help="Where to write the generated Rust source. Printed to stdout \
             when omitted.",
        long,
        short='o',
    )]
    output: Option<PathBuf>,

    #[arg(
        help="Constants to generate, as `NAME=VALUE` pairs.",
        name="NAME=VALUE",
    )]
    assignments: Vec<String>,
}

#[inherent::inherent]
impl RunnableCommand for ConstantsCmd {
    pub async fn run(self) -> CommandResult {
        let mut constants = BuildConstants::new();
        for assignment in &self.assignments {
            if let Err(e) = constants.add_assignment(assignment) {
                return CommandResult::stderr(format_args!(
                    "{} {e}",
                    output_utils::RED_X,
                ));
            }
        }

        let Some(output) = &self.output else {
            return CommandResult::stdout(format_args!("{}", constants.render().trim_end()));
        };

        match constants.write_to(output) {
            Ok(()) => CommandResult::stdout(format_args!(
                "{} Wrote {} constants to {}.",
                output_utils::GREEN_CHECK,
                constants.len(),
                output.display(),
            )),
            Err(e) => CommandResult::stderr(format_args!(
                "{} {e}",
                output_utils::RED_X,
            )),
        }
    }
}
