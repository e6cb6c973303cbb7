use crate::commands;

#[derive(clap::Parser, Debug)]
#[command(name = "graphql-codegen", version, arg_required_else_help = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) cmd: commands::CommandEnum,

    #[arg(
        global=true,
        help="Enable verbose output.",
        long,
        short='v',
    )]
    pub verbose: bool,
}
