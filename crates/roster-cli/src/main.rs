//! Roster CLI: the `roster` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());
    support::init_tracing(&config.log.filter);

    match cli.command {
        Commands::Demo { script, initial } => commands::demo::run(
            commands::demo::Args {
                script,
                initial,
                identity: cli.identity,
            },
            &config,
        ),

        Commands::Dispatch { file } => commands::dispatch::run(file),

        Commands::Render { words } => commands::render::run(words),

        Commands::Actions { json } => commands::actions::run(json),

        Commands::Check { json } => commands::check::run(json),
    }
}
