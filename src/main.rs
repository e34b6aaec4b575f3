//! Desktop recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;

use desktop_recorder::cli::{
    app::{run_args, run_devices, run_record, GlobalOptions, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    init_logging,
    presenter::Presenter,
};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = GlobalOptions {
        session_type: cli.session_type,
        verbose: cli.verbose,
        config: cli.config,
    };

    match cli.command {
        Commands::Record(args) => run_record(globals, args).await,
        Commands::Args(args) => run_args(globals, args).await,
        Commands::Devices { keyed, json } => run_devices(keyed, json),
        Commands::Config { action } => {
            let presenter = Presenter::new();
            let store = globals.config_store();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
    }
}
