use clap::Parser;
use magic_cli::CliFailure;
use magic_cli::cli_args::Cli;
use magic_core::{LoggingDestination, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let destination = if cli.connection.verbose {
        LoggingDestination::FileAndStderr
    } else {
        LoggingDestination::FileOnly
    };
    if let Err(err) = init_logging(destination, "warn") {
        eprintln!("Warning: logging disabled: {err}");
    }

    match magic_cli::run(cli).await {
        Ok(()) => {}
        Err(CliFailure::Reported) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
