use clap::Parser;
use std::process::ExitCode;
use x402_proxy_gen::cli::{run_cli, Cli};
use x402_proxy_gen::logging::{init_logging_with_config, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging_with_config(&LogConfig::from_env()) {
        eprintln!("warning: {err:#}");
    }

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
