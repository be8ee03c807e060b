use clap::Parser;
use env_logger::{Builder, Env};
use jigsaw_cutter::{run, Cli};
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(_) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
