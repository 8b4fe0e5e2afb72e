use clap::Parser;
use genweave::{CliArgs, LoggingConfig, RunConfig, init_logging, run_generation};

fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = RunConfig::from_args(cli)?;

    run_generation(config)?;
    Ok(())
}
