use anyhow::Result;
use clap::Parser;

use runs_cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var; stdout belongs to the commands
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let status = cli.command.execute()?;
    if status != 0 {
        std::process::exit(status);
    }
    Ok(())
}
