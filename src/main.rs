//! CLI entry point for wave function collapse pixel synthesis

use clap::Parser;
use pixelwave::io::cli::{Cli, FileProcessor};
use pixelwave::io::error::computation_error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> pixelwave::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| computation_error("logging setup", &e))?;

    let mut processor = FileProcessor::new(cli);
    processor.process()
}
