use std::io;

use anyhow::Context;
use clap::Parser;
use sift::{execute, logging, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, sources) = cli
        .config_loader()
        .and_then(|loader| loader.load_with_sources())
        .context("failed to load configuration")?;
    logging::init(config.log_level, config.log_format);
    for source in &sources {
        log::debug!("{source}");
    }

    let output = execute(&cli, &config, io::stdin().lock())?;
    if !output.is_empty() {
        println!("{}", output.trim_end_matches('\n'));
    }
    Ok(())
}
