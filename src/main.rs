mod app;
mod cli;
mod config;
mod diff;
mod error;
mod github;
mod logging;
mod report;
mod selection;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    logging::init_logging();
    let args = cli::Args::parse();

    // Handle shell completion generation
    if let Some(shell) = args.completions {
        cli::generate_completions(shell);
        return Ok(());
    }

    let mut config = config::load();
    config.apply_args(&args);
    log::debug!("using {:?}", config);

    let mut app = app::App::new(config)?;
    let outcome = app.run(&args)?;
    log::debug!("run finished: {:?}", outcome);

    Ok(())
}
