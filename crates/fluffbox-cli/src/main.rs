//! fluffbox - side-by-side runtime versions CLI

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fluffbox_cli::ui::Output;
use fluffbox_cli::{Cli, Commands, build_manager, cmd, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        cmd::completions::completions(shell);
        return Ok(());
    }

    let output = Arc::new(Output::new(cli.quiet));
    let config = load_config(cli.home, cli.timeout)?;
    let manager = build_manager(&config, output.clone())?;

    match cli.command {
        Commands::Available {
            kind,
            lts,
            limit,
            json,
        } => cmd::available::available(&manager, kind, lts, limit, json).await,
        Commands::List { kind, json } => cmd::list::list(&manager, kind, json),
        Commands::Check { kind } => cmd::check::check(&manager, &output, kind).await,
        Commands::Install { kind, version } => {
            cmd::install::install(&manager, &output, kind, &version).await
        }
        Commands::Use { kind, version } => {
            cmd::r#use::use_version(&manager, &output, kind, &version).await
        }
        Commands::Remove { kind, version, yes } => {
            cmd::remove::remove(&manager, &output, kind, &version, yes).await
        }
        Commands::Clear { kind, yes } => cmd::clear::clear(&manager, &output, kind, yes).await,
        Commands::Run {
            kind,
            program,
            args,
        } => cmd::run::run(&manager, kind, &program, &args).await,
        Commands::Completions { .. } => Ok(()),
    }
}
