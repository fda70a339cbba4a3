use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use reorgify_core::{Config, Journal};
use std::io;
use std::process;

mod cli;
mod dissolve;
mod history;
mod migrate;
mod rename;
mod sinks;
mod undo;

use cli::{Cli, Commands};

fn main() {
    // Applies always run to completion over their planned item set; an
    // interrupt cannot cancel mid-batch, it can only be undone afterwards.
    let _ = ctrlc::set_handler(|| {
        eprintln!("\nInterrupt received; the current run completes and is journaled.");
    });

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "reorgify", &mut io::stdout());
        return;
    }

    let config = Config::load().unwrap_or_default();

    // Verify the journal is usable before any planning, so a run never
    // fails after mutations have begun.
    let journal = match open_journal(cli.journal_dir.as_deref(), &config) {
        Ok(journal) => journal,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    };

    let output = cli.output.into();
    let result = match cli.command {
        Commands::Dissolve {
            path,
            nested,
            media,
            archive,
            direct,
            exclude,
            threshold,
            no_similarity,
            max_concurrency,
            conflicts,
        } => dissolve::handle_dissolve(
            path,
            nested,
            media,
            archive,
            direct,
            &exclude,
            threshold,
            no_similarity,
            max_concurrency,
            &conflicts,
            cli.preview,
            output,
            cli.quiet,
            &config,
            &journal,
        ),
        Commands::Migrate {
            sources,
            target,
            mode,
            action,
            exclude,
            max_concurrency,
            conflicts,
        } => migrate::handle_migrate(
            sources,
            target,
            mode,
            action,
            &exclude,
            max_concurrency,
            &conflicts,
            cli.preview,
            output,
            cli.quiet,
            &config,
            &journal,
        ),
        Commands::Rename {
            paths,
            template,
            metadata,
            max_description_len,
            max_name_len,
            exclude,
            max_concurrency,
            conflicts,
        } => rename::handle_rename(
            paths,
            &template,
            metadata.as_deref(),
            max_description_len,
            max_name_len,
            &exclude,
            max_concurrency,
            &conflicts,
            cli.preview,
            output,
            cli.quiet,
            &config,
            &journal,
        ),
        Commands::Undo { id } => undo::handle_undo(id.as_deref(), output, cli.quiet, &journal),
        Commands::History { limit } => history::handle_history(limit, output, &journal),
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        },
    }
}

fn open_journal(override_dir: Option<&std::path::Path>, config: &Config) -> Result<Journal> {
    match override_dir.or(config.defaults.journal_dir.as_deref()) {
        Some(dir) => Journal::open(dir)
            .with_context(|| format!("journal directory is not usable: {}", dir.display())),
        None => Journal::open_default().context("journal directory is not usable"),
    }
}
