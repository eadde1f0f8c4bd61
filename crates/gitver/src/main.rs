//! gitver CLI
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gitver::{Cli, commands};
use gitver_core::commit::CommitError;
use gitver_core::config::ConfigLoader;
use gitver_core::paths;
use owo_colors::OwoColorize;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.color.apply();

    let root = paths::resolve_dir(Some(cli.dir.as_deref().unwrap_or(".")))
        .context("invalid project directory")?;

    let mut loader = ConfigLoader::new().with_project_search(&root);
    if let Some(ref config_path) = cli.config {
        let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter =
        observability::env_filter(cli.quiet, cli.verbose, cli.log_level, config.log_level);
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging")?;

    debug!(
        part = %cli.part,
        project = ?cli.project,
        %root,
        dry_run = cli.dry_run,
        json = cli.json,
        "CLI initialized"
    );

    match commands::run(&cli, &config, &root) {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            if let Some(abort @ CommitError::UserAbort(_)) = err.downcast_ref::<CommitError>() {
                eprintln!("{} {abort}", "Aborted:".yellow().bold());
                return Ok(ExitCode::FAILURE);
            }
            tracing::error!(error = %err, "fatal error");
            Err(err)
        }
    }
}
