use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

use gcal_mirror::{
    storage::config::Config,
    sync::{google_auth::GoogleAuthenticator, sync_engine::sync_google_calendars},
};

use crate::authentication::check_or_setup_auth;

pub const USAGE: &str =
    "Usage: gcal-mirror [--once | --watch] [--dry-run] [--config <path>] [--auth]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Watch,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub mode: RunMode,
    pub dry_run: bool,
    pub force_auth: bool,
    pub config_path: Option<PathBuf>,
}

pub fn parse_cli_mode() -> Result<CliOptions, String> {
    parse_args(env::args().skip(1))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        mode: RunMode::Once,
        dry_run: false,
        force_auth: false,
        config_path: None,
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => options.mode = RunMode::Once,
            "--watch" => options.mode = RunMode::Watch,
            "--dry-run" => options.dry_run = true,
            "--auth" => options.force_auth = true,
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => options.mode = RunMode::Help,
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(options)
}

fn load_config(options: &CliOptions) -> anyhow::Result<Config> {
    let config = match &options.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_create().context("Failed to load config")?,
    };

    if let Err(e) = config.validate() {
        let shown = options
            .config_path
            .clone()
            .unwrap_or_else(Config::config_path);
        println!("Configuration incomplete. Please edit the config file at:");
        println!("{}", shown.display());
        println!("\nYou need to set calendars.source to the calendar to copy from.");
        return Err(e.into());
    }

    Ok(config)
}

pub async fn run(options: CliOptions) -> anyhow::Result<()> {
    let config = load_config(&options)?;
    let mut auth = check_or_setup_auth(&config, options.force_auth).await?;

    match options.mode {
        RunMode::Once | RunMode::Help => run_pass(&config, &mut auth, options.dry_run).await,
        RunMode::Watch => run_watch(&config, &mut auth, options.dry_run).await,
    }
}

async fn run_pass(
    config: &Config,
    auth: &mut GoogleAuthenticator,
    dry_run: bool,
) -> anyhow::Result<()> {
    let report = sync_google_calendars(config, auth, dry_run)
        .await
        .context("Sync pass failed")?;
    println!("{}", report);
    Ok(())
}

/// Passes run back to back on the configured interval; a failed pass is
/// logged and the next one tries again.
async fn run_watch(
    config: &Config,
    auth: &mut GoogleAuthenticator,
    dry_run: bool,
) -> anyhow::Result<()> {
    let minutes = u64::from(config.sync.interval_minutes.max(1));
    let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!("Watching {} every {} minute(s)", config.calendars.source, minutes);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = run_pass(config, auth, dry_run).await {
                    eprintln!("{:#}", e);
                    tracing::error!("{:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
