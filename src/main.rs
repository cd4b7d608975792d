mod authentication;
mod cli;

use cli::{RunMode, USAGE, parse_cli_mode};
use gcal_mirror::storage::config::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = match parse_cli_mode() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", USAGE);
            return Ok(());
        }
    };

    if options.mode == RunMode::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let _guard = setup_logging();

    if let Err(e) = cli::run(options).await {
        tracing::error!("gcal-mirror failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

fn setup_logging() -> WorkerGuard {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "gcal-mirror.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("gcal-mirror started");
    guard
}
