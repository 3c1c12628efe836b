mod daemon;
mod error;

use crate::error::{ErrorKind, Result};
use chapterlink_cache::{Database, Repository};
use chapterlink_config::Config;
use chapterlink_library::{Context, NameGenerator, NamingPolicy};
use clap::Parser;
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "chapterlink", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); environment variables
    /// override anything it sets.
    #[arg(short, long, env = "CHAPTERLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Run a single maintenance and scan pass, then exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before anything reads the environment, clap included.
    let dotenv = chapterlink_config::load_dotenv();
    let cli = Cli::parse();
    let loaded = dotenv.and_then(|dotenv| Ok((dotenv, Config::load(cli.config.as_deref())?)));
    let (dotenv, config) = match loaded.or_raise(|| ErrorKind::Config) {
        Ok(loaded) => loaded,
        Err(e) => {
            init_tracing(false);
            tracing::error!(error = ?e, "refusing to start");
            return ExitCode::FAILURE;
        },
    };
    init_tracing(config.debug);
    if let Some(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded .env file");
    }

    match start(&cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "exiting");
            ExitCode::FAILURE
        },
    }
}

/// `RUST_LOG` wins over the configured debug toggle.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug,sqlx=info" } else { "info,sqlx=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn start(cli: &Cli, config: Config) -> Result<()> {
    tracing::info!(
        source = %config.source_path.display(),
        target = %config.target_path.display(),
        interval = ?config.scan_interval,
        "starting"
    );
    if config.target_inside_source() {
        tracing::warn!("target path is inside the source path and will be left out of scans");
    }
    let ctx = Arc::new(context(&config)?);
    let db = Database::connect_in(&config.database_folder).await.or_raise(|| ErrorKind::Database)?;
    let cache = Repository::from(&db);

    let outcome = if cli.once {
        daemon::once(&cache, &ctx).await;
        Ok(())
    } else {
        let token = CancellationToken::new();
        tokio::spawn(cancel_on_signal(token.clone()));
        daemon::run(cache, ctx, config.scan_interval, token).await
    };
    db.close().await;
    outcome
}

fn context(config: &Config) -> Result<Context> {
    let naming = &config.naming;
    let names = match &naming.template {
        Some(template) => template.parse::<NameGenerator>(),
        None => NameGenerator::from_policy(NamingPolicy {
            include_series: naming.include_series,
            include_volume: naming.include_volume,
            volume_first: naming.volume_first,
        }),
    }
    .or_raise(|| ErrorKind::Template)?;
    Ok(Context::new(&config.source_path, &config.target_path, names).with_ownership(config.ownership))
}

async fn cancel_on_signal(token: CancellationToken) {
    wait_for_signal().await;
    tracing::info!("shutdown requested");
    token.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            tracing::warn!(error = %e, "could not listen for SIGTERM");
            return ctrl_c().await;
        },
    };
    tokio::select! {
        () = ctrl_c() => {},
        _ = terminate.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
