use std::sync::Arc;

use clap::Parser;
use langcap_core::WordStore;
use langcap_provider::HttpProviderFactory;
use tokio::signal;

mod cli;
mod controller;
mod events;
mod io;
mod logging;
mod profile;
mod state;
mod status;
mod ui;

use crate::cli::Cli;
use crate::controller::AppController;
use crate::logging::{LogConfig, init_logging};
use crate::profile::ProfileLocation;
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run());

    // The stdin reader may still be parked in a blocking read; don't wait on it
    runtime.shutdown_background();
    result
}

async fn run() -> anyhow::Result<()> {
    // A missing .env is fine
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&LogConfig::from_cli(&cli))?;
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    let data_dir = profile::data_root(cli.data_dir.clone())?;
    profile::init_user_config(&data_dir)?;

    let name = match &cli.create_profile {
        Some(name) => {
            profile::add_profile_from_default(&data_dir, name)?;
            name.clone()
        }
        None => cli.profile.clone(),
    };
    let location = ProfileLocation {
        data_dir: data_dir.clone(),
        name,
    };
    let mut config = location.load()?;
    config.apply_env()?;
    config.validate()?;
    tracing::info!(
        "Profile {} loaded: {} provider, {} -> {}",
        location.name,
        config.dictionary.provider,
        config.capture.source_language,
        config.capture.target_language
    );

    let store = Arc::new(WordStore::open(config.storage.store_path(&data_dir))?);
    let providers = Arc::new(HttpProviderFactory::new());
    let state = Arc::new(AppState::new(config, store, providers, Some(location)));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {:#}", e),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task failed during shutdown: {:#}", e),
            Err(e) => tracing::error!("Task panicked during shutdown: {e}"),
        }
    }

    Ok(())
}
