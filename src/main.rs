use std::{process::exit, sync::Arc};

use boardco_publishing::{
    fixtures,
    release_service::ReleaseService,
    repository::{DeveloperRepository, SubmissionRepository, TranslationRepository},
};
use serde::Deserialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::{signal, sync::Notify};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct AppConfig {
    database_url: String,
    seed_fixtures: Option<bool>,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "boardco_publishing=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let submission_repository = Arc::new(SubmissionRepository::new(db_pool.clone()));
    let developer_repository = Arc::new(DeveloperRepository::new(db_pool.clone()));
    let translation_repository = Arc::new(TranslationRepository::new(db_pool.clone()));

    if app_config.seed_fixtures.unwrap_or(false) {
        if let Err(err) =
            fixtures::seed_database(&submission_repository, &developer_repository).await
        {
            error!("Could not seed the fixture dataset: {err}");
            exit(255);
        }
    }

    let shutdown_notify = Arc::new(Notify::new());

    ReleaseService::create_and_start(
        shutdown_notify.clone(),
        submission_repository.clone(),
        translation_repository.clone(),
    );

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_waiters();
            db_pool.close().await;
        }
        Err(err) => {
            error!("Failed to listen for the shutdown signal: {err}");
        }
    }
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let pool = SqlitePoolOptions::new().connect(url).await?;
    info!("Applying migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready");
    Ok(pool)
}
