//! Cultura Quiz Back binary entrypoint wiring the REST API, question sources and score stores.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cultura_quiz_back::{
    clients::{
        translate::{GoogleTranslateClient, PassthroughTranslator, Translator},
        trivia::TriviaApiClient,
    },
    config::AppConfig,
    dao::score_store::file::FileScoreStore,
    routes,
    services::session_sweeper,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    let question_source = Arc::new(
        TriviaApiClient::new(&config.trivia_url, config.request_timeout)
            .context("building trivia client")?,
    );
    let translator: Arc<dyn Translator> = if config.translation_enabled {
        Arc::new(
            GoogleTranslateClient::new(
                &config.translate_url,
                &config.target_language,
                config.request_timeout,
            )
            .context("building translation client")?,
        )
    } else {
        info!("translation disabled; serving questions untranslated");
        Arc::new(PassthroughTranslator)
    };
    let fallback_store = Arc::new(FileScoreStore::new(config.score_file.clone()));

    let app_state = AppState::new(config, question_source, translator, fallback_store);

    spawn_score_store_supervisor(&app_state);
    tokio::spawn(session_sweeper::run(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Start supervising CouchDB when it is configured; otherwise scores stay in the local file.
#[cfg(feature = "couch-store")]
fn spawn_score_store_supervisor(state: &SharedState) {
    use cultura_quiz_back::{
        dao::{
            score_store::{
                ScoreStore,
                couchdb::{CouchConfig, CouchScoreStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let couch_config = match CouchConfig::from_env() {
        Ok(config) => config.with_timeout(state.config().request_timeout),
        Err(err) => {
            info!(reason = %err, "CouchDB not configured; using the local score file");
            return;
        }
    };

    state.expect_primary_store();
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let config = couch_config.clone();
        async move {
            let store = CouchScoreStore::connect(config)
                .await
                .map_err(StorageError::from)?;
            Ok::<Arc<dyn ScoreStore>, StorageError>(Arc::new(store))
        }
    }));
}

#[cfg(not(feature = "couch-store"))]
fn spawn_score_store_supervisor(_state: &SharedState) {
    info!("built without a remote score store; using the local score file");
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
