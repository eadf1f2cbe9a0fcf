//! Server binary: configuration, adapter wiring, and the axum serve loop.

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use secrecy::ExposeSecret;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use duet_entitlements::adapters::auth::{FirebaseSessionValidator, FirebaseValidatorConfig};
use duet_entitlements::adapters::google::ServiceAccountKey;
use duet_entitlements::adapters::http::middleware::cors_middleware;
use duet_entitlements::adapters::http::{verify_router, VerifyAppState};
use duet_entitlements::adapters::store::{FirestoreConfig, FirestoreDocumentStore};
use duet_entitlements::adapters::storefront::{
    AppStoreConfig, AppStoreHttpClient, PlayStoreConfig, PlayStoreHttpClient,
};
use duet_entitlements::config::AppConfig;
use duet_entitlements::ports::{AppStoreClient, DocumentStore, PlayStoreClient, SessionValidator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    // Structured JSON logs in production, human-readable elsewhere.
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    config.validate()?;

    let session_validator: Arc<dyn SessionValidator> =
        Arc::new(FirebaseSessionValidator::new(FirebaseValidatorConfig {
            project_id: config.auth.firebase_project_id.clone(),
            jwks_url: None,
            jwks_cache_duration: Some(config.auth.jwks_cache_ttl()),
        })?);

    let store_key = ServiceAccountKey::from_json(config.store.service_account_json.expose_secret())?;
    let store: Arc<dyn DocumentStore> = Arc::new(FirestoreDocumentStore::new(
        FirestoreConfig {
            project_id: config.store.project_id.clone(),
            base_url: config.store.base_url.clone(),
        },
        store_key,
    )?);

    let app_store: Option<Arc<dyn AppStoreClient>> = match &config.app_store {
        Some(section) => {
            let client = AppStoreHttpClient::new(AppStoreConfig::new(
                section.shared_secret.expose_secret().clone(),
            ))?;
            Some(Arc::new(client) as Arc<dyn AppStoreClient>)
        }
        None => {
            tracing::info!("App Store verification not configured");
            None
        }
    };

    let play_store: Option<Arc<dyn PlayStoreClient>> = match &config.play_store {
        Some(section) => {
            let key_json = section
                .service_account_json
                .as_ref()
                .unwrap_or(&config.store.service_account_json);
            let key = ServiceAccountKey::from_json(key_json.expose_secret())?;
            let client =
                PlayStoreHttpClient::new(PlayStoreConfig::new(section.package_name.clone()), key)?;
            Some(Arc::new(client) as Arc<dyn PlayStoreClient>)
        }
        None => {
            tracing::info!("Play Store verification not configured");
            None
        }
    };

    let state = VerifyAppState {
        session_validator,
        store,
        app_store,
        play_store,
    };

    let app = verify_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cors_middleware))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        )
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
