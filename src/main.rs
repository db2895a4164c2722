use std::sync::Arc;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weeblist::auth::key_manager::{KeyManager, KeyPolicy};
use weeblist::auth::{AuthProvider, GoTrueAuth, LocalKeyAuth};
use weeblist::config::{Backend, Config};
use weeblist::state::AppState;
use weeblist::store::{PostgrestStore, RemoteStore, SqliteStore};
use weeblist::{app, client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let mut sqlite = None;
    let (store, auth): (Arc<dyn RemoteStore>, Arc<dyn AuthProvider>) = match &config.backend {
        Backend::Supabase { url, anon_key } => {
            info!("Using hosted backend at {}", url);
            let http = client::create_client()?;
            (
                Arc::new(PostgrestStore::new(http.clone(), url, anon_key)),
                Arc::new(GoTrueAuth::new(http, url, anon_key)),
            )
        }
        Backend::Local {
            database_url,
            key_path,
            key_warn_days,
            key_rotate_days,
        } => {
            info!("Using local backend at {}", database_url);
            let store = SqliteStore::connect(database_url).await?;
            let policy = KeyPolicy {
                warn_after_days: *key_warn_days,
                rotate_after_days: *key_rotate_days,
            };
            let keys = Arc::new(KeyManager::open(key_path, policy)?);
            sqlite = Some(store.clone());
            (Arc::new(store), Arc::new(LocalKeyAuth::new(keys)))
        }
    };

    let bind = config.bind.clone();
    let state = AppState {
        store,
        auth,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = sqlite {
        store.close().await;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
