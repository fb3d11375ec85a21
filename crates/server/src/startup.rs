use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::mailer::{http::HttpMailProvider, Mailer};
use service::uploads::presign::Presigner;

use crate::routes::{self, ServerAuthConfig, ServerState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: Option<&configs::ServerConfig>) -> anyhow::Result<SocketAddr> {
    let (host, port) = match cfg {
        Some(s) => (s.host.clone(), s.port),
        None => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(err = %e, "config load failed, falling back to env defaults");
            None
        }
    };

    let db = match cfg.as_ref() {
        Some(cfg) => models::db::connect_with_config(&cfg.database).await?,
        None => models::db::connect().await?,
    };

    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());

    let mailer_cfg = cfg.as_ref().map(|c| c.mailer.clone()).unwrap_or_default();
    let storage_cfg = cfg.as_ref().map(|c| c.storage.clone()).unwrap_or_default();
    if !storage_cfg.is_configured() {
        warn!("storage not configured, upload presigning disabled");
    }

    let provider = Arc::new(HttpMailProvider::from_config(&mailer_cfg));
    let mailer = Arc::new(Mailer::new(provider, mailer_cfg));
    let presigner = Arc::new(Presigner::new(storage_cfg));

    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret },
        mailer,
        presigner,
    };

    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    let addr = load_bind_addr(cfg.as_ref().map(|c| &c.server))?;
    info!(%addr, "starting server crate");
    println!("starting server crate at {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
