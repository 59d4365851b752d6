use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::crm::{LeadRepository, LeadSquaredClient};
use service::sheet::{AppsScriptLog, ResponseLog};
use service::survey::SurveyService;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Shared outbound client; timeouts come from `[http]`.
pub fn build_http_client(cfg: &AppConfig) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(cfg.http.connect_timeout())
        .timeout(cfg.http.request_timeout())
        .user_agent(concat!("survey-relay/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Wire the survey service from config. Missing credentials or URL disable that collaborator.
pub fn build_state(cfg: &AppConfig, http: reqwest::Client) -> AppState {
    let leads: Option<Arc<dyn LeadRepository>> = match cfg.crm.credentials() {
        Some((access_key, secret_key)) => Some(Arc::new(LeadSquaredClient::new(
            http.clone(),
            &cfg.crm.base_url,
            access_key,
            secret_key,
        ))),
        None => {
            warn!(event = "crm_disabled", "LeadSquared access/secret key not set; CRM calls skipped");
            None
        }
    };

    let responses: Option<Arc<dyn ResponseLog>> = match cfg.sheet.webapp_url.as_deref() {
        Some(url) => Some(Arc::new(AppsScriptLog::new(http, url))),
        None => {
            warn!(event = "sheet_disabled", "sheet web-app URL not set; sheet logging skipped");
            None
        }
    };

    AppState { survey: SurveyService::new(leads, responses, cfg.crm.owner_id.clone()) }
}

pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let http = build_http_client(cfg)?;
    let state = build_state(cfg, http);
    Ok(routes::build_router(state, &cfg.server.public_dir, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutdown only by process kill");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_public_dir(&cfg.server.public_dir).await;

    let app = build_app(&cfg)?;

    let addr = bind_addr(&cfg)?;
    info!(
        %addr,
        public_dir = %cfg.server.public_dir,
        crm_base_url = %cfg.crm.base_url,
        "starting survey relay"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
