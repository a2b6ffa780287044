//! Servidor web Axum do gateway DLP: página interativa, API JSON e WebSocket

mod config;
mod error;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pii_core::{engines, ScanPipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter)),
        )
        .init();

    // Falha de inicialização não derruba o servidor: a página mostra o erro
    let state = match engines::shared(&args.engine_config()) {
        Ok(engines) => AppState::ready(ScanPipeline::new(engines)),
        Err(e) => {
            error!(error = %e, model = %args.model, "motores indisponíveis; interação desabilitada");
            AppState::unavailable(e.to_string())
        }
    };

    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("não foi possível escutar em {}", args.bind))?;
    info!("🛡️ Gateway DLP iniciado em http://{}", args.bind);
    axum::serve(listener, app).await.context("servidor encerrado com erro")?;
    Ok(())
}
