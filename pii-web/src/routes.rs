//! Rotas do gateway: página, análise JSON, WebSocket e auxiliares.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use pii_core::{demo::demo_texts, PipelineError, ScanEvent, ScanPipeline, ScanReport};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Estado compartilhado: o pipeline, ou a mensagem de falha da inicialização.
pub struct AppState {
    pipeline: Result<ScanPipeline, String>,
}

impl AppState {
    pub fn ready(pipeline: ScanPipeline) -> Self {
        Self {
            pipeline: Ok(pipeline),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            pipeline: Err(message.into()),
        }
    }

    fn pipeline(&self) -> Result<&ScanPipeline, ApiError> {
        self.pipeline
            .as_ref()
            .map_err(|message| ApiError::Unavailable(message.clone()))
    }
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

struct DemoView {
    title: &'static str,
    text: &'static str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    setup_ok: bool,
    setup_error: String,
    language: String,
    default_text: &'static str,
    demos: Vec<DemoView>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Página principal; sem motores, os controles saem desabilitados.
async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let demos: Vec<DemoView> = demo_texts()
        .into_iter()
        .map(|(title, text)| DemoView { title, text })
        .collect();
    let (setup_ok, setup_error, language) = match &state.pipeline {
        Ok(pipeline) => (true, String::new(), pipeline.language().to_string()),
        Err(message) => (false, message.clone(), String::new()),
    };

    let page = IndexTemplate {
        setup_ok,
        setup_error,
        language,
        default_text: demos.first().map(|d| d.text).unwrap_or_default(),
        demos,
    };
    Ok(Html(page.render()?))
}

/// Análise via HTTP POST (sem streaming).
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ScanReport>, ApiError> {
    let pipeline = state.pipeline()?.clone();
    if req.text.trim().is_empty() {
        return Err(PipelineError::EmptyInput.into());
    }

    // O pipeline é síncrono (Rayon por dentro): fora do runtime async
    let report = tokio::task::spawn_blocking(move || pipeline.scan(&req.text)).await??;
    Ok(Json(report))
}

async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(title, text)| {
            serde_json::json!({
                "title": title,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = match &state.pipeline {
        Ok(pipeline) => serde_json::json!({
            "status": "ok",
            "language": pipeline.language(),
            "entities": pipeline.engines().analyzer.supported_entities(pipeline.language()),
        }),
        Err(message) => serde_json::json!({
            "status": "unavailable",
            "error": message,
        }),
    };
    Json(body)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Mensagem do cliente: JSON `{text}` ou texto puro.
fn parse_ws_text(raw: &str) -> String {
    match serde_json::from_str::<AnalyzeRequest>(raw) {
        Ok(req) => req.text,
        Err(_) => raw.to_string(),
    }
}

/// Eventos de uma mensagem do WebSocket; mensagem em branco não gera nenhum.
async fn events_for_message(state: &AppState, raw: &str) -> Vec<ScanEvent> {
    let text = parse_ws_text(raw);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let pipeline = match state.pipeline() {
        Ok(pipeline) => pipeline.clone(),
        Err(e) => {
            return vec![ScanEvent::Error {
                message: e.to_string(),
            }]
        }
    };

    debug!(chars = text.chars().count(), "analisando via WebSocket");
    let (tx, rx) = std::sync::mpsc::channel::<ScanEvent>();
    let handle = tokio::task::spawn_blocking(move || {
        pipeline.scan_streaming(&text, tx);
    });
    match handle.await {
        Ok(()) => rx.try_iter().collect(),
        Err(e) => vec![ScanEvent::Error {
            message: e.to_string(),
        }],
    }
}

/// Recebe textos, executa o pipeline e devolve os eventos, um por mensagem.
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                for event in events_for_message(&state, &raw).await {
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            if socket.send(Message::Text(json)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!(error = %e, "evento não serializável"),
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
