//! Erros das rotas HTTP e seu mapeamento para status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pii_core::PipelineError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("motor no disponible: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("la tarea de análisis fue interrumpida: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("error al renderizar la página: {0}")]
    Template(#[from] askama::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(PipelineError::EmptyInput) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) | ApiError::Join(_) | ApiError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "falha na requisição");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
