//! # Erros do pipeline de detecção e anonimização
//!
//! Cada estágio tem seu próprio tipo de erro. O pipeline agrega todos em
//! [`PipelineError`], que é o que a camada web enxerga.

use std::sync::Arc;

use thiserror::Error;

/// Falha ao construir um reconhecedor.
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("padrão '{name}' inválido: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("reconhecedor '{0}' não possui padrões")]
    NoPatterns(String),
}

/// Falha de inicialização dos motores (modelo de linguagem ausente, configuração inválida).
///
/// `Clone` porque o resultado da montagem fica guardado para o processo inteiro.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("motor NLP desconhecido: '{0}'")]
    UnknownNlpEngine(String),
    #[error("modelo '{model}' não encontrado para o idioma '{language}'")]
    ModelNotFound { language: String, model: String },
    #[error("modelo '{model}' é do idioma '{model_language}', não de '{language}'")]
    ModelLanguageMismatch {
        language: String,
        model: String,
        model_language: String,
    },
    #[error("nenhum modelo configurado para o idioma '{0}'")]
    MissingLanguage(String),
    #[error("limiar de score fora do intervalo [0, 1]: {0}")]
    InvalidThreshold(f64),
    #[error("falha ao registrar reconhecedor: {0}")]
    Registry(#[source] Arc<RecognizerError>),
}

impl From<RecognizerError> for EngineError {
    fn from(e: RecognizerError) -> Self {
        EngineError::Registry(Arc::new(e))
    }
}

/// Falha durante uma chamada de `analyze`.
#[derive(Debug, Error, PartialEq)]
pub enum AnalyzerError {
    #[error("idioma '{0}' não suportado pelo analisador")]
    UnsupportedLanguage(String),
    #[error("limiar de score fora do intervalo [0, 1]: {0}")]
    InvalidThreshold(f64),
}

/// Falha durante a anonimização.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnonymizerError {
    #[error("span inválido [{start}, {end}) para texto de {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },
}

/// Erro de uma requisição ao pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("texto de entrada vazio")]
    EmptyInput,
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Anonymizer(#[from] AnonymizerError),
}
