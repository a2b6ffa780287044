//! # Pipeline de requisição: detectar, anonimizar, decidir
//!
//! Para cada texto submetido:
//!
//! 1. Rejeita entrada vazia antes de tocar nos motores.
//! 2. Chama o analisador no idioma fixo do pipeline.
//! 3. Chama o anonimizador com os resultados.
//! 4. Classifica: `BLOCKED` se houve ao menos uma entidade, `SAFE` caso contrário.
//!
//! Como no modo streaming do servidor, cada passo também pode ser emitido
//! como [`ScanEvent`] por um canal `mpsc`, para que a UI mostre o progresso.
//! Erros de uma requisição voltam como [`PipelineError`]; o processo nunca cai.

use std::sync::{mpsc, Arc};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::anonymizer::{EngineResult, OperatorResult};
use crate::engines::Engines;
use crate::entity::{detected_types, EntityMatch, NATIONAL_ID, PHONE_NUMBER};
use crate::error::PipelineError;

/// Decisão do gateway para um texto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Blocked,
    Safe,
}

impl Verdict {
    pub fn from_results(results: &[EntityMatch]) -> Self {
        if results.is_empty() {
            Verdict::Safe
        } else {
            Verdict::Blocked
        }
    }
}

/// Aviso específico mostrado pela UI para certos tipos de entidade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub entity_type: String,
    pub message: String,
    pub icon: String,
}

/// Avisos para os tipos detectados (DNI e telefone).
pub fn notices_for(types: &[String]) -> Vec<Notice> {
    let mut notices = Vec::new();
    if types.iter().any(|t| t == NATIONAL_ID) {
        notices.push(Notice {
            entity_type: NATIONAL_ID.to_string(),
            message: "Documento Nacional de Identidad detectado".to_string(),
            icon: "🚨".to_string(),
        });
    }
    if types.iter().any(|t| t == PHONE_NUMBER) {
        notices.push(Notice {
            entity_type: PHONE_NUMBER.to_string(),
            message: "Número de teléfono detectado".to_string(),
            icon: "📞".to_string(),
        });
    }
    notices
}

/// Resultado completo de uma requisição.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub verdict: Verdict,
    /// Tipos detectados, sem repetição e ordenados.
    pub detected_types: Vec<String>,
    /// Resultados brutos do analisador (visão técnica JSON).
    pub results: Vec<EntityMatch>,
    pub sanitized: EngineResult,
    pub notices: Vec<Notice>,
    pub processing_ms: u64,
}

/// Eventos emitidos durante uma requisição em modo streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ScanEvent {
    /// Análise concluída.
    Analyzed { results: Vec<EntityMatch> },
    /// Texto sanitizado pronto.
    Anonymized { text: String, items: Vec<OperatorResult> },
    /// Decisão tomada.
    Verdict {
        verdict: Verdict,
        detected_types: Vec<String>,
        notices: Vec<Notice>,
    },
    Done { report: ScanReport },
    Error { message: String },
}

/// Pipeline de uma requisição sobre motores compartilhados.
#[derive(Clone)]
pub struct ScanPipeline {
    engines: Arc<Engines>,
    language: String,
}

impl ScanPipeline {
    /// Usa o idioma da configuração dos motores.
    pub fn new(engines: Arc<Engines>) -> Self {
        let language = engines.config.language.clone();
        Self { engines, language }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn engines(&self) -> &Arc<Engines> {
        &self.engines
    }

    /// Processa o texto de forma síncrona.
    pub fn scan(&self, text: &str) -> Result<ScanReport, PipelineError> {
        self.run(text, None)
    }

    /// Processa o texto emitindo [`ScanEvent`]s; termina sempre com `Done` ou `Error`.
    pub fn scan_streaming(&self, text: &str, tx: mpsc::Sender<ScanEvent>) {
        if let Err(e) = self.run(text, Some(&tx)) {
            let _ = tx.send(ScanEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn run(&self, text: &str, tx: Option<&mpsc::Sender<ScanEvent>>) -> Result<ScanReport, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let start = Instant::now();
        let emit = |event: ScanEvent| {
            if let Some(tx) = tx {
                let _ = tx.send(event);
            }
        };

        // === Passo 1: Análise ===
        let results = self
            .engines
            .analyzer
            .analyze(text, &self.language, None, None)?;
        emit(ScanEvent::Analyzed {
            results: results.clone(),
        });

        // === Passo 2: Anonimização ===
        let sanitized = self
            .engines
            .anonymizer
            .anonymize(text, &results, &self.engines.config.operators)?;
        emit(ScanEvent::Anonymized {
            text: sanitized.text.clone(),
            items: sanitized.items.clone(),
        });

        // === Passo 3: Decisão ===
        let verdict = Verdict::from_results(&results);
        let types = detected_types(&results);
        let notices = notices_for(&types);
        emit(ScanEvent::Verdict {
            verdict,
            detected_types: types.clone(),
            notices: notices.clone(),
        });

        let report = ScanReport {
            verdict,
            detected_types: types,
            results,
            sanitized,
            notices,
            processing_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            verdict = ?report.verdict,
            entities = report.results.len(),
            types = ?report.detected_types,
            chars = text.chars().count(),
            "texto analisado"
        );

        emit(ScanEvent::Done {
            report: report.clone(),
        });
        Ok(report)
    }
}
