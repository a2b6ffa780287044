//! # Motor de Anonimização
//!
//! Substitui os spans detectados pelo analisador segundo um operador por tipo
//! de entidade. O operador padrão troca o valor por `<TIPO>`.
//!
//! ## Resolução de conflitos
//!
//! Os resultados chegam de vários reconhecedores e podem se sobrepor. Antes de
//! reescrever o texto:
//!
//! - ordena por início, depois maior score, depois maior comprimento;
//! - um resultado inteiramente contido num já aceito é descartado;
//! - uma sobreposição parcial é recortada para começar onde o anterior termina.
//!
//! Assim a união dos spans aceitos cobre exatamente a união dos spans
//! detectados, e nenhum trecho detectado sobrevive com o operador padrão.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityMatch;
use crate::error::AnonymizerError;

/// Chave do operador aplicado a tipos sem configuração própria.
pub const DEFAULT_OPERATOR_KEY: &str = "DEFAULT";

/// Como um span é reescrito.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorConfig {
    /// Troca por `new_value`; sem valor, usa `<TIPO>`.
    Replace {
        #[serde(default)]
        new_value: Option<String>,
    },
    /// Remove o trecho.
    Redact,
    /// Mascara `chars_to_mask` caracteres (do início, ou do fim com `from_end`).
    Mask {
        masking_char: char,
        chars_to_mask: usize,
        #[serde(default)]
        from_end: bool,
    },
    /// Mantém o texto original (útil para apenas registrar a entidade).
    Keep,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        OperatorConfig::Replace { new_value: None }
    }
}

impl OperatorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            OperatorConfig::Replace { .. } => "replace",
            OperatorConfig::Redact => "redact",
            OperatorConfig::Mask { .. } => "mask",
            OperatorConfig::Keep => "keep",
        }
    }

    fn apply(&self, original: &str, entity_type: &str) -> String {
        match self {
            OperatorConfig::Replace { new_value } => new_value
                .clone()
                .unwrap_or_else(|| format!("<{entity_type}>")),
            OperatorConfig::Redact => String::new(),
            OperatorConfig::Mask {
                masking_char,
                chars_to_mask,
                from_end,
            } => {
                let total = original.chars().count();
                let n = (*chars_to_mask).min(total);
                original
                    .chars()
                    .enumerate()
                    .map(|(i, c)| {
                        let masked = if *from_end { i >= total - n } else { i < n };
                        if masked { *masking_char } else { c }
                    })
                    .collect()
            }
            OperatorConfig::Keep => original.to_string(),
        }
    }
}

/// Um trecho reescrito, com offsets no texto de saída.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorResult {
    pub start: usize,
    pub end: usize,
    pub entity_type: String,
    pub text: String,
    pub operator: String,
}

/// Texto sanitizado e a lista de operações aplicadas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub text: String,
    pub items: Vec<OperatorResult>,
}

#[derive(Debug, Default, Clone)]
pub struct AnonymizerEngine;

impl AnonymizerEngine {
    pub fn new() -> Self {
        Self
    }

    /// Anonimiza `text` usando os resultados do analisador.
    ///
    /// `operators` mapeia tipo de entidade → operador; a chave
    /// [`DEFAULT_OPERATOR_KEY`] vale para os demais tipos.
    pub fn anonymize(
        &self,
        text: &str,
        results: &[EntityMatch],
        operators: &HashMap<String, OperatorConfig>,
    ) -> Result<EngineResult, AnonymizerError> {
        for r in results {
            if r.start > r.end
                || r.end > text.len()
                || !text.is_char_boundary(r.start)
                || !text.is_char_boundary(r.end)
            {
                return Err(AnonymizerError::InvalidSpan {
                    start: r.start,
                    end: r.end,
                    len: text.len(),
                });
            }
        }

        let spans = resolve_conflicts(results);
        let default_operator = operators
            .get(DEFAULT_OPERATOR_KEY)
            .cloned()
            .unwrap_or_default();

        let mut output = String::with_capacity(text.len());
        let mut items = Vec::with_capacity(spans.len());
        let mut cursor = 0;

        for span in &spans {
            output.push_str(&text[cursor..span.start]);
            let operator = operators.get(&span.entity_type).unwrap_or(&default_operator);
            let replacement = operator.apply(&text[span.start..span.end], &span.entity_type);

            let start = output.len();
            output.push_str(&replacement);
            items.push(OperatorResult {
                start,
                end: output.len(),
                entity_type: span.entity_type.clone(),
                text: replacement,
                operator: operator.name().to_string(),
            });
            cursor = span.end;
        }
        output.push_str(&text[cursor..]);

        debug!(spans = spans.len(), "anonimização concluída");
        Ok(EngineResult { text: output, items })
    }
}

/// Spans sem sobreposição, ordenados por posição (ver doc do módulo).
fn resolve_conflicts(results: &[EntityMatch]) -> Vec<EntityMatch> {
    let mut sorted: Vec<&EntityMatch> = results.iter().filter(|r| !r.is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| b.len().cmp(&a.len()))
    });

    let mut accepted: Vec<EntityMatch> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        match accepted.last() {
            Some(prev) if candidate.end <= prev.end => continue,
            Some(prev) if candidate.start < prev.end => {
                let mut trimmed = candidate.clone();
                trimmed.start = prev.end;
                accepted.push(trimmed);
            }
            _ => accepted.push(candidate.clone()),
        }
    }
    accepted
}
