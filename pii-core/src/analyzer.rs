//! # Motor de Detecção
//!
//! O [`AnalyzerEngine`] recebe um texto e um idioma e devolve as entidades
//! sensíveis encontradas:
//!
//! 1. Roda o motor NLP uma única vez (tokens + entidades nomeadas).
//! 2. Executa em paralelo (Rayon) todos os reconhecedores do idioma.
//! 3. Descarta resultados abaixo do limiar de score.
//! 4. Remove duplicatas: um resultado contido em outro do mesmo tipo, com
//!    score maior ou igual, é descartado.
//! 5. Ordena por posição para que a saída seja determinística.

use rayon::prelude::*;
use tracing::debug;

use crate::entity::EntityMatch;
use crate::error::AnalyzerError;
use crate::nlp::NlpEngine;
use crate::registry::RecognizerRegistry;

pub struct AnalyzerEngine {
    nlp_engine: Box<dyn NlpEngine>,
    registry: RecognizerRegistry,
    supported_languages: Vec<String>,
    default_score_threshold: f64,
}

impl AnalyzerEngine {
    pub fn new(
        nlp_engine: Box<dyn NlpEngine>,
        registry: RecognizerRegistry,
        supported_languages: Vec<String>,
    ) -> Self {
        Self {
            nlp_engine,
            registry,
            supported_languages,
            default_score_threshold: 0.0,
        }
    }

    pub fn with_default_score_threshold(mut self, threshold: f64) -> Self {
        self.default_score_threshold = threshold;
        self
    }

    pub fn supported_entities(&self, language: &str) -> Vec<String> {
        self.registry.supported_entities(language)
    }

    /// Analisa o texto e retorna as entidades ordenadas por `(start, end, tipo)`.
    ///
    /// `entities = None` pede todas as entidades suportadas no idioma;
    /// `score_threshold = None` usa o limiar padrão do motor.
    pub fn analyze(
        &self,
        text: &str,
        language: &str,
        entities: Option<&[String]>,
        score_threshold: Option<f64>,
    ) -> Result<Vec<EntityMatch>, AnalyzerError> {
        if !self.supported_languages.iter().any(|l| l == language) {
            return Err(AnalyzerError::UnsupportedLanguage(language.to_string()));
        }
        let threshold = score_threshold.unwrap_or(self.default_score_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AnalyzerError::InvalidThreshold(threshold));
        }

        let wanted: Vec<String> = match entities {
            Some(list) => list.to_vec(),
            None => self.registry.supported_entities(language),
        };

        let artifacts = self.nlp_engine.process_text(text, language);
        let recognizers = self.registry.get_recognizers(language, Some(wanted.as_slice()));

        let raw: Vec<EntityMatch> = recognizers
            .par_iter()
            .flat_map_iter(|recognizer| recognizer.analyze(text, &wanted, &artifacts))
            .filter(|m| m.score >= threshold && !m.is_empty())
            .collect();

        let raw_count = raw.len();
        let mut results = remove_duplicates(raw);
        results.sort_by(|a, b| {
            (a.start, a.end, &a.entity_type).cmp(&(b.start, b.end, &b.entity_type))
        });

        debug!(
            language = %language,
            recognizers = recognizers.len(),
            raw = raw_count,
            kept = results.len(),
            "análise concluída"
        );
        Ok(results)
    }
}

/// Remove resultados contidos em outro do mesmo tipo com score maior ou igual.
///
/// Spans idênticos mantêm apenas o de maior score.
pub fn remove_duplicates(mut results: Vec<EntityMatch>) -> Vec<EntityMatch> {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut kept: Vec<EntityMatch> = Vec::with_capacity(results.len());
    for candidate in results {
        let duplicate = kept.iter().any(|k| {
            k.entity_type == candidate.entity_type && candidate.contained_in(k)
        });
        if !duplicate {
            kept.push(candidate);
        }
    }
    kept
}
