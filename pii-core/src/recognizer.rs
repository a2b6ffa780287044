//! # Reconhecedores: regras plugáveis no registro do analisador
//!
//! Um reconhecedor recebe o texto e os artefatos do motor NLP e devolve
//! zero ou mais [`EntityMatch`]. Há dois tipos:
//!
//! - [`PatternRecognizer`]: uma ou mais expressões regulares com score fixo,
//!   opcionalmente com validador (checksum) e palavras de contexto.
//! - [`NlpRecognizer`]: traduz as entidades do motor NLP para resultados.
//!
//! Conflitos entre reconhecedores (ex: o mesmo span marcado como telefone e
//! como DNI) não são resolvidos aqui; isso é papel do
//! [`AnalyzerEngine`](crate::analyzer::AnalyzerEngine).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::EntityMatch;
use crate::error::RecognizerError;
use crate::nlp::NlpArtifacts;
use crate::tokenizer::token_at;

/// Aumento de score quando uma palavra de contexto aparece perto do match.
pub const CONTEXT_BOOST: f64 = 0.35;
/// Quantos tokens antes do match são inspecionados em busca de contexto.
pub const CONTEXT_WINDOW: usize = 5;

/// Interface comum de todos os reconhecedores.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;
    fn supported_entities(&self) -> Vec<String>;
    fn supported_language(&self) -> &str;
    fn analyze(&self, text: &str, entities: &[String], artifacts: &NlpArtifacts) -> Vec<EntityMatch>;
}

/// Regra de padrão: nome, regex e score atribuído a cada match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    pub regex: String,
    pub score: f64,
}

impl Pattern {
    pub fn new(name: impl Into<String>, regex: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            regex: regex.into(),
            score,
        }
    }
}

/// Validador opcional: recebe o texto do match e decide se ele é aceito.
pub type Validator = fn(&str) -> bool;

/// Reconhecedor baseado em expressões regulares.
///
/// As regex são compiladas na construção; um padrão inválido é erro de
/// construção, nunca de análise.
pub struct PatternRecognizer {
    name: String,
    supported_entity: String,
    supported_language: String,
    patterns: Vec<(Pattern, Regex)>,
    context: Vec<String>,
    validator: Option<Validator>,
}

impl PatternRecognizer {
    pub fn new(
        supported_entity: impl Into<String>,
        patterns: Vec<Pattern>,
        supported_language: impl Into<String>,
    ) -> Result<Self, RecognizerError> {
        let supported_entity = supported_entity.into();
        if patterns.is_empty() {
            return Err(RecognizerError::NoPatterns(supported_entity));
        }

        let compiled = patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern.regex)
                    .map(|regex| (pattern.clone(), regex))
                    .map_err(|source| RecognizerError::InvalidPattern {
                        name: pattern.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: format!("{supported_entity}_recognizer"),
            supported_entity,
            supported_language: supported_language.into(),
            patterns: compiled,
            context: Vec::new(),
            validator: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Palavras que, quando aparecem antes do match, aumentam o score.
    pub fn with_context(mut self, words: &[&str]) -> Self {
        self.context = words.iter().map(|w| w.to_lowercase()).collect();
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    fn has_context(&self, artifacts: &NlpArtifacts, start: usize) -> bool {
        if self.context.is_empty() {
            return false;
        }
        let tokens = &artifacts.tokens;
        let Some(index) = token_at(tokens, start) else {
            return false;
        };
        tokens[index.saturating_sub(CONTEXT_WINDOW)..index]
            .iter()
            .any(|t| self.context.contains(&t.text.to_lowercase()))
    }
}

impl Recognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> Vec<String> {
        vec![self.supported_entity.clone()]
    }

    fn supported_language(&self) -> &str {
        &self.supported_language
    }

    fn analyze(&self, text: &str, entities: &[String], artifacts: &NlpArtifacts) -> Vec<EntityMatch> {
        if !entities.iter().any(|e| *e == self.supported_entity) {
            return Vec::new();
        }

        let mut results = Vec::new();
        for (pattern, regex) in &self.patterns {
            for m in regex.find_iter(text) {
                if m.as_str().is_empty() {
                    continue;
                }
                if let Some(validate) = self.validator {
                    if !validate(m.as_str()) {
                        continue;
                    }
                }
                let mut score = pattern.score;
                if self.has_context(artifacts, m.start()) {
                    score = (score + CONTEXT_BOOST).min(1.0);
                }
                results.push(EntityMatch::new(
                    self.supported_entity.clone(),
                    m.start(),
                    m.end(),
                    score,
                    self.name.clone(),
                ));
            }
        }
        results
    }
}

/// Converte as entidades do motor NLP em resultados do analisador.
pub struct NlpRecognizer {
    supported_entities: Vec<String>,
    supported_language: String,
}

impl NlpRecognizer {
    pub fn new(supported_entities: Vec<String>, supported_language: impl Into<String>) -> Self {
        Self {
            supported_entities,
            supported_language: supported_language.into(),
        }
    }
}

impl Recognizer for NlpRecognizer {
    fn name(&self) -> &str {
        "NlpRecognizer"
    }

    fn supported_entities(&self) -> Vec<String> {
        self.supported_entities.clone()
    }

    fn supported_language(&self) -> &str {
        &self.supported_language
    }

    fn analyze(&self, _text: &str, entities: &[String], artifacts: &NlpArtifacts) -> Vec<EntityMatch> {
        artifacts
            .entities
            .iter()
            .filter(|e| self.supported_entities.contains(&e.label) && entities.contains(&e.label))
            .map(|e| EntityMatch::new(e.label.clone(), e.start, e.end, e.score, self.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::NlpEntity;
    use crate::tokenizer::tokenize;

    fn artifacts(text: &str) -> NlpArtifacts {
        NlpArtifacts {
            tokens: tokenize(text),
            entities: vec![],
            language: "es".to_string(),
        }
    }

    fn all(recognizer: &dyn Recognizer) -> Vec<String> {
        recognizer.supported_entities()
    }

    #[test]
    fn test_pattern_matches_with_configured_score() {
        let recognizer = PatternRecognizer::new(
            "ES_DNI",
            vec![Pattern::new("dni_pattern", r"\b\d{8}[A-Z]\b", 0.95)],
            "es",
        )
        .unwrap();
        let text = "DNI 98765432K y 12345678Z";
        let results = recognizer.analyze(text, &all(&recognizer), &artifacts(text));
        assert_eq!(results.len(), 2);
        assert_eq!(&text[results[0].start..results[0].end], "98765432K");
        assert_eq!(results[0].score, 0.95);
        assert_eq!(results[1].entity_type, "ES_DNI");
    }

    #[test]
    fn test_invalid_regex_is_construction_error() {
        let err = PatternRecognizer::new("X", vec![Pattern::new("bad", r"(\d", 0.5)], "es");
        assert!(matches!(err, Err(RecognizerError::InvalidPattern { .. })));
    }

    #[test]
    fn test_no_patterns_is_error() {
        let err = PatternRecognizer::new("X", vec![], "es");
        assert!(matches!(err, Err(RecognizerError::NoPatterns(_))));
    }

    #[test]
    fn test_validator_rejects_candidates() {
        let recognizer = PatternRecognizer::new("EVEN", vec![Pattern::new("digits", r"\d+", 0.5)], "es")
            .unwrap()
            .with_validator(|s| s.len() % 2 == 0);
        let text = "12 345 6789";
        let results = recognizer.analyze(text, &all(&recognizer), &artifacts(text));
        let found: Vec<&str> = results.iter().map(|r| &text[r.start..r.end]).collect();
        assert_eq!(found, vec!["12", "6789"]);
    }

    #[test]
    fn test_context_word_boosts_score() {
        let recognizer = PatternRecognizer::new("PHONE_NUMBER", vec![Pattern::new("p", r"\b\d{9}\b", 0.4)], "es")
            .unwrap()
            .with_context(&["teléfono"]);
        let text = "Su teléfono es 612345678, otro número 698765432";
        let results = recognizer.analyze(text, &all(&recognizer), &artifacts(text));
        assert_eq!(results.len(), 2);
        assert!((results[0].score - 0.75).abs() < 1e-9);
        assert!((results[1].score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_unrequested_entity_is_skipped() {
        let recognizer = PatternRecognizer::new("ES_DNI", vec![Pattern::new("dni", r"\d{8}[A-Z]", 0.95)], "es").unwrap();
        let text = "98765432K";
        let results = recognizer.analyze(text, &["PHONE_NUMBER".to_string()], &artifacts(text));
        assert!(results.is_empty());
    }

    #[test]
    fn test_nlp_recognizer_filters_labels() {
        let recognizer = NlpRecognizer::new(vec!["PERSON".to_string()], "es");
        let mut arts = artifacts("Juan vive en Madrid");
        arts.entities = vec![
            NlpEntity { label: "PERSON".to_string(), start: 0, end: 4, score: 0.85 },
            NlpEntity { label: "LOCATION".to_string(), start: 13, end: 19, score: 0.85 },
        ];
        let results = recognizer.analyze("Juan vive en Madrid", &["PERSON".to_string(), "LOCATION".to_string()], &arts);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_type, "PERSON");
        assert_eq!(results[0].recognizer, "NlpRecognizer");
    }
}
