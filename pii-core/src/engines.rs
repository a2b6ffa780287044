//! # Montagem e cache dos motores
//!
//! Analisador e anonimizador são construídos uma vez por processo e depois
//! compartilhados somente para leitura. [`shared`] guarda o primeiro
//! resultado da montagem (sucesso ou falha) num `OnceLock`: uma falha de
//! inicialização não é tentada de novo a cada requisição.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::AnalyzerEngine;
use crate::anonymizer::{AnonymizerEngine, OperatorConfig};
use crate::error::EngineError;
use crate::nlp::{NlpConfiguration, NlpEngineProvider};
use crate::predefined::national_id_recognizer;
use crate::registry::RecognizerRegistry;

/// Configuração dos motores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Idioma fixo das análises (e do detector de DNI).
    pub language: String,
    pub nlp: NlpConfiguration,
    pub score_threshold: f64,
    /// Operador de anonimização por tipo de entidade (`DEFAULT` para o resto).
    pub operators: HashMap<String, OperatorConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            nlp: NlpConfiguration::default(),
            score_threshold: 0.0,
            operators: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Troca o modelo do idioma configurado.
    pub fn with_model(mut self, model_name: &str) -> Self {
        let language = self.language.clone();
        for spec in self.nlp.models.iter_mut().filter(|m| m.lang_code == language) {
            spec.model_name = model_name.to_string();
        }
        self
    }
}

pub struct Engines {
    pub analyzer: AnalyzerEngine,
    pub anonymizer: AnonymizerEngine,
    pub config: EngineConfig,
}

impl Engines {
    /// Monta motor NLP, registro (pré-definidos + NLP + DNI) e anonimizador.
    pub fn load(config: &EngineConfig) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&config.score_threshold) {
            return Err(EngineError::InvalidThreshold(config.score_threshold));
        }

        let nlp = NlpEngineProvider::new(config.nlp.clone()).create_engine()?;

        let languages = nlp.supported_languages();
        if !languages.contains(&config.language) {
            return Err(EngineError::MissingLanguage(config.language.clone()));
        }

        let mut registry = RecognizerRegistry::new();
        registry.load_predefined_recognizers(&languages)?;
        for language in &languages {
            registry.add_nlp_recognizer(nlp.supported_entities(), language);
        }
        registry.add_recognizer(national_id_recognizer(&config.language)?);

        info!(
            recognizers = registry.len(),
            languages = ?languages,
            "motores carregados"
        );

        let analyzer = AnalyzerEngine::new(nlp, registry, languages)
            .with_default_score_threshold(config.score_threshold);

        Ok(Self {
            analyzer,
            anonymizer: AnonymizerEngine::new(),
            config: config.clone(),
        })
    }
}

static SHARED: OnceLock<Result<Arc<Engines>, EngineError>> = OnceLock::new();

/// Motores do processo. Só a configuração da primeira chamada é usada.
pub fn shared(config: &EngineConfig) -> Result<Arc<Engines>, EngineError> {
    SHARED
        .get_or_init(|| {
            let loaded = Engines::load(config).map(Arc::new);
            if let Err(e) = &loaded {
                warn!(error = %e, "falha ao carregar motores");
            }
            loaded
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognizerError;

    #[test]
    fn test_default_config_loads() {
        let engines = Engines::load(&EngineConfig::default()).unwrap();
        let entities = engines.analyzer.supported_entities("es");
        for expected in ["ES_DNI", "PERSON", "LOCATION", "PHONE_NUMBER", "EMAIL_ADDRESS"] {
            assert!(entities.iter().any(|e| e == expected), "faltando {expected}");
        }
    }

    #[test]
    fn test_missing_model_fails() {
        let config = EngineConfig::default().with_model("es_core_news_lg");
        assert!(matches!(
            Engines::load(&config),
            Err(EngineError::ModelNotFound { ref model, .. }) if model == "es_core_news_lg"
        ));
    }

    #[test]
    fn test_language_without_model_fails() {
        let config = EngineConfig {
            language: "pt".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engines::load(&config),
            Err(EngineError::MissingLanguage(ref l)) if l == "pt"
        ));
    }

    #[test]
    fn test_threshold_out_of_range_fails_at_load() {
        for threshold in [1.5, -0.1] {
            let config = EngineConfig {
                score_threshold: threshold,
                ..EngineConfig::default()
            };
            assert!(matches!(
                Engines::load(&config),
                Err(EngineError::InvalidThreshold(t)) if t == threshold
            ));
        }
        let config = EngineConfig {
            score_threshold: 1.0,
            ..EngineConfig::default()
        };
        assert!(Engines::load(&config).is_ok());
    }

    #[test]
    fn test_registry_error_keeps_source() {
        use std::error::Error as _;

        let err = EngineError::from(RecognizerError::NoPatterns("Vazio".to_string()));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reconhecedor 'Vazio' não possui padrões"));
    }

    #[test]
    fn test_shared_is_memoized() {
        let a = shared(&EngineConfig::default()).unwrap();
        let b = shared(&EngineConfig::default().with_model("inexistente")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_config_from_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"score_threshold":0.5,"operators":{"DEFAULT":{"type":"redact"}}}"#)
                .unwrap();
        assert_eq!(config.language, "es");
        assert_eq!(config.score_threshold, 0.5);
        assert_eq!(config.operators["DEFAULT"], OperatorConfig::Redact);
    }
}
