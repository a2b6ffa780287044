//! Configuração do servidor via linha de comando ou variáveis de ambiente.

use std::net::SocketAddr;

use clap::Parser;
use pii_core::nlp::{ModelSpec, NlpConfiguration, LEXICON_ENGINE, SPANISH_MODEL};
use pii_core::EngineConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "pii-web", version, about = "Gateway DLP: detecta y anonimiza datos personales")]
pub struct Args {
    /// Endereço de escuta do servidor HTTP.
    #[arg(long, env = "PII_WEB_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,

    /// Idioma fixo das análises; precisa ser o idioma do modelo.
    #[arg(long, env = "PII_LANGUAGE", default_value = "es")]
    pub language: String,

    /// Modelo NLP do idioma.
    #[arg(long, env = "PII_NLP_MODEL", default_value = SPANISH_MODEL)]
    pub model: String,

    /// Score mínimo para aceitar uma entidade.
    #[arg(long, env = "PII_SCORE_THRESHOLD", default_value_t = 0.0)]
    pub score_threshold: f64,

    /// Filtro do tracing quando `RUST_LOG` não está definido.
    #[arg(long, env = "PII_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            language: self.language.clone(),
            nlp: NlpConfiguration {
                nlp_engine_name: LEXICON_ENGINE.to_string(),
                models: vec![ModelSpec {
                    lang_code: self.language.clone(),
                    model_name: self.model.clone(),
                }],
            },
            score_threshold: self.score_threshold,
            ..EngineConfig::default()
        }
    }
}
