//! # Motor NLP: backend de linguagem
//!
//! O analisador roda o motor NLP uma vez por texto e entrega os artefatos
//! (tokens + entidades nomeadas) a todos os reconhecedores. Os reconhecedores
//! de padrão usam os tokens para procurar palavras de contexto; o
//! [`NlpRecognizer`](crate::recognizer::NlpRecognizer) converte as entidades
//! nomeadas em [`EntityMatch`](crate::entity::EntityMatch).
//!
//! ## Modelo léxico
//!
//! O único motor disponível (`lexicon`) não é estatístico: combina listas de
//! nomes próprios e lugares (gazetteers) com a regra de tratamento
//! ("Sr. García" → PERSON). Cada idioma precisa de um modelo configurado em
//! [`NlpConfiguration`]; pedir um modelo inexistente falha na criação do motor,
//! que é a falha de inicialização que a UI mostra.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{LOCATION, PERSON};
use crate::error::EngineError;
use crate::tokenizer::{tokenize, Token};

pub const LEXICON_ENGINE: &str = "lexicon";
pub const SPANISH_MODEL: &str = "es_lexicon_sm";

/// Score atribuído às entidades do modelo léxico.
const LEXICON_SCORE: f64 = 0.85;

/// Entidade nomeada encontrada pelo motor NLP (span de tokens já convertido em bytes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpEntity {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Saída do motor NLP para um texto.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NlpArtifacts {
    pub tokens: Vec<Token>,
    pub entities: Vec<NlpEntity>,
    pub language: String,
}

/// Backend de linguagem consultado pelo analisador.
pub trait NlpEngine: Send + Sync {
    fn process_text(&self, text: &str, language: &str) -> NlpArtifacts;
    fn supported_languages(&self) -> Vec<String>;
    /// Labels de entidade que o modelo sabe produzir (ex: "PERSON").
    fn supported_entities(&self) -> Vec<String>;
}

/// Um idioma e o modelo que o atende.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub lang_code: String,
    pub model_name: String,
}

/// Configuração do motor NLP: nome do motor + mapeamento idioma → modelo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NlpConfiguration {
    pub nlp_engine_name: String,
    pub models: Vec<ModelSpec>,
}

impl Default for NlpConfiguration {
    fn default() -> Self {
        Self {
            nlp_engine_name: LEXICON_ENGINE.to_string(),
            models: vec![ModelSpec {
                lang_code: "es".to_string(),
                model_name: SPANISH_MODEL.to_string(),
            }],
        }
    }
}

/// Constrói o motor NLP a partir de uma [`NlpConfiguration`].
pub struct NlpEngineProvider {
    configuration: NlpConfiguration,
}

impl NlpEngineProvider {
    pub fn new(configuration: NlpConfiguration) -> Self {
        Self { configuration }
    }

    pub fn create_engine(&self) -> Result<Box<dyn NlpEngine>, EngineError> {
        if self.configuration.nlp_engine_name != LEXICON_ENGINE {
            return Err(EngineError::UnknownNlpEngine(
                self.configuration.nlp_engine_name.clone(),
            ));
        }

        let mut models = HashMap::new();
        for spec in &self.configuration.models {
            let model = LexiconModel::load(&spec.model_name).ok_or_else(|| {
                EngineError::ModelNotFound {
                    language: spec.lang_code.clone(),
                    model: spec.model_name.clone(),
                }
            })?;
            if model.language != spec.lang_code {
                return Err(EngineError::ModelLanguageMismatch {
                    language: spec.lang_code.clone(),
                    model: spec.model_name.clone(),
                    model_language: model.language.to_string(),
                });
            }
            debug!(language = %spec.lang_code, model = %spec.model_name, "modelo carregado");
            models.insert(spec.lang_code.clone(), model);
        }

        Ok(Box::new(LexiconNlpEngine { models }))
    }
}

/// Listas e regras de um idioma.
struct LexiconModel {
    /// Idioma das listas; o modelo só atende esse `lang_code`.
    language: &'static str,
    first_names: HashSet<String>,
    surnames: HashSet<String>,
    locations: Vec<Vec<String>>,
    honorifics: HashSet<String>,
    /// Conectores permitidos dentro de um nome ("de", "del", ...).
    name_particles: HashSet<String>,
}

impl LexiconModel {
    /// Modelos embutidos no binário, indexados pelo nome.
    fn load(name: &str) -> Option<Self> {
        match name {
            SPANISH_MODEL => Some(Self::spanish()),
            _ => None,
        }
    }

    fn spanish() -> Self {
        fn lower(words: &[&str]) -> HashSet<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        }

        let first_names = lower(&[
            "Juan", "José", "Antonio", "Manuel", "Francisco", "David", "Javier",
            "Daniel", "Carlos", "Miguel", "Alejandro", "Pedro", "Pablo", "Luis",
            "Jorge", "Sergio", "Fernando", "Alberto", "Raúl", "Rafael", "Andrés",
            "María", "Carmen", "Ana", "Isabel", "Laura", "Lucía", "Marta", "Elena",
            "Cristina", "Paula", "Sara", "Raquel", "Pilar", "Rosa", "Teresa",
            "Beatriz", "Silvia", "Patricia", "Nuria", "Sofía", "Julia", "Irene",
        ]);
        let surnames = lower(&[
            "García", "González", "Rodríguez", "Fernández", "López", "Martínez",
            "Sánchez", "Pérez", "Gómez", "Martín", "Jiménez", "Ruiz", "Hernández",
            "Díaz", "Moreno", "Muñoz", "Álvarez", "Romero", "Alonso", "Gutiérrez",
            "Navarro", "Torres", "Domínguez", "Vázquez", "Ramos", "Gil", "Ramírez",
            "Serrano", "Blanco", "Molina", "Morales", "Suárez", "Ortega", "Castro",
        ]);
        let locations = [
            "España", "Madrid", "Barcelona", "Valencia", "Sevilla", "Zaragoza",
            "Málaga", "Murcia", "Palma", "Bilbao", "Alicante", "Córdoba",
            "Valladolid", "Vigo", "Gijón", "Granada", "Salamanca", "Toledo",
            "Cádiz", "Santander", "Pamplona", "San Sebastián", "Santiago de Compostela",
            "Las Palmas", "Santa Cruz de Tenerife", "A Coruña", "Oviedo",
            "Andalucía", "Cataluña", "Galicia", "Castilla y León", "País Vasco",
            "Comunidad de Madrid", "Canarias", "Baleares", "Aragón", "Asturias",
            "Portugal", "Francia", "México", "Argentina", "Colombia", "Chile",
        ]
        .iter()
        .map(|l| tokenize(l).into_iter().map(|t| t.text.to_lowercase()).collect())
        .collect();
        let honorifics = lower(&[
            "sr", "sra", "srta", "don", "doña", "dr", "dra", "señor", "señora",
            "señorita", "profesor", "profesora", "ingeniero", "ingeniera",
        ]);
        let name_particles = lower(&["de", "del", "la", "y"]);

        Self {
            language: "es",
            first_names,
            surnames,
            locations,
            honorifics,
            name_particles,
        }
    }

    fn is_name_word(&self, token: &Token) -> bool {
        let lower = token.text.to_lowercase();
        token.is_capitalized()
            && (self.first_names.contains(&lower) || self.surnames.contains(&lower))
    }

    /// Aplica gazetteers e regras aos tokens, devolvendo spans em índices de token `[start, end)`.
    fn tag(&self, tokens: &[Token]) -> Vec<(&'static str, usize, usize)> {
        let mut taken = vec![false; tokens.len()];
        let mut spans = Vec::new();

        // 1. Locais (n-gramas, o mais longo primeiro)
        let mut i = 0;
        while i < tokens.len() {
            let best = self
                .locations
                .iter()
                .filter(|parts| {
                    i + parts.len() <= tokens.len()
                        && tokens[i].is_capitalized()
                        && parts
                            .iter()
                            .enumerate()
                            .all(|(j, part)| tokens[i + j].text.to_lowercase() == *part)
                })
                .map(|parts| parts.len())
                .max();
            match best {
                Some(len) => {
                    taken[i..i + len].iter_mut().for_each(|t| *t = true);
                    spans.push((LOCATION, i, i + len));
                    i += len;
                }
                None => i += 1,
            }
        }

        // 2. Pessoas: sequência de nomes conhecidos, ou palavra capitalizada após tratamento
        let mut i = 0;
        while i < tokens.len() {
            if taken[i] {
                i += 1;
                continue;
            }
            let after_honorific = i > 0 && {
                let prev = tokens[i - 1].text.to_lowercase();
                let prev = if prev == "." && i > 1 {
                    tokens[i - 2].text.to_lowercase()
                } else {
                    prev
                };
                self.honorifics.contains(&prev)
            };
            let starts_name =
                self.is_name_word(&tokens[i]) || (after_honorific && tokens[i].is_capitalized());
            if !starts_name {
                i += 1;
                continue;
            }

            let mut end = i + 1;
            loop {
                if end < tokens.len() && !taken[end] && self.is_name_word(&tokens[end]) {
                    end += 1;
                    continue;
                }
                // "García de la Fuente": conectores só contam se seguidos de palavra capitalizada
                let mut j = end;
                while j < tokens.len() && self.name_particles.contains(&tokens[j].text) {
                    j += 1;
                }
                if j > end && j < tokens.len() && !taken[j] && tokens[j].is_capitalized() {
                    end = j + 1;
                    continue;
                }
                break;
            }

            taken[i..end].iter_mut().for_each(|t| *t = true);
            spans.push((PERSON, i, end));
            i = end;
        }

        spans.sort_by_key(|&(_, start, _)| start);
        spans
    }
}

/// Motor NLP baseado em léxico, com um modelo por idioma.
pub struct LexiconNlpEngine {
    models: HashMap<String, LexiconModel>,
}

impl NlpEngine for LexiconNlpEngine {
    fn process_text(&self, text: &str, language: &str) -> NlpArtifacts {
        let tokens = tokenize(text);
        let entities = match self.models.get(language) {
            Some(model) => model
                .tag(&tokens)
                .into_iter()
                .map(|(label, start, end)| NlpEntity {
                    label: label.to_string(),
                    start: tokens[start].start,
                    end: tokens[end - 1].end,
                    score: LEXICON_SCORE,
                })
                .collect(),
            None => Vec::new(),
        };

        NlpArtifacts {
            tokens,
            entities,
            language: language.to_string(),
        }
    }

    fn supported_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.models.keys().cloned().collect();
        languages.sort();
        languages
    }

    fn supported_entities(&self) -> Vec<String> {
        vec![PERSON.to_string(), LOCATION.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Box<dyn NlpEngine> {
        NlpEngineProvider::new(NlpConfiguration::default())
            .create_engine()
            .unwrap()
    }

    fn labelled<'a>(text: &'a str, artifacts: &NlpArtifacts) -> Vec<(String, &'a str)> {
        artifacts
            .entities
            .iter()
            .map(|e| (e.label.clone(), &text[e.start..e.end]))
            .collect()
    }

    #[test]
    fn test_unknown_model_fails() {
        let config = NlpConfiguration {
            nlp_engine_name: LEXICON_ENGINE.to_string(),
            models: vec![ModelSpec {
                lang_code: "es".to_string(),
                model_name: "es_core_news_lg".to_string(),
            }],
        };
        match NlpEngineProvider::new(config).create_engine() {
            Err(EngineError::ModelNotFound { language, model }) => {
                assert_eq!(language, "es");
                assert_eq!(model, "es_core_news_lg");
            }
            Err(other) => panic!("erro inesperado: {other}"),
            Ok(_) => panic!("modelo inexistente não deveria carregar"),
        }
    }

    #[test]
    fn test_model_for_other_language_fails() {
        let config = NlpConfiguration {
            nlp_engine_name: LEXICON_ENGINE.to_string(),
            models: vec![ModelSpec {
                lang_code: "en".to_string(),
                model_name: SPANISH_MODEL.to_string(),
            }],
        };
        match NlpEngineProvider::new(config).create_engine() {
            Err(EngineError::ModelLanguageMismatch { language, model_language, .. }) => {
                assert_eq!(language, "en");
                assert_eq!(model_language, "es");
            }
            Err(other) => panic!("erro inesperado: {other}"),
            Ok(_) => panic!("modelo espanhol não pode atender 'en'"),
        }
    }

    #[test]
    fn test_supported_languages() {
        assert_eq!(engine().supported_languages(), vec!["es"]);
    }

    #[test]
    fn test_unknown_engine_fails() {
        let config = NlpConfiguration {
            nlp_engine_name: "spacy".to_string(),
            ..NlpConfiguration::default()
        };
        assert!(matches!(
            NlpEngineProvider::new(config).create_engine(),
            Err(EngineError::UnknownNlpEngine(_))
        ));
    }

    #[test]
    fn test_person_from_lexicon() {
        let text = "El cliente Juan Pérez llamó ayer.";
        let artifacts = engine().process_text(text, "es");
        assert_eq!(labelled(text, &artifacts), vec![("PERSON".to_string(), "Juan Pérez")]);
    }

    #[test]
    fn test_person_after_honorific() {
        let text = "Atendió la Sra. Urquijo en la oficina.";
        let artifacts = engine().process_text(text, "es");
        assert_eq!(labelled(text, &artifacts), vec![("PERSON".to_string(), "Urquijo")]);
    }

    #[test]
    fn test_multiword_location() {
        let text = "Vive en San Sebastián desde 2010.";
        let artifacts = engine().process_text(text, "es");
        assert_eq!(
            labelled(text, &artifacts),
            vec![("LOCATION".to_string(), "San Sebastián")]
        );
    }

    #[test]
    fn test_name_with_particles() {
        let text = "Firmó María García de la Fuente.";
        let artifacts = engine().process_text(text, "es");
        assert_eq!(
            labelled(text, &artifacts),
            vec![("PERSON".to_string(), "María García de la Fuente")]
        );
    }

    #[test]
    fn test_lowercase_words_are_ignored() {
        let text = "la rosa del jardín es roja";
        let artifacts = engine().process_text(text, "es");
        assert!(artifacts.entities.is_empty());
    }

    #[test]
    fn test_unconfigured_language_has_no_entities() {
        let artifacts = engine().process_text("Juan Pérez", "en");
        assert!(artifacts.entities.is_empty());
        assert_eq!(artifacts.tokens.len(), 2);
    }
}
