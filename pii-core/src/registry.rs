//! # Registro de reconhecedores
//!
//! Lista ordenada de reconhecedores consultada pelo analisador. É montado uma
//! vez na inicialização e depois só lido.

use tracing::debug;

use crate::error::RecognizerError;
use crate::predefined::predefined_recognizers;
use crate::recognizer::{NlpRecognizer, Recognizer};

#[derive(Default)]
pub struct RecognizerRegistry {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega os reconhecedores de padrão padrão para cada idioma.
    pub fn load_predefined_recognizers(&mut self, languages: &[String]) -> Result<(), RecognizerError> {
        for language in languages {
            for recognizer in predefined_recognizers(language)? {
                self.add_boxed(recognizer);
            }
        }
        Ok(())
    }

    /// Registra o reconhecedor que expõe as entidades do motor NLP.
    pub fn add_nlp_recognizer(&mut self, supported_entities: Vec<String>, language: &str) {
        self.add_recognizer(NlpRecognizer::new(supported_entities, language));
    }

    pub fn add_recognizer(&mut self, recognizer: impl Recognizer + 'static) {
        self.add_boxed(Box::new(recognizer));
    }

    pub fn add_boxed(&mut self, recognizer: Box<dyn Recognizer>) {
        debug!(
            recognizer = recognizer.name(),
            language = recognizer.supported_language(),
            "reconhecedor registrado"
        );
        self.recognizers.push(recognizer);
    }

    pub fn remove_recognizer(&mut self, name: &str) -> bool {
        let before = self.recognizers.len();
        self.recognizers.retain(|r| r.name() != name);
        before != self.recognizers.len()
    }

    /// Reconhecedores do idioma que cobrem ao menos uma das entidades pedidas
    /// (`None` = todas).
    pub fn get_recognizers(&self, language: &str, entities: Option<&[String]>) -> Vec<&dyn Recognizer> {
        self.recognizers
            .iter()
            .filter(|r| r.supported_language() == language)
            .filter(|r| match entities {
                Some(wanted) => r.supported_entities().iter().any(|e| wanted.contains(e)),
                None => true,
            })
            .map(|r| &**r)
            .collect()
    }

    /// Entidades suportadas por algum reconhecedor do idioma, sem repetição.
    pub fn supported_entities(&self, language: &str) -> Vec<String> {
        let mut entities: Vec<String> = self
            .get_recognizers(language, None)
            .iter()
            .flat_map(|r| r.supported_entities())
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predefined::national_id_recognizer;

    #[test]
    fn test_filter_by_language() {
        let mut registry = RecognizerRegistry::new();
        registry
            .load_predefined_recognizers(&["es".to_string()])
            .unwrap();
        registry.add_recognizer(national_id_recognizer("es").unwrap());

        assert_eq!(registry.get_recognizers("es", None).len(), 7);
        assert!(registry.get_recognizers("en", None).is_empty());
    }

    #[test]
    fn test_filter_by_entity() {
        let mut registry = RecognizerRegistry::new();
        registry
            .load_predefined_recognizers(&["es".to_string()])
            .unwrap();
        registry.add_recognizer(national_id_recognizer("es").unwrap());

        let wanted = vec!["ES_DNI".to_string()];
        let found = registry.get_recognizers("es", Some(wanted.as_slice()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "EsDniRecognizer");
    }

    #[test]
    fn test_supported_entities_include_custom_and_nlp() {
        let mut registry = RecognizerRegistry::new();
        registry.add_recognizer(national_id_recognizer("es").unwrap());
        registry.add_nlp_recognizer(vec!["PERSON".to_string(), "LOCATION".to_string()], "es");
        assert_eq!(
            registry.supported_entities("es"),
            vec!["ES_DNI", "LOCATION", "PERSON"]
        );
    }

    #[test]
    fn test_remove_recognizer() {
        let mut registry = RecognizerRegistry::new();
        registry.add_recognizer(national_id_recognizer("es").unwrap());
        assert!(registry.remove_recognizer("EsDniRecognizer"));
        assert!(!registry.remove_recognizer("EsDniRecognizer"));
        assert!(registry.is_empty());
    }
}
