//! # Tipos de entidade e resultados de detecção
//!
//! Cada reconhecedor produz [`EntityMatch`]es: um span de bytes do texto
//! original, o tipo de dado sensível e um score de confiança.
//!
//! ## Tipos de entidade
//!
//! | Tipo            | Significado                        | Exemplo                    |
//! |-----------------|------------------------------------|----------------------------|
//! | `ES_DNI`        | Documento Nacional de Identidad    | 98765432K                  |
//! | `PHONE_NUMBER`  | Telefone                           | 612345678                  |
//! | `EMAIL_ADDRESS` | E-mail                             | juan.perez@example.com     |
//! | `CREDIT_CARD`   | Cartão de crédito (Luhn)           | 4111 1111 1111 1111        |
//! | `IBAN_CODE`     | Conta bancária IBAN (mod 97)       | ES91 2100 0418 4502 0005 1332 |
//! | `IP_ADDRESS`    | Endereço IPv4                      | 192.168.1.10               |
//! | `URL`           | Endereço web                       | https://example.com        |
//! | `PERSON`        | Nome de pessoa (motor NLP)         | Juan Pérez                 |
//! | `LOCATION`      | Local (motor NLP)                  | Madrid                     |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const NATIONAL_ID: &str = "ES_DNI";
pub const PHONE_NUMBER: &str = "PHONE_NUMBER";
pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
pub const CREDIT_CARD: &str = "CREDIT_CARD";
pub const IBAN_CODE: &str = "IBAN_CODE";
pub const IP_ADDRESS: &str = "IP_ADDRESS";
pub const URL: &str = "URL";
pub const PERSON: &str = "PERSON";
pub const LOCATION: &str = "LOCATION";

/// Uma entidade sensível detectada no texto.
///
/// Os offsets são em bytes (`[start, end)`) e sempre caem em fronteiras de
/// caractere do texto analisado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    /// Confiança em `[0, 1]`.
    pub score: f64,
    /// Nome do reconhecedor que produziu o resultado.
    pub recognizer: String,
}

impl EntityMatch {
    pub fn new(
        entity_type: impl Into<String>,
        start: usize,
        end: usize,
        score: f64,
        recognizer: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score: score.clamp(0.0, 1.0),
            recognizer: recognizer.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `self` está inteiramente dentro de `other`.
    pub fn contained_in(&self, other: &EntityMatch) -> bool {
        other.start <= self.start && self.end <= other.end
    }

    pub fn overlaps(&self, other: &EntityMatch) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Tipos detectados, sem repetição e em ordem alfabética.
pub fn detected_types(results: &[EntityMatch]) -> Vec<String> {
    results
        .iter()
        .map(|r| r.entity_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        let m = EntityMatch::new(NATIONAL_ID, 0, 9, 1.4, "test");
        assert_eq!(m.score, 1.0);
        let m = EntityMatch::new(NATIONAL_ID, 0, 9, -0.2, "test");
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_containment_and_overlap() {
        let outer = EntityMatch::new(PERSON, 0, 10, 0.8, "a");
        let inner = EntityMatch::new(PERSON, 2, 5, 0.8, "b");
        let apart = EntityMatch::new(PERSON, 10, 12, 0.8, "c");
        assert!(inner.contained_in(&outer));
        assert!(!outer.contained_in(&inner));
        assert!(inner.overlaps(&outer));
        assert!(!apart.overlaps(&outer));
    }

    #[test]
    fn test_detected_types_dedup_sorted() {
        let results = vec![
            EntityMatch::new(PHONE_NUMBER, 0, 3, 0.7, "a"),
            EntityMatch::new(NATIONAL_ID, 4, 8, 0.95, "b"),
            EntityMatch::new(PHONE_NUMBER, 9, 12, 0.7, "a"),
        ];
        assert_eq!(detected_types(&results), vec!["ES_DNI", "PHONE_NUMBER"]);
    }

    #[test]
    fn test_json_view() {
        let m = EntityMatch::new(EMAIL_ADDRESS, 3, 20, 1.0, "EmailRecognizer");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["entity_type"], "EMAIL_ADDRESS");
        assert_eq!(json["start"], 3);
    }
}
