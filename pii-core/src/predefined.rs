//! # Reconhecedores pré-definidos
//!
//! O conjunto padrão carregado pelo registro: e-mail, telefone, cartão de
//! crédito, IBAN, IP e URL. Além deles, [`national_id_recognizer`] é o
//! detector de DNI espanhol que o gateway injeta no registro na inicialização.

use crate::entity::{
    CREDIT_CARD, EMAIL_ADDRESS, IBAN_CODE, IP_ADDRESS, NATIONAL_ID, PHONE_NUMBER, URL,
};
use crate::error::RecognizerError;
use crate::recognizer::{Pattern, PatternRecognizer, Recognizer};

/// Regex do DNI: 8 dígitos seguidos de uma letra maiúscula.
pub const NATIONAL_ID_REGEX: &str = r"\b\d{8}[A-Z]\b";
pub const NATIONAL_ID_SCORE: f64 = 0.95;

/// Detector de DNI (Documento Nacional de Identidad).
pub fn national_id_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        NATIONAL_ID,
        vec![Pattern::new("dni_pattern", NATIONAL_ID_REGEX, NATIONAL_ID_SCORE)],
        language,
    )?
    .with_name("EsDniRecognizer"))
}

pub fn email_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        EMAIL_ADDRESS,
        vec![Pattern::new(
            "email",
            r"\b[\w.%+-]+@[\w.-]+\.[A-Za-z]{2,}\b",
            1.0,
        )],
        language,
    )?
    .with_name("EmailRecognizer"))
}

/// Prefixo internacional opcional (+34 ou 0034). A fronteira de palavra fica
/// antes do prefixo: entre "34" e o número não há fronteira.
const ES_PHONE_PREFIX: &str = r"(?:\+34\s?|\b0034\s?|\b)";

/// Telefones espanhóis: 9 dígitos começando por 6, 7, 8 ou 9, com prefixo +34 opcional.
pub fn phone_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        PHONE_NUMBER,
        vec![
            Pattern::new(
                "es_phone_compact",
                format!(r"{ES_PHONE_PREFIX}[6789]\d{{8}}\b"),
                0.6,
            ),
            Pattern::new(
                "es_phone_grouped",
                format!(r"{ES_PHONE_PREFIX}[6789]\d{{2}}[\s.-]\d{{2,3}}[\s.-]\d{{2,3}}(?:[\s.-]\d{{2}})?\b"),
                0.5,
            ),
        ],
        language,
    )?
    .with_context(&["teléfono", "telefono", "móvil", "movil", "tel", "llamar", "whatsapp"])
    .with_validator(|s| s.chars().filter(char::is_ascii_digit).count() >= 9)
    .with_name("PhoneRecognizer"))
}

pub fn credit_card_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        CREDIT_CARD,
        vec![Pattern::new(
            "credit_card",
            r"\b(?:\d[ -]?){12,18}\d\b",
            0.5,
        )],
        language,
    )?
    .with_validator(luhn_checksum)
    .with_context(&["tarjeta", "crédito", "credito", "visa", "mastercard"])
    .with_name("CreditCardRecognizer"))
}

pub fn iban_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        IBAN_CODE,
        vec![Pattern::new(
            "iban",
            r"\b[A-Z]{2}\d{2}(?:[ ]?[A-Z0-9]{4}){3,7}(?:[ ]?[A-Z0-9]{1,3})?\b",
            0.5,
        )],
        language,
    )?
    .with_validator(iban_checksum)
    .with_context(&["iban", "cuenta", "transferencia"])
    .with_name("IbanRecognizer"))
}

pub fn ip_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        IP_ADDRESS,
        vec![Pattern::new(
            "ipv4",
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
            0.6,
        )],
        language,
    )?
    .with_name("IpRecognizer"))
}

pub fn url_recognizer(language: &str) -> Result<PatternRecognizer, RecognizerError> {
    Ok(PatternRecognizer::new(
        URL,
        vec![
            Pattern::new("url_scheme", r#"\bhttps?://[^\s<>"]+[^\s<>".,;:!?)]"#, 0.6),
            Pattern::new("url_www", r#"\bwww\.[^\s<>"@]+[^\s<>"@.,;:!?)]"#, 0.5),
        ],
        language,
    )?
    .with_name("UrlRecognizer"))
}

/// Todos os reconhecedores de padrão padrão para um idioma.
pub fn predefined_recognizers(language: &str) -> Result<Vec<Box<dyn Recognizer>>, RecognizerError> {
    Ok(vec![
        Box::new(email_recognizer(language)?),
        Box::new(phone_recognizer(language)?),
        Box::new(credit_card_recognizer(language)?),
        Box::new(iban_recognizer(language)?),
        Box::new(ip_recognizer(language)?),
        Box::new(url_recognizer(language)?),
    ])
}

/// Algoritmo de Luhn sobre os dígitos do texto (separadores ignorados).
pub fn luhn_checksum(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Validação ISO 13616 (mod 97) de um IBAN, aceitando espaços.
pub fn iban_checksum(candidate: &str) -> bool {
    let compact: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 15 || compact.len() > 34 {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        // Letras viram dois dígitos (A=10 ... Z=35)
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    remainder == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::NlpArtifacts;
    use crate::tokenizer::tokenize;

    fn run(recognizer: &dyn Recognizer, text: &str) -> Vec<String> {
        let artifacts = NlpArtifacts {
            tokens: tokenize(text),
            entities: vec![],
            language: "es".to_string(),
        };
        recognizer
            .analyze(text, &recognizer.supported_entities(), &artifacts)
            .iter()
            .map(|r| text[r.start..r.end].to_string())
            .collect()
    }

    #[test]
    fn test_national_id() {
        let recognizer = national_id_recognizer("es").unwrap();
        assert_eq!(run(&recognizer, "DNI 98765432K"), vec!["98765432K"]);
        // Sem fronteira de palavra ou letra minúscula não conta
        assert!(run(&recognizer, "X98765432K").is_empty());
        assert!(run(&recognizer, "98765432k").is_empty());
        assert!(run(&recognizer, "1234567K").is_empty());
    }

    #[test]
    fn test_email() {
        let recognizer = email_recognizer("es").unwrap();
        assert_eq!(
            run(&recognizer, "su correo es juan.perez@example.com."),
            vec!["juan.perez@example.com"]
        );
        assert_eq!(
            run(&recognizer, "escriba a josé.núñez@correo.es hoy"),
            vec!["josé.núñez@correo.es"]
        );
    }

    #[test]
    fn test_phone() {
        let recognizer = phone_recognizer("es").unwrap();
        assert_eq!(run(&recognizer, "Su teléfono es 612345678 y"), vec!["612345678"]);
        assert_eq!(run(&recognizer, "llame al 912 345 678"), vec!["912 345 678"]);
        assert!(run(&recognizer, "pedido 512345678").is_empty());
    }

    #[test]
    fn test_phone_with_international_prefix() {
        let recognizer = phone_recognizer("es").unwrap();
        assert_eq!(run(&recognizer, "Llámame al +34612345678"), vec!["+34612345678"]);
        assert_eq!(run(&recognizer, "tel 0034612345678"), vec!["0034612345678"]);
        assert_eq!(run(&recognizer, "móvil +34 612 345 678."), vec!["+34 612 345 678"]);
        // Prefixo colado a outros dígitos não é telefone
        assert!(run(&recognizer, "ref 10034612345678").is_empty());
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_checksum("4111 1111 1111 1111"));
        assert!(luhn_checksum("5500-0000-0000-0004"));
        assert!(!luhn_checksum("4111 1111 1111 1112"));
        assert!(!luhn_checksum("1234"));
    }

    #[test]
    fn test_credit_card() {
        let recognizer = credit_card_recognizer("es").unwrap();
        assert_eq!(
            run(&recognizer, "tarjeta 4111 1111 1111 1111 caduca"),
            vec!["4111 1111 1111 1111"]
        );
        assert!(run(&recognizer, "ref 4111 1111 1111 1112").is_empty());
    }

    #[test]
    fn test_iban() {
        assert!(iban_checksum("ES91 2100 0418 4502 0005 1332"));
        assert!(iban_checksum("GB82WEST12345698765432"));
        assert!(!iban_checksum("ES91 2100 0418 4502 0005 1333"));
        let recognizer = iban_recognizer("es").unwrap();
        assert_eq!(
            run(&recognizer, "IBAN ES9121000418450200051332 ok"),
            vec!["ES9121000418450200051332"]
        );
    }

    #[test]
    fn test_ip_and_url() {
        let ip = ip_recognizer("es").unwrap();
        assert_eq!(run(&ip, "desde 192.168.1.10 ayer"), vec!["192.168.1.10"]);
        assert!(run(&ip, "versión 999.1.1.1").is_empty());

        let url = url_recognizer("es").unwrap();
        assert_eq!(
            run(&url, "visite https://example.com/perfil, gracias"),
            vec!["https://example.com/perfil"]
        );
    }

    #[test]
    fn test_predefined_set_builds() {
        let recognizers = predefined_recognizers("es").unwrap();
        assert_eq!(recognizers.len(), 6);
        assert!(recognizers.iter().all(|r| r.supported_language() == "es"));
    }
}
