//! # Tokenizador
//!
//! Divide o texto bruto em tokens (palavras, números, pontuação) preservando
//! o offset de byte de cada um no texto original. Os offsets são o que permite
//! ao motor NLP e às palavras de contexto dos reconhecedores apontarem para
//! spans exatos do texto que depois será anonimizado.
//!
//! A segmentação segue as fronteiras de palavra do Unicode (UAX #29), de modo
//! que "98765432K" e "juan.perez" ficam inteiros, enquanto espaços são descartados.
//!
//! ```rust
//! use pii_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("DNI 98765432K.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["DNI", "98765432K", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Juan", ",", "612345678").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Primeira letra maiúscula (ex: "Juan", "Madrid").
    pub fn is_capitalized(&self) -> bool {
        let mut chars = self.text.chars();
        match chars.next() {
            Some(first) => first.is_uppercase() && chars.all(|c| c.is_lowercase()),
            None => false,
        }
    }
}

/// Tokeniza o texto descartando espaços em branco.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bound_indices()
        .filter(|(_, piece)| !piece.trim().is_empty())
        .enumerate()
        .map(|(index, (start, piece))| Token {
            text: piece.to_string(),
            start,
            end: start + piece.len(),
            index,
        })
        .collect()
}

/// Índice do token que contém o byte `offset`, se houver.
pub fn token_at(tokens: &[Token], offset: usize) -> Option<usize> {
    tokens
        .iter()
        .position(|t| t.start <= offset && offset < t.end)
}
