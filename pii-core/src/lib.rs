//! # pii-core: Detecção e anonimização de dados pessoais
//!
//! Este crate implementa o núcleo de um gateway DLP (Data Loss Prevention) para
//! textos em espanhol: antes de um texto sair para um serviço externo, ele é
//! analisado, os dados pessoais são substituídos e o envio é classificado como
//! bloqueado ou seguro.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Motor NLP** ([`nlp`]): Tokenização ([`tokenizer`]) e entidades nomeadas (PERSON, LOCATION).
//! 3.  **Reconhecedores** ([`recognizer`], [`predefined`]): Regras regex, com validadores e
//!     palavras de contexto, registradas em um [`registry::RecognizerRegistry`]. O detector de
//!     DNI (`\b\d{8}[A-Z]\b`, score 0.95) é injetado no registro na montagem dos motores.
//! 4.  **Análise** ([`analyzer`]): Executa os reconhecedores e remove duplicatas.
//! 5.  **Anonimização** ([`anonymizer`]): Reescreve os spans por operador (replace, redact, mask, keep).
//! 6.  **Saída** ([`pipeline`]): [`ScanReport`] com veredito `BLOCKED`/`SAFE`.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use pii_core::{EngineConfig, Engines, ScanPipeline, Verdict};
//!
//! let engines = Engines::load(&EngineConfig::default()).expect("modelo embutido");
//! let pipeline = ScanPipeline::new(Arc::new(engines));
//!
//! let report = pipeline.scan("DNI 98765432K").unwrap();
//! assert_eq!(report.verdict, Verdict::Blocked);
//! assert_eq!(report.sanitized.text, "DNI <ES_DNI>");
//! ```

pub mod analyzer;
pub mod anonymizer;
pub mod demo;
pub mod engines;
pub mod entity;
pub mod error;
pub mod nlp;
pub mod pipeline;
pub mod predefined;
pub mod recognizer;
pub mod registry;
pub mod tokenizer;

pub use analyzer::AnalyzerEngine;
pub use anonymizer::{AnonymizerEngine, EngineResult, OperatorConfig};
pub use engines::{EngineConfig, Engines};
pub use entity::EntityMatch;
pub use error::{AnalyzerError, AnonymizerError, EngineError, PipelineError, RecognizerError};
pub use pipeline::{ScanEvent, ScanPipeline, ScanReport, Verdict};
