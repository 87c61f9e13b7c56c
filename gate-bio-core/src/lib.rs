//! # gate-bio-core — Conversão de Anotações GATE para BIO
//!
//! Este crate transforma anotações de entidades exportadas pelo GATE (offsets
//! de caracteres num XML com texto plano e marcadores `<Node/>`) em sequências
//! de rótulos **BIO** alinhadas a tokens, prontas para treinar modelos de
//! rotulação de sequências.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Leitura** ([`document`]): XML → anotações, nós e texto.
//! 2.  **Tokenização** ([`tokenizer`]): texto → tokens com offsets de caractere.
//! 3.  **Alinhamento** ([`align`]): spans de caracteres → intervalos de tokens.
//! 4.  **Rotulação** ([`tagger`]): consolidação de tipos e escrita das tags BIO.
//! 5.  **Contagem** ([`report`]): frequência de cada rótulo.
//!
//! O [`pipeline`] conecta tudo e a configuração fica em [`config`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use gate_bio_core::{BioParser, Document};
//!
//! let xml = r#"<GateDocument>
//! <TextWithNodes><Node id="0"/>Hello <Node id="6"/>Bob<Node id="9"/>, how are you</TextWithNodes>
//! <AnnotationSet><Annotation Type="FullName" StartNode="6" EndNode="9"/></AnnotationSet>
//! </GateDocument>"#;
//!
//! let document = Document::parse(xml, None).unwrap();
//! let bio = BioParser::new().convert_document(&document).unwrap().unwrap();
//!
//! assert_eq!(bio.token_texts(), ["Hello", "Bob", ",", "how", "are", "you"]);
//! assert_eq!(bio.labels(), ["O", "I-FullName", "O", "O", "O", "O"]);
//! println!("{}", bio.label_counts());
//! ```

pub mod align;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod tagger;
pub mod tokenizer;

pub use align::{align_span, CharSpan, TokenRange, TypedSpan};
pub use config::ParserConfig;
pub use document::{Annotation, AnnotationSet, AnnotationSets, Document, Node};
pub use error::{AlignmentError, AlignmentReason, Error, FormatError, Result};
pub use pipeline::{BioDocument, BioParser, BioRecord, DocumentOutcome};
pub use report::LabelCounts;
pub use tagger::{LabelScheme, Tag};
pub use tokenizer::{Token, Tokenizer};
