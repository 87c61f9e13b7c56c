//! # Tipos de Erro
//!
//! O conversor distingue duas classes de falha que o chamador precisa tratar
//! de forma diferente:
//!
//! - [`FormatError`]: o arquivo não tem o formato de uma exportação GATE.
//! - [`AlignmentError`]: os offsets de uma anotação não se encaixam na
//!   segmentação do tokenizador.
//!
//! Ambas abortam o documento inteiro. Quem processa um corpus decide, por
//! documento, se pula ou interrompe.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::CharSpan;

/// Resultado padrão das operações do crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Erro de alto nível que atravessa o pipeline carregar → alinhar → rotular.
#[derive(Error, Debug)]
pub enum Error {
    /// O documento não tem o formato esperado.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Um span não pôde ser alinhado aos tokens.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Erro de leitura do arquivo.
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// Arquivo de configuração inválido.
    #[error("configuração inválida: {0}")]
    Config(#[from] serde_json::Error),

    /// Regra extra de tokenização que não compila como expressão regular.
    #[error("regra de tokenização inválida: {0}")]
    Tokenizer(#[from] regex::Error),
}

/// O documento não tem o formato de uma exportação GATE.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("o arquivo deve ser XML exportado do GATE: {}", .0.display())]
    NotXml(PathBuf),

    #[error("codificação de texto desconhecida: {0}")]
    UnknownEncoding(String),

    #[error("XML malformado: {0}")]
    Malformed(String),

    #[error("elemento raiz <GateDocument> ausente")]
    MissingRoot,

    #[error("o documento tem anotações, mas nenhum texto")]
    AnnotationsWithoutText,

    #[error("atributo `{attribute}` ausente em <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("anotação referencia um nó inexistente: {0}")]
    UnknownNode(String),

    #[error("nó declarado mais de uma vez: {0}")]
    DuplicateNode(String),
}

impl From<quick_xml::Error> for FormatError {
    fn from(err: quick_xml::Error) -> Self {
        FormatError::Malformed(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for FormatError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        FormatError::Malformed(err.to_string())
    }
}

/// Motivo pelo qual um span não foi alinhado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentReason {
    /// Nenhum token começa exatamente no offset inicial do span.
    StartNotFound,
    /// A varredura passou do último token sem achar um fim aceitável.
    LoopBroke,
    /// O span termina antes de começar.
    IndicesIncorrect,
}

impl AlignmentReason {
    /// Código estável do motivo, usado em logs e relatórios.
    pub fn code(&self) -> &'static str {
        match self {
            AlignmentReason::StartNotFound => "char start not set",
            AlignmentReason::LoopBroke => "loop broke",
            AlignmentReason::IndicesIncorrect => "indices are incorrect",
        }
    }
}

impl fmt::Display for AlignmentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Um span de caracteres que não corresponde à segmentação em tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("falha de alinhamento ({reason}) no span {span}")]
pub struct AlignmentError {
    pub reason: AlignmentReason,
    pub span: CharSpan,
}

impl AlignmentError {
    pub fn new(reason: AlignmentReason, span: CharSpan) -> Self {
        Self { reason, span }
    }
}
