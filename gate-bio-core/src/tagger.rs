//! # Esquema de Tags BIO e Consolidação de Tipos
//!
//! Define as tags **BIO** (Beginning-Inside-Outside) atribuídas a cada token e
//! a política usada para escrevê-las a partir dos spans alinhados.
//!
//! ## Consolidação de Tipos
//!
//! Antes de rotular, tipos quase sinônimos são fundidos num tipo canônico e
//! alguns tipos são descartados:
//!
//! | Tipo no GATE    | Tipo canônico    |
//! |-----------------|------------------|
//! | `UserIDWindows` | `UserIDGeneric`  |
//! | `LastName`      | `FullName`       |
//! | `FirstName`     | `FullName`       |
//! | `Email`         | (descartado)     |
//! | `JobTitle`      | (descartado)     |
//!
//! Qualquer outro tipo passa inalterado.
//!
//! ## Política de Rotulação
//!
//! - Todos os tokens do intervalo recebem `I-TIPO`.
//! - O primeiro token vira `B-TIPO` **somente** quando o token imediatamente
//!   anterior ao intervalo já carrega `I-TIPO`. Isso separa duas entidades
//!   adjacentes do mesmo tipo; uma entidade isolada começa com `I-`.
//! - Os spans são aplicados na ordem das anotações; um span posterior
//!   sobrescreve os rótulos de um anterior nos tokens em comum.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::align::{align_span, TokenRange, TypedSpan};
use crate::error::AlignmentError;
use crate::tokenizer::Token;

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Tag {
    /// **Begin**: primeiro token de uma entidade colada a outra do mesmo tipo.
    Begin(String),
    /// **Inside**: token dentro de uma entidade.
    Inside(String),
    /// **Outside**: o token não faz parte de nenhuma entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-FullName", "I-UserIDGeneric", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(t) => format!("B-{t}"),
            Tag::Inside(t) => format!("I-{t}"),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-FullName" → Begin("FullName"))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, entity_type) = s.split_once('-')?;
        if entity_type.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(Tag::Begin(entity_type.to_string())),
            "I" => Some(Tag::Inside(entity_type.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.label()
    }
}

impl TryFrom<String> for Tag {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Tag::from_label(&s).ok_or_else(|| format!("tag BIO inválida: {s}"))
    }
}

/// Tabela de consolidação: tipo bruto → tipo canônico, ou `None` para descartar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScheme {
    rules: BTreeMap<String, Option<String>>,
}

/// Regras fixas de consolidação.
pub const DEFAULT_LABEL_RULES: &[(&str, Option<&str>)] = &[
    ("UserIDWindows", Some("UserIDGeneric")),
    ("LastName", Some("FullName")),
    ("FirstName", Some("FullName")),
    ("Email", None),
    ("JobTitle", None),
];

impl LabelScheme {
    pub fn new(rules: BTreeMap<String, Option<String>>) -> Self {
        Self { rules }
    }

    /// Tabela padrão, como mapa serializável (usado pela configuração).
    pub fn default_rules() -> BTreeMap<String, Option<String>> {
        DEFAULT_LABEL_RULES
            .iter()
            .map(|(from, to)| (from.to_string(), to.map(str::to_string)))
            .collect()
    }

    /// Tipo canônico de `raw`, ou `None` se o tipo é descartado.
    pub fn consolidate<'a>(&'a self, raw: &'a str) -> Option<&'a str> {
        match self.rules.get(raw) {
            Some(Some(canonical)) => Some(canonical.as_str()),
            Some(None) => None,
            None => Some(raw),
        }
    }

    /// Alinha e rotula todos os spans sobre `tokens`.
    ///
    /// Spans de tipos descartados são pulados antes do alinhamento. Qualquer
    /// falha de alinhamento aborta o documento inteiro.
    pub fn tag(&self, spans: &[TypedSpan], tokens: &[Token]) -> Result<Vec<Tag>, AlignmentError> {
        let mut tags = vec![Tag::Outside; tokens.len()];

        for typed in spans {
            let Some(entity_type) = self.consolidate(&typed.entity_type) else {
                tracing::trace!(entity_type = %typed.entity_type, "tipo descartado");
                continue;
            };
            let range = align_span(typed.span, tokens)?;
            write_range(&mut tags, range, entity_type);
        }

        Ok(tags)
    }
}

impl Default for LabelScheme {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}

/// Escreve `I-TIPO` no intervalo e promove o primeiro token a `B-TIPO` quando
/// o token anterior já é `I-TIPO`.
pub fn write_range(tags: &mut [Tag], range: TokenRange, entity_type: &str) {
    let promote = range.start > 0
        && matches!(&tags[range.start - 1], Tag::Inside(prev) if prev == entity_type);

    tags[range.start..=range.end].fill(Tag::Inside(entity_type.to_string()));
    if promote {
        tags[range.start] = Tag::Begin(entity_type.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::CharSpan;
    use crate::error::AlignmentReason;
    use crate::tokenizer::Tokenizer;

    fn span(start: usize, end_exclusive: usize, entity_type: &str) -> TypedSpan {
        TypedSpan {
            span: CharSpan::from_exclusive(start, end_exclusive),
            entity_type: entity_type.to_string(),
        }
    }

    fn labels(tags: &[Tag]) -> Vec<String> {
        tags.iter().map(Tag::label).collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin("FullName".into()).label(), "B-FullName");
        assert_eq!(Tag::Inside("UserIDGeneric".into()).label(), "I-UserIDGeneric");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-FullName"), Some(Tag::Begin("FullName".into())));
        assert_eq!(Tag::from_label("I-Phone"), Some(Tag::Inside("Phone".into())));
        assert_eq!(Tag::from_label("X-Phone"), None);
        assert_eq!(Tag::from_label("I-"), None);
    }

    #[test]
    fn test_tag_serializes_as_label() {
        let json = serde_json::to_string(&vec![Tag::Outside, Tag::Begin("FullName".into())]).unwrap();
        assert_eq!(json, r#"["O","B-FullName"]"#);
        let back: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[1], Tag::Begin("FullName".into()));
    }

    #[test]
    fn test_consolidation_table() {
        let scheme = LabelScheme::default();
        assert_eq!(scheme.consolidate("UserIDWindows"), Some("UserIDGeneric"));
        assert_eq!(scheme.consolidate("LastName"), Some("FullName"));
        assert_eq!(scheme.consolidate("FirstName"), Some("FullName"));
        assert_eq!(scheme.consolidate("Email"), None);
        assert_eq!(scheme.consolidate("JobTitle"), None);
        assert_eq!(scheme.consolidate("Phone"), Some("Phone"));
    }

    #[test]
    fn test_single_token_gets_inside() {
        let tokens = Tokenizer::new().tokenize("Hello Bob, how are you");
        let tags = LabelScheme::default().tag(&[span(6, 9, "FullName")], &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["O", "I-FullName", "O", "O", "O", "O"]);
    }

    #[test]
    fn test_adjacent_same_type_promotes_to_begin() {
        let tokens = Tokenizer::new().tokenize("John Smith called");
        let spans = [span(0, 4, "FirstName"), span(5, 10, "LastName")];
        let tags = LabelScheme::default().tag(&spans, &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["I-FullName", "B-FullName", "O"]);
    }

    #[test]
    fn test_multi_token_entity_is_all_inside() {
        let tokens = Tokenizer::new().tokenize("ligue para John Smith amanhã");
        let tags = LabelScheme::default().tag(&[span(11, 21, "FullName")], &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["O", "O", "I-FullName", "I-FullName", "O"]);
    }

    #[test]
    fn test_multi_token_promotion_after_same_type() {
        let tokens = Tokenizer::new().tokenize("Ana Maria Souza");
        let spans = [span(0, 3, "FullName"), span(4, 15, "FullName")];
        let tags = LabelScheme::default().tag(&spans, &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["I-FullName", "B-FullName", "I-FullName"]);
    }

    #[test]
    fn test_different_type_does_not_promote() {
        let tokens = Tokenizer::new().tokenize("Bob jsmith01");
        let spans = [span(0, 3, "FullName"), span(4, 12, "UserIDWindows")];
        let tags = LabelScheme::default().tag(&spans, &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["I-FullName", "I-UserIDGeneric"]);
    }

    #[test]
    fn test_dropped_type_leaves_outside() {
        let tokens = Tokenizer::new().tokenize("escreva para bob@example.com hoje");
        let tags = LabelScheme::default().tag(&[span(13, 28, "Email")], &tokens).unwrap();
        assert!(tags.iter().all(|t| *t == Tag::Outside));
    }

    #[test]
    fn test_dropped_type_is_not_aligned() {
        let tokens = Tokenizer::new().tokenize("Hello Bob");
        // início inválido, mas o tipo é descartado antes do alinhamento
        let tags = LabelScheme::default().tag(&[span(7, 9, "JobTitle")], &tokens).unwrap();
        assert_eq!(tags, vec![Tag::Outside, Tag::Outside]);
    }

    #[test]
    fn test_later_span_overwrites_earlier() {
        let tokens = Tokenizer::new().tokenize("Bob Smith");
        let spans = [span(0, 9, "FullName"), span(4, 9, "Phone")];
        let tags = LabelScheme::default().tag(&spans, &tokens).unwrap();
        assert_eq!(labels(&tags), vec!["I-FullName", "I-Phone"]);
    }

    #[test]
    fn test_alignment_failure_aborts() {
        let tokens = Tokenizer::new().tokenize("Hello Bob");
        let spans = [span(6, 9, "FullName"), span(7, 9, "FullName")];
        let err = LabelScheme::default().tag(&spans, &tokens).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::StartNotFound);
    }

    #[test]
    fn test_custom_scheme() {
        let mut rules = BTreeMap::new();
        rules.insert("Phone".to_string(), None);
        let scheme = LabelScheme::new(rules);
        assert_eq!(scheme.consolidate("Phone"), None);
        assert_eq!(scheme.consolidate("LastName"), Some("LastName"));
    }
}
