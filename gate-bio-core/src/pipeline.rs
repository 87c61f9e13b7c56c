//! # Pipeline GATE → BIO
//!
//! Conecta os estágios na ordem:
//!
//! 1. **Leitura** ([`Document`]): anotações, nós e texto.
//! 2. **Tokenização** ([`Tokenizer`]): tokens com offsets de caractere.
//! 3. **Alinhamento e rotulação** ([`LabelScheme::tag`]): spans → intervalos de
//!    tokens → tags BIO.
//! 4. **Contagem** ([`LabelCounts`]).
//!
//! O [`BioParser`] é dono do tokenizador e da tabela de consolidação. Ambos são
//! imutáveis depois da construção, então a mesma instância converte um corpus
//! inteiro em paralelo ([`BioParser::convert_corpus`]).

use std::ops::Range;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::align::TypedSpan;
use crate::config::ParserConfig;
use crate::document::Document;
use crate::error::{AlignmentError, Result};
use crate::report::LabelCounts;
use crate::tagger::{LabelScheme, Tag};
use crate::tokenizer::{Token, Tokenizer};

/// Resultado BIO de um documento: uma tag por token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioDocument {
    pub tokens: Vec<Token>,
    pub tags: Vec<Tag>,
    /// Intervalos de índices de tokens de cada sentença, em ordem.
    pub sentences: Vec<Range<usize>>,
}

/// Forma serializada: tokens e rótulos como listas paralelas de strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioRecord {
    pub tokens: Vec<String>,
    pub labels: Vec<String>,
}

impl BioDocument {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.tags.iter().map(Tag::label).collect()
    }

    /// Par `(tokens, rótulos)` do documento inteiro.
    pub fn to_record(&self) -> BioRecord {
        self.record(0..self.tokens.len())
    }

    /// Um registro por sentença.
    pub fn sentence_records(&self) -> Vec<BioRecord> {
        self.sentences.iter().map(|r| self.record(r.clone())).collect()
    }

    pub fn label_counts(&self) -> LabelCounts {
        LabelCounts::from_labels(self.tags.iter().map(Tag::label))
    }

    fn record(&self, range: Range<usize>) -> BioRecord {
        BioRecord {
            tokens: self.tokens[range.clone()].iter().map(|t| t.text.clone()).collect(),
            labels: self.tags[range].iter().map(Tag::label).collect(),
        }
    }
}

/// Resultado da conversão de um arquivo do corpus.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    /// `Ok(None)`: documento sem texto, nada a rotular.
    pub result: Result<Option<BioDocument>>,
}

/// O conversor principal.
#[derive(Debug, Clone)]
pub struct BioParser {
    config: ParserConfig,
    tokenizer: Tokenizer,
    scheme: LabelScheme,
}

impl BioParser {
    /// Conversor com a configuração padrão.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
            tokenizer: Tokenizer::new(),
            scheme: LabelScheme::default(),
        }
    }

    pub fn from_config(config: ParserConfig) -> Result<Self> {
        let tokenizer = Tokenizer::builder()
            .extra_infixes(config.extra_infixes.iter().cloned())
            .build()?;
        let scheme = config.label_scheme();
        Ok(Self {
            config,
            tokenizer,
            scheme,
        })
    }

    /// Rotula um texto com spans já resolvidos.
    ///
    /// Sem spans, todos os tokens ficam `O`.
    pub fn convert_text(&self, text: &str, spans: &[TypedSpan]) -> std::result::Result<BioDocument, AlignmentError> {
        let tokens = self.tokenizer.tokenize(text);
        let tags = self.scheme.tag(spans, &tokens)?;
        let sentences = group_sentences(&tokens, &self.tokenizer.sentence_ranges(text));
        Ok(BioDocument {
            tokens,
            tags,
            sentences,
        })
    }

    /// Converte um documento já carregado. `Ok(None)` se ele não tem texto.
    pub fn convert_document(&self, document: &Document) -> Result<Option<BioDocument>> {
        let Some(text) = document.text.as_deref() else {
            return Ok(None);
        };
        let spans = document.spans(&self.scheme)?;
        let bio = self.convert_text(text, &spans)?;
        tracing::debug!(tokens = bio.len(), spans = spans.len(), "documento rotulado");
        Ok(Some(bio))
    }

    /// Carrega e converte um arquivo.
    pub fn convert_path(&self, path: impl AsRef<Path>) -> Result<Option<BioDocument>> {
        let path = path.as_ref();
        let document = Document::load(path, &self.config)?;
        self.convert_document(&document).map_err(|err| {
            tracing::debug!(path = %path.display(), error = %err, "falha na conversão");
            err
        })
    }

    /// Converte vários arquivos em paralelo, cada um com falha independente.
    ///
    /// Os resultados voltam na ordem de `paths`.
    pub fn convert_corpus<P>(&self, paths: &[P]) -> Vec<DocumentOutcome>
    where
        P: AsRef<Path> + Sync,
    {
        let outcomes: Vec<DocumentOutcome> = paths
            .par_iter()
            .map(|p| DocumentOutcome {
                path: p.as_ref().to_path_buf(),
                result: self.convert_path(p),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(documents = outcomes.len(), failed, "corpus convertido");
        outcomes
    }
}

impl Default for BioParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Agrupa tokens por sentença: cada token pertence à sentença onde começa.
fn group_sentences(tokens: &[Token], sentences: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut first = 0;
    for sentence in sentences {
        let mut last = first;
        while last < tokens.len() && tokens[last].start < sentence.end {
            last += 1;
        }
        if last > first {
            groups.push(first..last);
        }
        first = last;
    }
    if first < tokens.len() {
        groups.push(first..tokens.len());
    }
    groups
}
