//! # Tokenizador com Offsets de Caracteres
//!
//! Divide o texto do documento em tokens e registra, para cada um, a posição
//! do primeiro e do último caractere no texto original. Essas posições estão
//! no mesmo espaço de coordenadas dos nós do GATE, o que permite alinhar as
//! anotações aos tokens.
//!
//! ## Esquema de Tokenização
//!
//! 1. O texto é cortado em blocos separados por espaço em branco.
//! 2. De cada bloco são removidos **prefixos** (abre-parênteses, aspas) e
//!    **sufixos** (fecha-parênteses, aspas, pontuação final), repetidamente.
//! 3. O miolo restante é quebrado nos **infixos** (barras, setas, colchetes...).
//!
//! As regras padrão são estendidas com [`ADDITIONAL_INFIXES`], caracteres que
//! a ferramenta de anotação trata como fronteira em identificadores técnicos
//! (ex: `C:\Users\joao` ou `host->porta`).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use gate_bio_core::tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::new();
//! let tokens = tokenizer.tokenize("Hello Bob, how are you");
//!
//! // "Hello", "Bob", ",", "how", "are", "you"
//! assert_eq!(tokens[1].text, "Bob");
//! assert_eq!((tokens[1].start, tokens[1].end), (6, 8));
//! ```

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
///
/// Os offsets contam caracteres (não bytes), como os nós do GATE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "Bob", ",", "->").
    pub text: String,
    /// Offset do primeiro caractere (inclusivo).
    pub start: usize,
    /// Offset do último caractere (inclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Prefixos separados do início de cada bloco.
const PREFIXES: &[&str] = &["(", "[", "{", "<", "\"", "'", "«", "“", "‘", "¿", "¡"];

/// Sufixos separados do fim de cada bloco.
const SUFFIXES: &[&str] = &[
    "...", "…", ")", "]", "}", ">", "\"", "'", "»", "”", "’", ".", ",", ";", ":", "!", "?", "%",
];

/// Infixos padrão.
const INFIXES: &[&str] = &["--", "…"];

/// Setas: tokens próprios mesmo na borda de um bloco, onde vencem os
/// prefixos e sufixos de um caractere (`<`, `>`).
const ARROWS: &[&str] = &["->", "=>", "<-"];

/// Fronteiras adicionais exigidas pelas anotações (barras, setas, colchetes e pontuação).
pub const ADDITIONAL_INFIXES: &[&str] = &[
    "->", "=>", "<-", "/", "\\", "|", "=", ":", ";", ",", "(", ")", "[", "]", "{", "}", "<", ">",
];

/// Tokenizador configurado uma única vez e imutável depois disso.
///
/// Todos os métodos recebem `&self`, então a mesma instância pode ser
/// compartilhada entre threads que convertem documentos diferentes.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    chunk: Regex,
    prefix: Regex,
    suffix: Regex,
    infix: Regex,
}

/// Monta um [`Tokenizer`] com fronteiras extras além das padrão.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    extra_infixes: Vec<String>,
}

impl TokenizerBuilder {
    /// Acrescenta uma sequência literal que sempre vira um token à parte.
    pub fn extra_infix(mut self, infix: impl Into<String>) -> Self {
        let infix = infix.into();
        if !infix.is_empty() {
            self.extra_infixes.push(infix);
        }
        self
    }

    pub fn extra_infixes<I, S>(self, infixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        infixes.into_iter().fold(self, |b, i| b.extra_infix(i))
    }

    pub fn build(self) -> Result<Tokenizer, regex::Error> {
        let infixes: Vec<&str> = INFIXES
            .iter()
            .chain(ADDITIONAL_INFIXES)
            .copied()
            .chain(self.extra_infixes.iter().map(String::as_str))
            .collect();

        let prefixes: Vec<&str> = PREFIXES.iter().chain(ARROWS).copied().collect();
        let suffixes: Vec<&str> = SUFFIXES.iter().chain(ARROWS).copied().collect();

        Ok(Tokenizer {
            chunk: Regex::new(r"\S+")?,
            prefix: Regex::new(&format!("^(?:{})", alternation(&prefixes)))?,
            suffix: Regex::new(&format!("(?:{})$", alternation(&suffixes)))?,
            infix: Regex::new(&alternation(&infixes))?,
        })
    }
}

/// Alternância de literais, do mais longo ao mais curto, para que "->" vença "-".
fn alternation(literals: &[&str]) -> String {
    let mut sorted: Vec<&str> = literals.to_vec();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    sorted.dedup();
    sorted
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|")
}

impl Tokenizer {
    /// Tokenizador com as regras padrão mais [`ADDITIONAL_INFIXES`].
    pub fn new() -> Self {
        TokenizerBuilder::default()
            .build()
            .expect("as regras embutidas são literais escapados")
    }

    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    /// Tokeniza o texto, preservando os offsets de caractere de cada token.
    ///
    /// Determinístico: o mesmo texto sempre produz a mesma sequência.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let char_at = char_offsets(text);
        let mut pieces: Vec<Range<usize>> = Vec::new();

        for chunk in self.chunk.find_iter(text) {
            self.split_chunk(text, chunk.range(), &mut pieces);
        }

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| Token {
                text: text[bytes.clone()].to_string(),
                start: char_at[bytes.start],
                end: char_at[bytes.end] - 1,
                index,
            })
            .collect()
    }

    /// Quebra um bloco sem espaços em prefixos, miolo (dividido por infixos) e sufixos.
    fn split_chunk(&self, text: &str, chunk: Range<usize>, out: &mut Vec<Range<usize>>) {
        let (mut lo, mut hi) = (chunk.start, chunk.end);
        let mut suffixes = Vec::new();

        while lo < hi {
            let rest = &text[lo..hi];
            if let Some(m) = self.prefix.find(rest) {
                out.push(lo..lo + m.end());
                lo += m.end();
            } else if let Some(m) = self.suffix.find(rest) {
                suffixes.push(lo + m.start()..hi);
                hi = lo + m.start();
            } else {
                break;
            }
        }

        let mut cursor = lo;
        for m in self.infix.find_iter(&text[lo..hi]) {
            let (start, end) = (lo + m.start(), lo + m.end());
            if start > cursor {
                out.push(cursor..start);
            }
            out.push(start..end);
            cursor = end;
        }
        if cursor < hi {
            out.push(cursor..hi);
        }

        out.extend(suffixes.into_iter().rev());
    }

    /// Intervalos de caracteres (fim exclusivo) de cada sentença do texto.
    ///
    /// Usa as fronteiras de sentença do Unicode (UAX #29). Serve apenas para
    /// agrupar a saída; o alinhamento trabalha sobre o documento inteiro.
    pub fn sentence_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let char_at = char_offsets(text);
        text.split_sentence_bound_indices()
            .filter(|(_, s)| !s.trim().is_empty())
            .map(|(b, s)| char_at[b]..char_at[b + s.len()])
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tabela byte → índice de caractere, com uma entrada extra para `text.len()`.
fn char_offsets(text: &str) -> Vec<usize> {
    let mut table = vec![0; text.len() + 1];
    let mut count = 0;
    for (byte, ch) in text.char_indices() {
        for slot in &mut table[byte..byte + ch.len_utf8()] {
            *slot = count;
        }
        count += 1;
    }
    table[text.len()] = count;
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_basic_sentence() {
        let tokens = Tokenizer::new().tokenize("Hello Bob, how are you");
        assert_eq!(texts(&tokens), vec!["Hello", "Bob", ",", "how", "are", "you"]);
        assert_eq!((tokens[2].start, tokens[2].end), (9, 9));
        assert_eq!((tokens[5].start, tokens[5].end), (19, 21));
    }

    #[test]
    fn test_end_offset_is_inclusive() {
        let tokens = Tokenizer::new().tokenize("a bc");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 0));
        assert_eq!((tokens[1].start, tokens[1].end), (2, 3));
    }

    #[test]
    fn test_additional_infixes_split_technical_tokens() {
        let tokens = Tokenizer::new().tokenize("C:\\Users\\joao ligou host->porta em a/b");
        assert_eq!(
            texts(&tokens),
            vec!["C", ":", "\\", "Users", "\\", "joao", "ligou", "host", "->", "porta", "em", "a", "/", "b"]
        );
    }

    #[test]
    fn test_arrows_stay_whole_at_chunk_edges() {
        let tokens = Tokenizer::new().tokenize("a -> b => c <- d host->");
        assert_eq!(
            texts(&tokens),
            vec!["a", "->", "b", "=>", "c", "<-", "d", "host", "->"]
        );
        assert_eq!((tokens[1].start, tokens[1].end), (2, 3));
        assert_eq!((tokens[8].start, tokens[8].end), (21, 22));
    }

    #[test]
    fn test_prefixes_and_suffixes() {
        let tokens = Tokenizer::new().tokenize("(\"Fim...\")");
        assert_eq!(texts(&tokens), vec!["(", "\"", "Fim", "...", "\"", ")"]);
    }

    #[test]
    fn test_offsets_count_characters_not_bytes() {
        let tokens = Tokenizer::new().tokenize("São Paulo");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 2));
        assert_eq!((tokens[1].start, tokens[1].end), (4, 8));
    }

    #[test]
    fn test_indices_are_sequential() {
        let tokens = Tokenizer::new().tokenize("um, dois; três.");
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.index, i);
        }
    }

    #[test]
    fn test_builder_extra_infix() {
        let tokenizer = Tokenizer::builder().extra_infix("~").build().unwrap();
        let tokens = tokenizer.tokenize("a~b");
        assert_eq!(texts(&tokens), vec!["a", "~", "b"]);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let tokenizer = Tokenizer::new();
        let text = "Ticket #42: reset senha/usuário => ok.";
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn test_empty_text() {
        assert!(Tokenizer::new().tokenize("").is_empty());
        assert!(Tokenizer::new().tokenize("  \n ").is_empty());
    }

    #[test]
    fn test_sentence_ranges() {
        let ranges = Tokenizer::new().sentence_ranges("Oi Bob. Tudo bem?");
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[1].start, 8);
    }
}
