//! # Alinhamento de Spans de Caracteres a Tokens
//!
//! As anotações do GATE são intervalos de caracteres produzidos pela
//! segmentação da própria ferramenta de anotação. Aqui cada intervalo é
//! convertido no intervalo de tokens `[início, fim]` (ambos inclusivos) que ele
//! cobre na segmentação do [`Tokenizer`](crate::tokenizer::Tokenizer).
//!
//! ## Algoritmo
//!
//! 1. **Início**: o token cujo `start` é igual ao início do span. Sem
//!    correspondência exata o span é rejeitado; o início nunca é adivinhado.
//! 2. **Fim**: a partir do token inicial, avança enquanto `token.end < span.end`
//!    e para no primeiro token com `token.end >= span.end`.
//! 3. **Recuperação**: se a varredura passar do último token, aceita o último
//!    token quando `span.end - 1 <= último.end` (diferença de um caractere no
//!    final, típica de pontuação ou espaço). Caso contrário, falha.
//! 4. **Consistência**: span invertido (início depois do fim) é erro, antes
//!    mesmo de procurar o token inicial.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlignmentError, AlignmentReason};
use crate::tokenizer::Token;

/// Intervalo de caracteres no texto do documento, com **fim inclusivo**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharSpan {
    /// Offset do primeiro caractere.
    pub start: usize,
    /// Offset do último caractere.
    pub end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Converte um intervalo com fim exclusivo (convenção dos nós do GATE).
    ///
    /// Um span de largura zero passa a cobrir o caractere inicial. Um
    /// intervalo invertido continua invertido, para que [`align_span`] o rejeite.
    pub fn from_exclusive(start: usize, end: usize) -> Self {
        Self {
            start,
            end: if end > start { end - 1 } else { end },
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for CharSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Um span de caracteres com o tipo de entidade bruto, como veio do GATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSpan {
    pub span: CharSpan,
    pub entity_type: String,
}

/// Intervalo de índices de tokens, ambos inclusivos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    /// Entidade de um único token.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

/// Resolve um span de caracteres para o intervalo de tokens que ele cobre.
///
/// `tokens` deve estar em ordem crescente de offset, como sai do tokenizador.
///
/// # Erros
/// - [`AlignmentReason::StartNotFound`]: nenhum token começa em `span.start`.
/// - [`AlignmentReason::LoopBroke`]: o span termina mais de um caractere
///   depois do último token.
/// - [`AlignmentReason::IndicesIncorrect`]: intervalo invertido.
pub fn align_span(span: CharSpan, tokens: &[Token]) -> Result<TokenRange, AlignmentError> {
    if span.is_reversed() {
        return Err(AlignmentError::new(AlignmentReason::IndicesIncorrect, span));
    }

    let start = tokens
        .binary_search_by_key(&span.start, |t| t.start)
        .map_err(|_| AlignmentError::new(AlignmentReason::StartNotFound, span))?;

    let mut end = start;
    while end < tokens.len() && tokens[end].end < span.end {
        end += 1;
    }

    if end == tokens.len() {
        // `end` saiu da sequência: `end - 1` é o último token examinado
        let last = &tokens[end - 1];
        if span.end - 1 <= last.end {
            end -= 1;
        } else {
            return Err(AlignmentError::new(AlignmentReason::LoopBroke, span));
        }
    }

    tracing::trace!(%span, start, end, "span alinhado");
    Ok(TokenRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn tokens(text: &str) -> Vec<Token> {
        Tokenizer::new().tokenize(text)
    }

    #[test]
    fn test_single_token_span() {
        let toks = tokens("Hello Bob, how are you");
        let range = align_span(CharSpan::from_exclusive(6, 9), &toks).unwrap();
        assert_eq!(range, TokenRange { start: 1, end: 1 });
        assert!(range.is_single());
    }

    #[test]
    fn test_multi_token_span() {
        let toks = tokens("John Smith called");
        let range = align_span(CharSpan::from_exclusive(0, 10), &toks).unwrap();
        assert_eq!(range, TokenRange { start: 0, end: 1 });
        assert!(!range.is_single());
    }

    #[test]
    fn test_end_inside_token_extends_to_token_end() {
        let toks = tokens("John Smithson called");
        // "John Smith" termina no meio de "Smithson"
        let range = align_span(CharSpan::from_exclusive(0, 10), &toks).unwrap();
        assert_eq!(range, TokenRange { start: 0, end: 1 });
    }

    #[test]
    fn test_recovers_one_char_past_last_token() {
        let toks = tokens("Hello Bob");
        // último token "Bob" termina em 8; o span termina em 9
        let range = align_span(CharSpan::new(6, 9), &toks).unwrap();
        assert_eq!(range, TokenRange { start: 1, end: 1 });
    }

    #[test]
    fn test_loop_broke_beyond_recovery() {
        let toks = tokens("Hello Bob");
        let err = align_span(CharSpan::new(6, 10), &toks).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::LoopBroke);
    }

    #[test]
    fn test_unresolvable_start() {
        let toks = tokens("Hello Bob, how are you");
        // começa no meio de "Bob"
        let err = align_span(CharSpan::from_exclusive(7, 9), &toks).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::StartNotFound);
        assert_eq!(err.span, CharSpan::new(7, 8));
    }

    #[test]
    fn test_start_on_whitespace_is_rejected() {
        let toks = tokens("Hello Bob");
        let err = align_span(CharSpan::new(5, 8), &toks).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::StartNotFound);
    }

    #[test]
    fn test_empty_token_sequence() {
        let err = align_span(CharSpan::new(0, 2), &[]).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::StartNotFound);
    }

    #[test]
    fn test_from_exclusive_zero_width() {
        assert_eq!(CharSpan::from_exclusive(4, 4), CharSpan::new(4, 4));
        assert_eq!(CharSpan::from_exclusive(0, 0), CharSpan::new(0, 0));
        assert_eq!(CharSpan::from_exclusive(2, 5), CharSpan::new(2, 4));
        assert_eq!(CharSpan::from_exclusive(4, 0), CharSpan::new(4, 0));
    }

    #[test]
    fn test_reversed_span_is_rejected() {
        let toks = tokens("Hello Bob");
        // "Bob" existe como token, mas o span termina antes de começar
        let err = align_span(CharSpan::from_exclusive(6, 2), &toks).unwrap_err();
        assert_eq!(err.reason, AlignmentReason::IndicesIncorrect);
        assert_eq!(err.span, CharSpan::new(6, 2));
    }
}
