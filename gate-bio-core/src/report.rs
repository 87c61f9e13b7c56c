//! # Contagem de Rótulos
//!
//! Frequência de cada rótulo BIO num documento. A contagem de um documento não
//! é cumulativa; para um corpus, some as tabelas com [`LabelCounts::merge`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tabela rótulo → número de ocorrências, em ordem alfabética de rótulo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCounts {
    counts: BTreeMap<String, usize>,
}

impl LabelCounts {
    /// Conta os rótulos de uma sequência já finalizada.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        for label in labels {
            *counts.entry(label.as_ref().to_string()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Ocorrências de `label` (zero se nunca apareceu).
    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Soma as contagens de outra tabela nesta.
    pub fn merge(&mut self, other: &LabelCounts) {
        for (label, n) in &other.counts {
            *self.counts.entry(label.clone()).or_insert(0) += n;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, n)| (l.as_str(), *n))
    }

    /// Número de rótulos distintos.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total de tokens contados.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl From<LabelCounts> for BTreeMap<String, usize> {
    fn from(counts: LabelCounts) -> Self {
        counts.counts
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample Counts")?;
        for (label, n) in self.iter() {
            writeln!(f, "{label} : {n}")?;
        }
        Ok(())
    }
}
