//! # Configuração do Conversor
//!
//! Todos os campos têm padrão, então um arquivo JSON pode trazer só o que
//! muda:
//!
//! ```json
//! { "encoding": "utf-8", "annotation_set": "Key" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tagger::LabelScheme;

/// Codificação padrão das exportações do GATE.
pub const DEFAULT_ENCODING: &str = "windows-1252";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Rótulo WHATWG da codificação do arquivo (ex: "windows-1252", "utf-8").
    pub encoding: String,
    /// Nome do `AnnotationSet` a usar. Sem nome, vale o primeiro conjunto não vazio.
    pub annotation_set: Option<String>,
    /// Sequências extras que o tokenizador sempre separa.
    pub extra_infixes: Vec<String>,
    /// Tipo bruto → tipo canônico (`null` descarta o tipo).
    pub labels: BTreeMap<String, Option<String>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            annotation_set: None,
            extra_infixes: Vec::new(),
            labels: LabelScheme::default_rules(),
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn label_scheme(&self) -> LabelScheme {
        LabelScheme::new(self.labels.clone())
    }
}
