//! # Leitura de Documentos GATE
//!
//! Uma exportação do GATE tem este formato:
//!
//! ```xml
//! <GateDocument>
//!   <TextWithNodes><Node id="0"/>Hello <Node id="6"/>Bob<Node id="9"/>, how are you</TextWithNodes>
//!   <AnnotationSet Name="Key">
//!     <Annotation Id="1" Type="FullName" StartNode="6" EndNode="9"/>
//!   </AnnotationSet>
//! </GateDocument>
//! ```
//!
//! O texto é o conteúdo de `TextWithNodes` sem as marcações; cada `<Node/>`
//! marca um offset de caractere nesse texto. As anotações referenciam um par
//! de nós (início inclusivo, fim exclusivo).
//!
//! O XML é lido em streaming com `quick-xml`: não há árvore genérica
//! intermediária, só os três artefatos que interessam (anotações, nós e texto).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::align::{CharSpan, TypedSpan};
use crate::config::ParserConfig;
use crate::error::{FormatError, Result};
use crate::tagger::LabelScheme;

/// Marcador de offset de caractere dentro de `TextWithNodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub offset: usize,
}

/// Uma anotação tipada: par de nós (início, fim) e o tipo bruto do GATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub start_node: String,
    pub end_node: String,
    pub entity_type: String,
}

/// Um `<AnnotationSet>` do documento.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    /// Atributo `Name` (o conjunto padrão do GATE não tem nome).
    pub name: Option<String>,
    pub annotations: Vec<Annotation>,
}

/// Os conjuntos de anotações encontrados, normalizados uma única vez.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSets {
    NoAnnotations,
    Single(AnnotationSet),
    Multiple(Vec<AnnotationSet>),
}

impl AnnotationSets {
    pub fn from_sets(mut sets: Vec<AnnotationSet>) -> Self {
        match sets.len() {
            0 => AnnotationSets::NoAnnotations,
            1 => AnnotationSets::Single(sets.remove(0)),
            _ => AnnotationSets::Multiple(sets),
        }
    }

    /// Escolhe as anotações do documento.
    ///
    /// Com `name`, usa o conjunto com esse nome. Sem nome, usa o primeiro
    /// conjunto que de fato tem anotações (algumas exportações trazem um
    /// conjunto padrão vazio seguido do conjunto preenchido). Se nenhum
    /// servir, o documento não tem anotações.
    pub fn select(self, name: Option<&str>) -> Vec<Annotation> {
        let sets = match self {
            AnnotationSets::NoAnnotations => return Vec::new(),
            AnnotationSets::Single(set) => vec![set],
            AnnotationSets::Multiple(sets) => sets,
        };

        sets.into_iter()
            .find(|set| match name {
                Some(name) => set.name.as_deref() == Some(name),
                None => !set.annotations.is_empty(),
            })
            .map(|set| set.annotations)
            .unwrap_or_default()
    }
}

/// Documento GATE carregado. Imutável depois da leitura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Anotações do conjunto escolhido, na ordem do arquivo.
    pub annotations: Vec<Annotation>,
    /// Nós em ordem de documento.
    pub nodes: Vec<Node>,
    /// Texto de `TextWithNodes`; `None` se o elemento não existe.
    pub text: Option<String>,
    node_offsets: HashMap<String, usize>,
}

impl Document {
    /// Lê e decodifica um arquivo exportado do GATE.
    ///
    /// O arquivo precisa ter extensão `.xml`. Os bytes são decodificados com
    /// `config.encoding` (por padrão Windows-1252, como nas exportações
    /// originais).
    pub fn load(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Self> {
        let path = path.as_ref();
        let is_xml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"));
        if !is_xml {
            return Err(FormatError::NotXml(path.to_path_buf()).into());
        }

        let encoding = Encoding::for_label(config.encoding.as_bytes())
            .ok_or_else(|| FormatError::UnknownEncoding(config.encoding.clone()))?;

        let bytes = fs::read(path)?;
        let (xml, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            tracing::warn!(path = %path.display(), encoding = encoding.name(), "bytes inválidos substituídos na decodificação");
        }

        Ok(Self::parse(&xml, config.annotation_set.as_deref())?)
    }

    /// Interpreta o XML já decodificado.
    pub fn parse(xml: &str, annotation_set: Option<&str>) -> std::result::Result<Self, FormatError> {
        let raw = RawDocument::read(xml)?;
        let annotations = AnnotationSets::from_sets(raw.sets).select(annotation_set);

        if !annotations.is_empty() && raw.text.is_none() {
            return Err(FormatError::AnnotationsWithoutText);
        }

        tracing::debug!(
            nodes = raw.nodes.len(),
            annotations = annotations.len(),
            "documento GATE lido"
        );

        Ok(Self {
            annotations,
            nodes: raw.nodes,
            text: raw.text,
            node_offsets: raw.node_offsets,
        })
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    /// Offset de caractere do nó `id`.
    pub fn node_offset(&self, id: &str) -> Option<usize> {
        self.node_offsets.get(id).copied()
    }

    /// Converte cada anotação no span de caracteres que ela delimita.
    ///
    /// Anotações de tipos que `scheme` descarta são ignoradas antes de
    /// resolver os nós, então um nó inválido nelas não afeta o documento.
    /// Spans invertidos são mantidos; quem os rejeita é o alinhamento.
    pub fn spans(&self, scheme: &LabelScheme) -> std::result::Result<Vec<TypedSpan>, FormatError> {
        self.annotations
            .iter()
            .filter(|a| scheme.consolidate(&a.entity_type).is_some())
            .map(|a| {
                Ok(TypedSpan {
                    span: CharSpan::from_exclusive(self.resolve(&a.start_node)?, self.resolve(&a.end_node)?),
                    entity_type: a.entity_type.clone(),
                })
            })
            .collect()
    }

    fn resolve(&self, id: &str) -> std::result::Result<usize, FormatError> {
        self.node_offset(id)
            .ok_or_else(|| FormatError::UnknownNode(id.to_string()))
    }
}

/// Estado da leitura em streaming.
#[derive(Default)]
struct RawDocument {
    root_seen: bool,
    in_text: bool,
    offset: usize,
    text: Option<String>,
    nodes: Vec<Node>,
    node_offsets: HashMap<String, usize>,
    current_set: Option<AnnotationSet>,
    sets: Vec<AnnotationSet>,
}

impl RawDocument {
    fn read(xml: &str) -> std::result::Result<Self, FormatError> {
        let mut reader = Reader::from_str(xml);
        let mut doc = RawDocument::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => doc.open(&e, false)?,
                Event::Empty(e) => doc.open(&e, true)?,
                Event::End(e) => match e.name().as_ref() {
                    b"TextWithNodes" => doc.in_text = false,
                    b"AnnotationSet" => {
                        if let Some(set) = doc.current_set.take() {
                            doc.sets.push(set);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) if doc.in_text => doc.push_text(&t.unescape()?),
                Event::CData(c) if doc.in_text => {
                    doc.push_text(&String::from_utf8_lossy(&c.into_inner()))
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !doc.root_seen {
            return Err(FormatError::MissingRoot);
        }
        Ok(doc)
    }

    fn open(&mut self, e: &BytesStart, empty: bool) -> std::result::Result<(), FormatError> {
        let name = e.name();
        if !self.root_seen {
            if name.as_ref() != b"GateDocument" {
                return Err(FormatError::MissingRoot);
            }
            self.root_seen = true;
            return Ok(());
        }

        match name.as_ref() {
            b"TextWithNodes" => {
                self.text.get_or_insert_with(String::new);
                self.in_text = !empty;
            }
            b"Node" if self.in_text => {
                let id = required(e, "Node", "id")?;
                if self.node_offsets.insert(id.clone(), self.offset).is_some() {
                    return Err(FormatError::DuplicateNode(id));
                }
                self.nodes.push(Node { id, offset: self.offset });
            }
            b"AnnotationSet" => {
                let set = AnnotationSet {
                    name: attribute(e, "Name")?,
                    annotations: Vec::new(),
                };
                if empty {
                    self.sets.push(set);
                } else {
                    self.current_set = Some(set);
                }
            }
            b"Annotation" => {
                if let Some(set) = self.current_set.as_mut() {
                    set.annotations.push(Annotation {
                        start_node: required(e, "Annotation", "StartNode")?,
                        end_node: required(e, "Annotation", "EndNode")?,
                        entity_type: required(e, "Annotation", "Type")?,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_text(&mut self, chunk: &str) {
        self.offset += chunk.chars().count();
        self.text.get_or_insert_with(String::new).push_str(chunk);
    }
}

fn attribute(e: &BytesStart, key: &str) -> std::result::Result<Option<String>, FormatError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required(
    e: &BytesStart,
    element: &'static str,
    key: &'static str,
) -> std::result::Result<String, FormatError> {
    attribute(e, key)?.ok_or(FormatError::MissingAttribute {
        element,
        attribute: key,
    })
}
