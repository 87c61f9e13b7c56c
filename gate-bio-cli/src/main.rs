//! Linha de comando: converte exportações GATE em JSONL no formato BIO

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gate_bio_core::{BioParser, LabelCounts, ParserConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Converte arquivos XML do GATE em pares (tokens, rótulos BIO).
#[derive(Parser, Debug)]
#[command(name = "gate-bio", version, about)]
struct Cli {
    /// Arquivos `.xml` ou diretórios com exportações do GATE
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Arquivo JSONL de saída (padrão: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuração em JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Codificação dos arquivos (sobrescreve a configuração)
    #[arg(long)]
    encoding: Option<String>,

    /// Nome do AnnotationSet a usar (sobrescreve a configuração)
    #[arg(long)]
    annotation_set: Option<String>,

    /// Emite uma linha por sentença em vez de uma por documento
    #[arg(long)]
    by_sentence: bool,

    /// Interrompe no primeiro documento com erro
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_json_file(path)
            .with_context(|| format!("falha ao ler configuração {}", path.display()))?,
        None => ParserConfig::default(),
    };
    if let Some(encoding) = &cli.encoding {
        config.encoding = encoding.clone();
    }
    if let Some(name) = &cli.annotation_set {
        config.annotation_set = Some(name.clone());
    }

    let parser = BioParser::from_config(config)?;
    let paths = collect_inputs(&cli.inputs)?;
    info!("Convertendo {} documento(s)", paths.len());

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("falha ao criar {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut totals = LabelCounts::default();
    let mut failures = 0usize;

    for outcome in parser.convert_corpus(&paths) {
        let bio = match outcome.result {
            Ok(Some(bio)) => bio,
            Ok(None) => {
                warn!("Sem texto para anotar em {}", outcome.path.display());
                continue;
            }
            Err(err) if cli.fail_fast => {
                return Err(err).with_context(|| format!("falha em {}", outcome.path.display()));
            }
            Err(err) => {
                warn!("Documento ignorado {}: {}", outcome.path.display(), err);
                failures += 1;
                continue;
            }
        };

        let records = if cli.by_sentence {
            bio.sentence_records()
        } else {
            vec![bio.to_record()]
        };
        for record in records {
            serde_json::to_writer(&mut out, &record)?;
            out.write_all(b"\n")?;
        }
        totals.merge(&bio.label_counts());
    }
    out.flush()?;

    // com saída em stdout, as contagens vão para stderr para não misturar com o JSONL
    if cli.output.is_some() {
        print!("{totals}");
    } else {
        eprint!("{totals}");
    }

    if failures > 0 {
        warn!("{} documento(s) com erro", failures);
    }
    Ok(())
}

/// Expande diretórios em seus arquivos `.xml`, em ordem alfabética.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("falha ao listar {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_xml(p))
                .collect();
            found.sort();
            paths.extend(found);
        } else if input.exists() {
            paths.push(input.clone());
        } else {
            bail!("entrada não encontrada: {}", input.display());
        }
    }
    Ok(paths)
}

fn is_xml(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"))
}
