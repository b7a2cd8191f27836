mod backends;
mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lawmate_core::{Document, DocumentInput, DocumentSignals, PatternCatalog, extract_clauses};
use lawmate_store::RecordStore;
use lawmate_pipeline::{Analyzer, CancellationToken};
use tracing::Level;

use crate::backends::BackendArgs;

#[derive(Parser, Debug)]
#[command(name = "lawmate")]
#[command(about = "Legal document verification, summary, and clause extraction")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    backends: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify a document, then summarize it and extract its clauses
    Analyze {
        /// Text or PDF file to analyze
        #[arg(required_unless_present = "text")]
        file: Option<PathBuf>,
        /// Analyze this text instead of a file
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
        /// Do not store the result in the analysis history
        #[arg(long)]
        no_save: bool,
    },

    /// Check whether a document is a legal agreement and explain why
    Verify {
        /// Text or PDF file to verify
        file: PathBuf,
    },

    /// Extract clauses from a document without verifying it
    Clauses {
        /// Text or PDF file to scan
        file: PathBuf,
        /// Only show clauses of this category (e.g. PAYMENT)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List recent analyses, newest first
    History {
        /// Number of analyses to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Render as a table
        #[arg(long)]
        table: bool,
    },

    /// Show one stored analysis by content hash
    Show {
        /// Full SHA-256 content hash
        hash: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();
    tracing::debug!("lawmate v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            file,
            text,
            json,
            no_save,
        } => cmd_analyze(&cli.backends, file.as_deref(), text, json, no_save).await,
        Commands::Verify { file } => cmd_verify(&cli.backends, &file).await,
        Commands::Clauses { file, category } => cmd_clauses(&file, category.as_deref()),
        Commands::History { limit, table } => cmd_history(&cli.backends, limit, table),
        Commands::Show { hash } => cmd_show(&cli.backends, &hash),
    }
}

fn read_input(path: &Path) -> anyhow::Result<DocumentInput> {
    DocumentInput::read(path).with_context(|| format!("reading {}", path.display()))
}

fn ingest(path: &Path) -> anyhow::Result<Document> {
    let input = read_input(path)?;
    Document::ingest(&input).with_context(|| format!("extracting text from {}", path.display()))
}

async fn cmd_analyze(
    backends: &BackendArgs,
    file: Option<&Path>,
    text: Option<String>,
    json: bool,
    no_save: bool,
) -> anyhow::Result<()> {
    let input = match (file, text) {
        (_, Some(text)) => DocumentInput::from_text(text),
        (Some(path), None) => read_input(path)?,
        (None, None) => anyhow::bail!("provide a FILE or --text"),
    };

    let mut analyzer = Analyzer::new(backends.classifier()?, backends.summarizer())
        .with_config(backends.pipeline_config());
    if !no_save {
        analyzer = backends.attach_store(analyzer);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let analysis = analyzer.analyze_with_cancel(&input, &cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        display::print_analysis(&analysis);
    }
    Ok(())
}

async fn cmd_verify(backends: &BackendArgs, file: &Path) -> anyhow::Result<()> {
    let doc = ingest(file)?;
    let analyzer = Analyzer::new(backends.classifier()?, backends.summarizer())
        .with_config(backends.pipeline_config());

    let verdict = analyzer.verifier().verify(&doc).await;
    let signals = DocumentSignals::from_normalized(analyzer.catalog(), doc.normalized_text());
    display::print_verification(&verdict, &signals);
    Ok(())
}

fn cmd_clauses(file: &Path, category: Option<&str>) -> anyhow::Result<()> {
    let doc = ingest(file)?;
    let catalog = PatternCatalog::standard();
    let mut extraction = extract_clauses(&catalog, doc.raw_text());

    if let Some(category) = category {
        let wanted = category.to_ascii_uppercase().replace(' ', "_");
        anyhow::ensure!(
            catalog.get(&wanted).is_some(),
            "unknown clause category {category}; known: {}",
            catalog.categories().collect::<Vec<_>>().join(", ")
        );
        extraction.clauses.retain(|c| c.category == wanted);
    }

    display::print_clauses(&extraction.clauses, &extraction.failures);
    Ok(())
}

fn cmd_history(backends: &BackendArgs, limit: usize, table: bool) -> anyhow::Result<()> {
    let store = backends.open_store()?;
    let records = store.recent(limit)?;
    if table {
        display::print_history_table(&records)
    } else {
        display::print_history(&records);
        Ok(())
    }
}

fn cmd_show(backends: &BackendArgs, hash: &str) -> anyhow::Result<()> {
    let store = backends.open_store()?;
    let hash = hash.trim().to_ascii_lowercase();
    let record = store
        .get(&hash)?
        .with_context(|| format!("no stored analysis for {hash}"))?;
    display::print_record_card(&record);
    Ok(())
}
