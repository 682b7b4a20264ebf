use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use researchdb_core::config::{AuthorityConfig, Config};
use researchdb_core::types::{Source, SourceKind, SourceNamespace};
use researchdb_embed::default_provider;
use researchdb_search::Indexer;
use researchdb_store::lance::DEFAULT_TABLE_NAME;
use researchdb_store::{LanceChunkStore, MemorySourceProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut data_dir = None;
    let mut db_dir: Option<PathBuf> = None;
    let mut namespace = SourceNamespace::Report;
    let mut kind = SourceKind::AnalystReport;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--namespace" | "-n" => {
                if i + 1 < args.len() {
                    namespace = SourceNamespace::parse(&args[i + 1])?;
                    i += 1;
                } else {
                    eprintln!("Error: --namespace requires a value");
                    std::process::exit(1);
                }
            }
            "--kind" | "-k" => {
                if i + 1 < args.len() {
                    kind = SourceKind::parse(&args[i + 1])?;
                    i += 1;
                } else {
                    eprintln!("Error: --kind requires a value");
                    std::process::exit(1);
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    db_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --db requires a path");
                    std::process::exit(1);
                }
            }
            _ if !args[i].starts_with('-') => data_dir = Some(PathBuf::from(&args[i])),
            _ => {}
        }
        i += 1;
    }
    let Some(data_dir) = data_dir else {
        eprintln!("Usage: researchdb-indexer <data_dir> [--namespace report|primary] [--kind earnings-call|filing|ir-material|analyst-report] [--db <path>]");
        std::process::exit(1);
    };
    let db_dir = db_dir.unwrap_or_else(|| {
        PathBuf::from(config.get_or("data.lancedb_dir", "./data/researchdb".to_string()))
    });

    let authority: AuthorityConfig = config.get_or("authority", AuthorityConfig::default());
    authority.validate()?;
    let authority_weight = authority.weight_for(kind);

    println!("researchdb indexer\n==================");
    println!("Data directory: {}", data_dir.display());
    println!("Database: {}", db_dir.display());
    println!("Namespace: {namespace}  Kind: {kind}  Authority weight: {authority_weight:.2}");

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&data_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    if files.is_empty() {
        println!("No .txt files found under {}.", data_dir.display());
        return Ok(());
    }

    let store = Arc::new(LanceChunkStore::new(&db_dir, DEFAULT_TABLE_NAME).await?);
    let sources = Arc::new(MemorySourceProvider::new());
    let indexer = Indexer::new(store, sources.clone(), default_provider());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sources ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let mut total_chunks = 0usize;
    let mut total_summaries = 0usize;
    let mut total_details = 0usize;
    for file in &files {
        let source_id = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        pb.set_message(source_id.clone());
        let body = std::fs::read_to_string(file)
            .or_else(|_| std::fs::read(file).map(|b| String::from_utf8_lossy(&b).to_string()))?;
        sources.insert(Source {
            id: source_id.clone(),
            namespace,
            kind,
            body,
            authority_weight,
        });
        let result = indexer.reindex(&source_id, namespace).await?;
        total_chunks += result.total;
        total_summaries += result.summary_count;
        total_details += result.detail_count;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!(
        "\nIndexed {} sources into {} chunks ({} summaries, {} details)",
        files.len(),
        total_chunks,
        total_summaries,
        total_details
    );
    println!("\nTo query, use: cargo run --bin researchdb-search '<query>'");
    Ok(())
}
