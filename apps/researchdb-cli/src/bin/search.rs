use std::path::PathBuf;
use std::sync::Arc;

use researchdb_core::config::Config;
use researchdb_core::types::{ChunkLevel, SearchFilters, SourceNamespace};
use researchdb_embed::default_provider;
use researchdb_search::WeightedSearchEngine;
use researchdb_store::lance::DEFAULT_TABLE_NAME;
use researchdb_store::LanceChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let config = Config::load()?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--limit N] [--namespace report|primary] [--level summary|detail] [--min-similarity F] [--bonus F] [--db <path>]", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let mut limit = 10usize;
    let mut filters = SearchFilters::default();
    let mut bonus = 0.1f32;
    let mut db_dir: Option<PathBuf> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                limit = parse_value(&args, &mut i, "--limit")?;
            }
            "--namespace" => {
                let value: String = parse_value(&args, &mut i, "--namespace")?;
                filters.namespace = Some(SourceNamespace::parse(&value)?);
            }
            "--level" => {
                let value: String = parse_value(&args, &mut i, "--level")?;
                filters.level = Some(ChunkLevel::parse(&value)?);
            }
            "--min-similarity" => {
                filters.min_similarity = Some(parse_value(&args, &mut i, "--min-similarity")?);
            }
            "--bonus" => {
                bonus = parse_value(&args, &mut i, "--bonus")?;
            }
            "--db" => {
                let value: String = parse_value(&args, &mut i, "--db")?;
                db_dir = Some(PathBuf::from(value));
            }
            other => {
                eprintln!("Unknown flag: {other}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let db_dir = db_dir.unwrap_or_else(|| {
        PathBuf::from(config.get_or("data.lancedb_dir", "./data/researchdb".to_string()))
    });

    let store = Arc::new(LanceChunkStore::new(&db_dir, DEFAULT_TABLE_NAME).await?);
    let engine = WeightedSearchEngine::new(store, default_provider());
    let results = engine.search(query, &filters, limit, bonus).await?;

    println!("Found {} results for: \"{}\"", results.len(), query);
    for (rank, result) in results.iter().enumerate() {
        println!(
            "\n  {}. score={:.4}  sim={:.4}  bonus={:.4}  authority={:.2}  [{}] {}/{}#{}",
            rank + 1,
            result.weighted_score,
            result.similarity,
            result.keyword_bonus,
            result.chunk.authority_weight,
            result.chunk.level,
            result.chunk.namespace,
            result.chunk.source_id,
            result.chunk.order,
        );
        println!("     {}", result.chunk.content);
        if let Some(parent) = &result.parent_content {
            println!("     in: {parent}");
        }
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    if *i + 1 >= args.len() {
        anyhow::bail!("{flag} requires a value");
    }
    *i += 1;
    args[*i]
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {flag}: {e}"))
}
