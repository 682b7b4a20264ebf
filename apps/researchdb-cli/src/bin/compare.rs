use std::path::PathBuf;
use std::sync::Arc;

use researchdb_core::config::{AuthorityConfig, Config};
use researchdb_core::types::ScoredChunk;
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
        eprintln!("Usage: {} <query> [--limit N] [--bonus F] [--db <path>]", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let mut limit = 10usize;
    let mut bonus = 0.1f32;
    let mut db_dir: Option<PathBuf> = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                if i + 1 < args.len() {
                    limit = args[i + 1].parse()?;
                    i += 1;
                } else {
                    anyhow::bail!("--limit requires a number");
                }
            }
            "--bonus" => {
                if i + 1 < args.len() {
                    bonus = args[i + 1].parse()?;
                    i += 1;
                } else {
                    anyhow::bail!("--bonus requires a number");
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    db_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    anyhow::bail!("--db requires a path");
                }
            }
            other => anyhow::bail!("unknown flag: {other}"),
        }
        i += 1;
    }
    let db_dir = db_dir.unwrap_or_else(|| {
        PathBuf::from(config.get_or("data.lancedb_dir", "./data/researchdb".to_string()))
    });

    let authority: AuthorityConfig = config.get_or("authority", AuthorityConfig::default());
    let store = Arc::new(LanceChunkStore::new(&db_dir, DEFAULT_TABLE_NAME).await?);
    let engine = WeightedSearchEngine::new(store, default_provider())
        .with_high_authority_threshold(authority.high_authority_threshold);
    let comparison = engine
        .compare_weighted_vs_unweighted(query, limit, bonus)
        .await?;

    println!("Query: \"{}\"", query);
    println!("\nWith authority weighting:");
    print_ranked(&comparison.weighted);
    println!("\nSimilarity only (all weights forced to 1.0):");
    print_ranked(&comparison.unweighted);
    println!(
        "\nHigh-authority ranks  weighted: {:?}  unweighted: {:?}",
        comparison.weighted_high_authority_ranks, comparison.unweighted_high_authority_ranks
    );
    Ok(())
}

fn print_ranked(results: &[ScoredChunk]) {
    for (rank, result) in results.iter().enumerate() {
        println!(
            "  {}. score={:.4}  sim={:.4}  authority={:.2}  [{}] {}",
            rank + 1,
            result.weighted_score,
            result.similarity,
            result.chunk.authority_weight,
            result.chunk.level,
            result.chunk.content,
        );
    }
}
