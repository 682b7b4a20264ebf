use std::path::PathBuf;
use std::sync::Arc;

use researchdb_core::config::Config;
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
        eprintln!(
            "Usage: {} <query> [--limit N] [--siblings] [--db <path>]",
            args[0]
        );
        std::process::exit(1);
    }
    let query = &args[1];
    let mut limit = 5usize;
    let mut expand_siblings = false;
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
            "--siblings" | "-s" => expand_siblings = true,
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

    let store = Arc::new(LanceChunkStore::new(&db_dir, DEFAULT_TABLE_NAME).await?);
    let engine = WeightedSearchEngine::new(store, default_provider());
    let groups = engine.search_with_context(query, limit, expand_siblings).await?;

    println!("Found {} passage groups for: \"{}\"", groups.len(), query);
    for (rank, group) in groups.iter().enumerate() {
        println!(
            "\n{}. max_score={:.4}  {}/{}",
            rank + 1,
            group.max_score,
            group.parent.namespace,
            group.parent.source_id,
        );
        println!("   {}", group.parent.content);
        for matched in &group.matches {
            println!(
                "     matched [{}] score={:.4}: {}",
                matched.chunk.level, matched.weighted_score, matched.chunk.content
            );
        }
        if expand_siblings {
            for sibling in &group.siblings {
                println!("     sibling #{}: {}", sibling.order, sibling.content);
            }
        }
    }
    Ok(())
}
