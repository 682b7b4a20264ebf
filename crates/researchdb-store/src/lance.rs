//! LanceDB-backed chunk store.
//!
//! One table holds both chunk levels; rows are appended in per-source
//! batches and removed with SQL delete predicates. Vector search runs with
//! cosine distance so similarity is `1 - distance`. A missing table reads
//! as an empty store rather than an error, so searches before the first
//! index run return no results.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType, Table};
use tracing::debug;

use researchdb_core::error::{Error, Result};
use researchdb_core::traits::ChunkStore;
use researchdb_core::types::{Chunk, ChunkLevel, SearchFilters, SourceNamespace};

use crate::schema::{build_chunks_schema, EMBEDDING_DIM};

pub const DEFAULT_TABLE_NAME: &str = "chunks";

pub struct LanceChunkStore {
    db: Connection,
    table_name: String,
}

impl LanceChunkStore {
    pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref())
            .execute()
            .await
            .map_err(Error::store)?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    async fn open_table_if_exists(&self) -> Result<Option<Table>> {
        let names = self.db.table_names().execute().await.map_err(Error::store)?;
        if !names.contains(&self.table_name) {
            return Ok(None);
        }
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(Error::store)?;
        Ok(Some(table))
    }

    fn chunks_to_record_batch(chunks: &[Chunk]) -> Result<RecordBatch> {
        let schema = build_chunks_schema();
        let mut ids = Vec::with_capacity(chunks.len());
        let mut source_ids = Vec::with_capacity(chunks.len());
        let mut namespaces = Vec::with_capacity(chunks.len());
        let mut contents = Vec::with_capacity(chunks.len());
        let mut levels = Vec::with_capacity(chunks.len());
        let mut orders = Vec::with_capacity(chunks.len());
        let mut parent_ids: Vec<Option<String>> = Vec::with_capacity(chunks.len());
        let mut weights = Vec::with_capacity(chunks.len());
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if !chunk.embedding.is_empty() && chunk.embedding.len() != EMBEDDING_DIM as usize {
                return Err(Error::validation(
                    "embedding",
                    format!(
                        "expected {} dimensions, got {}",
                        EMBEDDING_DIM,
                        chunk.embedding.len()
                    ),
                ));
            }
            ids.push(chunk.id.clone());
            source_ids.push(chunk.source_id.clone());
            namespaces.push(chunk.namespace.as_str().to_string());
            contents.push(chunk.content.clone());
            levels.push(chunk.level.as_str().to_string());
            orders.push(chunk.order as i32);
            parent_ids.push(chunk.parent_id.clone());
            weights.push(chunk.authority_weight);
            if chunk.embedding.is_empty() {
                vectors.push(None);
            } else {
                vectors.push(Some(chunk.embedding.iter().map(|&x| Some(x)).collect()));
            }
        }
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(source_ids)),
                Arc::new(StringArray::from(namespaces)),
                Arc::new(StringArray::from(contents)),
                Arc::new(StringArray::from(levels)),
                Arc::new(Int32Array::from(orders)),
                Arc::new(StringArray::from(parent_ids)),
                Arc::new(Float32Array::from(weights)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), EMBEDDING_DIM)),
            ],
        )
        .map_err(Error::store)?;
        Ok(batch)
    }
}

fn sql_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn filters_predicate(filters: &SearchFilters) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(ns) = filters.namespace {
        clauses.push(format!("namespace = {}", sql_quote(ns.as_str())));
    }
    if let Some(level) = filters.level {
        clauses.push(format!("level = {}", sql_quote(level.as_str())));
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

fn str_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::StoreUnavailable(format!("column '{name}' missing or mistyped")))
}

fn chunk_from_batch(batch: &RecordBatch, row: usize) -> Result<Chunk> {
    let order_col = batch
        .column_by_name("chunk_order")
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| Error::StoreUnavailable("column 'chunk_order' missing".to_string()))?;
    let weight_col = batch
        .column_by_name("authority_weight")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| Error::StoreUnavailable("column 'authority_weight' missing".to_string()))?;
    let parent_col = str_col(batch, "parent_id")?;
    let vector_col = batch
        .column_by_name("vector")
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>());

    let namespace = SourceNamespace::parse(str_col(batch, "namespace")?.value(row))
        .map_err(|e| Error::StoreUnavailable(format!("corrupt namespace column: {e}")))?;
    let level = ChunkLevel::parse(str_col(batch, "level")?.value(row))
        .map_err(|e| Error::StoreUnavailable(format!("corrupt level column: {e}")))?;

    let embedding = match vector_col {
        Some(fsl) if fsl.is_valid(row) => {
            let values = fsl.value(row);
            let floats = values
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| Error::StoreUnavailable("vector items mistyped".to_string()))?;
            (0..floats.len()).map(|i| floats.value(i)).collect()
        }
        _ => Vec::new(),
    };

    Ok(Chunk {
        id: str_col(batch, "id")?.value(row).to_string(),
        source_id: str_col(batch, "source_id")?.value(row).to_string(),
        namespace,
        content: str_col(batch, "content")?.value(row).to_string(),
        embedding,
        authority_weight: weight_col.value(row),
        level,
        order: order_col.value(row) as u32,
        parent_id: if parent_col.is_null(row) {
            None
        } else {
            Some(parent_col.value(row).to_string())
        },
    })
}

impl ChunkStore for LanceChunkStore {
    async fn insert_batch(&self, chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let batch = Self::chunks_to_record_batch(&chunks)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        match self.open_table_if_exists().await? {
            Some(table) => {
                table.add(reader).execute().await.map_err(Error::store)?;
            }
            None => {
                self.db
                    .create_table(&self.table_name, reader)
                    .execute()
                    .await
                    .map_err(Error::store)?;
            }
        }
        Ok(())
    }

    async fn delete_by_source(
        &self,
        source_id: &str,
        namespace: SourceNamespace,
    ) -> Result<usize> {
        let Some(table) = self.open_table_if_exists().await? else {
            return Ok(0);
        };
        let predicate = format!(
            "source_id = {} AND namespace = {}",
            sql_quote(source_id),
            sql_quote(namespace.as_str())
        );
        let removed = table
            .count_rows(Some(predicate.clone()))
            .await
            .map_err(Error::store)?;
        if removed > 0 {
            table.delete(&predicate).await.map_err(Error::store)?;
        }
        debug!(source_id, namespace = %namespace, removed, "deleted chunk rows");
        Ok(removed)
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        filters: &SearchFilters,
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let Some(table) = self.open_table_if_exists().await? else {
            return Ok(Vec::new());
        };
        let mut query_builder = table
            .vector_search(query.to_vec())
            .map_err(Error::store)?
            .distance_type(DistanceType::Cosine)
            .limit(k);
        if let Some(predicate) = filters_predicate(filters) {
            query_builder = query_builder.only_if(predicate);
        }
        let mut stream = query_builder.execute().await.map_err(Error::store)?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::store)? {
            let distance_col = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| Error::StoreUnavailable("column '_distance' missing".to_string()))?;
            for row in 0..batch.num_rows() {
                let similarity = 1.0 - distance_col.value(row);
                if let Some(min) = filters.min_similarity {
                    if similarity < min {
                        continue;
                    }
                }
                hits.push((chunk_from_batch(&batch, row)?, similarity));
            }
        }
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    async fn get_children(&self, parent_id: &str) -> Result<Vec<Chunk>> {
        let Some(table) = self.open_table_if_exists().await? else {
            return Ok(Vec::new());
        };
        let mut stream = table
            .query()
            .only_if(format!("parent_id = {}", sql_quote(parent_id)))
            .execute()
            .await
            .map_err(Error::store)?;
        let mut children = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::store)? {
            for row in 0..batch.num_rows() {
                children.push(chunk_from_batch(&batch, row)?);
            }
        }
        children.sort_by_key(|c| c.order);
        Ok(children)
    }

    async fn get(&self, chunk_id: &str) -> Result<Option<Chunk>> {
        let Some(table) = self.open_table_if_exists().await? else {
            return Ok(None);
        };
        let mut stream = table
            .query()
            .only_if(format!("id = {}", sql_quote(chunk_id)))
            .limit(1)
            .execute()
            .await
            .map_err(Error::store)?;
        while let Some(batch) = stream.try_next().await.map_err(Error::store)? {
            if batch.num_rows() > 0 {
                return Ok(Some(chunk_from_batch(&batch, 0)?));
            }
        }
        Ok(None)
    }
}
