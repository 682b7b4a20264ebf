use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const EMBEDDING_DIM: i32 = 1024;

/// Arrow schema for the chunks table. The vector column is nullable: a
/// NULL vector is the persisted form of a failed embedding and is skipped
/// by vector search.
pub fn build_chunks_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source_id", DataType::Utf8, false),
        Field::new("namespace", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("level", DataType::Utf8, false),
        Field::new("chunk_order", DataType::Int32, false),
        Field::new("parent_id", DataType::Utf8, true),
        Field::new("authority_weight", DataType::Float32, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            true,
        ),
    ]))
}
