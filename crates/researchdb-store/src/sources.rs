//! In-memory source provider for tests and CLI runs that read sources off
//! the filesystem before indexing.

use std::collections::HashMap;
use std::sync::RwLock;

use researchdb_core::error::{Error, Result};
use researchdb_core::traits::SourceProvider;
use researchdb_core::types::{Source, SourceNamespace};

#[derive(Default)]
pub struct MemorySourceProvider {
    sources: RwLock<HashMap<(String, SourceNamespace), Source>>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: Source) {
        if let Ok(mut map) = self.sources.write() {
            map.insert((source.id.clone(), source.namespace), source);
        }
    }
}

impl SourceProvider for MemorySourceProvider {
    async fn get_source(&self, source_id: &str, namespace: SourceNamespace) -> Result<Source> {
        let map = self
            .sources
            .read()
            .map_err(|_| Error::StoreUnavailable("source map lock poisoned".to_string()))?;
        map.get(&(source_id.to_string(), namespace))
            .cloned()
            .ok_or_else(|| Error::SourceNotFound {
                source_id: source_id.to_string(),
                namespace,
            })
    }
}
