// Copyright 2026 Docent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory ledger of ingested batches and the chunks derived from them.
//!
//! The store is append-only between calls to [`DocStore::clear`]: every
//! ingestion pushes one batch and extends the flat chunk list, and nothing
//! else mutates either. Retrieval reads chunks in insertion order.

use serde::Serialize;

use crate::model::IngestBatch;

#[derive(Debug, Default)]
pub struct DocStore {
    batches: Vec<IngestBatch>,
    chunks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub batch_count: usize,
    pub doc_count: usize,
    pub chunk_count: usize,
    pub content_chars: usize,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: IngestBatch) {
        self.batches.push(batch);
    }

    pub fn extend_chunks(&mut self, chunks: Vec<String>) {
        self.chunks.extend(chunks);
    }

    pub fn batches(&self) -> &[IngestBatch] {
        &self.batches
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Drops every batch and chunk, returning the store to its initial state.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.chunks.clear();
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            batch_count: self.batches.len(),
            doc_count: self.batches.iter().map(|batch| batch.total_documents).sum(),
            chunk_count: self.chunks.len(),
            content_chars: self
                .batches
                .iter()
                .map(|batch| batch.content.chars().count())
                .sum(),
        }
    }
}
