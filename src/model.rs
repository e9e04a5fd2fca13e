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

//! Shared domain types used across ingestion, retrieval, and answering.

use std::path::Path;

use serde::Serialize;

/// Formats the loader accepts. `.docx` is admitted by the allow-set but has
/// no extractor yet; loading one yields no text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentFormat::Text),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub filename: String,
    /// Character count of the extracted text, not file bytes.
    pub size: usize,
    /// Extension of the source file with its leading dot, case preserved.
    pub format: String,
}

/// One ingestion call: every successfully loaded document's text concatenated
/// behind its marker line, plus the per-document records.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub content: String,
    pub metadata: Vec<DocumentMeta>,
    pub total_documents: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub score: usize,
    pub text: String,
}
