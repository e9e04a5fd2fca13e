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

//! Machine-readable CLI output. Every `--json` command prints exactly one
//! [`JsonResponse`] envelope; `schemas/response.schema.json` pins the shape.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::store::StoreStats;

#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsOut {
    pub took_ms: i64,
    pub batch_count: usize,
    pub doc_count: usize,
    pub chunk_count: usize,
    pub content_chars: usize,
}

impl StatsOut {
    pub fn from_store(stats: &StoreStats, took_ms: i64) -> Self {
        Self {
            took_ms,
            batch_count: stats.batch_count,
            doc_count: stats.doc_count,
            chunk_count: stats.chunk_count,
            content_chars: stats.content_chars,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOut {
    pub text: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, text: &str, top_k: usize) -> Self {
        self.query = Some(QueryOut {
            text: text.to_string(),
            top_k,
        });
        self
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_answer(mut self, answer: &str) -> Self {
        self.answer = Some(answer.to_string());
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_stats(mut self, stats: StatsOut) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Value) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}
