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

//! Question answering and summarization over the ingested store.
//!
//! Both entry points always return a printable string: fixed fallback
//! messages when nothing was loaded, the model text on success, and the
//! error's user-facing message when the API call fails. Callers never see
//! an `Err` from this module.

use crate::llm::LanguageModel;
use crate::query;
use crate::store::DocStore;

pub const NO_DOCUMENTS_MESSAGE: &str = "No relevant documents found to answer the question.";
pub const NOTHING_TO_SUMMARIZE_MESSAGE: &str = "No documents to summarize.";

/// Joined batch content longer than this is clipped before summarizing.
const SUMMARY_CHAR_LIMIT: usize = 5000;

pub fn answer_question(
    store: &DocStore,
    model: &mut dyn LanguageModel,
    question: &str,
    top_k: usize,
) -> String {
    let chunks = query::retrieve(store, question, top_k);
    if chunks.is_empty() {
        return NO_DOCUMENTS_MESSAGE.to_string();
    }
    let context = chunks.join("\n\n");
    match model.answer(&context, question) {
        Ok(text) => text,
        Err(err) => err.user_message(),
    }
}

pub fn summarize_documents(
    store: &DocStore,
    model: &mut dyn LanguageModel,
    max_tokens: u32,
) -> String {
    // A batch whose files were all skipped holds no content; the guard keys
    // on loaded documents so empty text never reaches the model.
    if store.stats().doc_count == 0 {
        return NOTHING_TO_SUMMARIZE_MESSAGE.to_string();
    }
    let combined = store
        .batches()
        .iter()
        .map(|batch| batch.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let clipped = clip_chars(&combined, SUMMARY_CHAR_LIMIT);
    match model.summarize(&clipped, max_tokens) {
        Ok(text) => text,
        Err(err) => err.user_message(),
    }
}

/// Keeps the first `limit` characters and marks the cut with an ellipsis.
/// Text at or under the limit passes through untouched.
fn clip_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
