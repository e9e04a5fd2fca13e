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

//! Lexical retrieval over the chunk store.
//!
//! Scoring is deliberately simple: a chunk's score is the number of distinct
//! lowercased whitespace tokens it shares with the query. No stemming, no
//! weighting. Good enough to pick context for the model, and fully
//! deterministic.

use std::collections::HashSet;

use crate::model::ScoredChunk;
use crate::store::DocStore;

/// Scores every chunk against `query` and ranks by descending score.
/// The sort is stable, so equal scores keep chunk insertion order.
pub fn rank_chunks(store: &DocStore, query: &str) -> Vec<ScoredChunk> {
    let query_words = tokenize(query);
    let mut scored: Vec<ScoredChunk> = store
        .chunks()
        .iter()
        .map(|chunk| ScoredChunk {
            score: overlap_score(&query_words, chunk),
            text: chunk.clone(),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Returns the texts of the `top_k` best-scoring chunks. Zero-scoring
/// chunks fill the tail if nothing better exists; only an empty store
/// yields an empty result.
pub fn retrieve(store: &DocStore, query: &str, top_k: usize) -> Vec<String> {
    if store.chunks().is_empty() {
        return Vec::new();
    }
    rank_chunks(store, query)
        .into_iter()
        .take(top_k)
        .map(|chunk| chunk.text)
        .collect()
}

pub fn print_table(chunks: &[ScoredChunk]) {
    for chunk in chunks {
        println!("{}\t{}", chunk.score, chunk.text);
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn overlap_score(query_words: &HashSet<String>, chunk: &str) -> usize {
    let chunk_words = tokenize(chunk);
    query_words.intersection(&chunk_words).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(chunks: &[&str]) -> DocStore {
        let mut store = DocStore::new();
        store.extend_chunks(chunks.iter().map(|chunk| chunk.to_string()).collect());
        store
    }

    #[test]
    fn scores_count_distinct_shared_words() {
        let store = store_with(&["the cat sat", "the dog ran", "cats and dogs"]);
        let ranked = rank_chunks(&store, "cat dog");
        let scores: Vec<usize> = ranked.iter().map(|chunk| chunk.score).collect();
        assert_eq!(scores, vec![1, 1, 0]);
        assert_eq!(ranked[0].text, "the cat sat");
        assert_eq!(ranked[1].text, "the dog ran");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let store = store_with(&["alpha one", "alpha two", "alpha three"]);
        let ranked = rank_chunks(&store, "alpha");
        let texts: Vec<&str> = ranked.iter().map(|chunk| chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha one", "alpha two", "alpha three"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let store = store_with(&["The Quick BROWN Fox"]);
        let ranked = rank_chunks(&store, "quick fox");
        assert_eq!(ranked[0].score, 2);
    }

    #[test]
    fn repeated_query_words_count_once() {
        let store = store_with(&["rust rust rust"]);
        let ranked = rank_chunks(&store, "rust rust");
        assert_eq!(ranked[0].score, 1);
    }

    #[test]
    fn retrieve_fills_top_k_with_zero_scores_when_needed() {
        let store = store_with(&["nothing matches here", "nor here"]);
        let texts = retrieve(&store, "unrelated query", 2);
        assert_eq!(texts, vec!["nothing matches here", "nor here"]);
    }

    #[test]
    fn retrieve_caps_at_top_k() {
        let store = store_with(&["a b", "a c", "a d", "a e"]);
        let texts = retrieve(&store, "a", 3);
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn empty_store_retrieves_nothing() {
        let store = DocStore::new();
        assert!(retrieve(&store, "anything", 3).is_empty());
    }
}
