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

//! Fixed-window text chunking with overlap.

use anyhow::Result;
use anyhow::bail;

/// Splits `text` into windows of `chunk_size` characters, each window
/// starting `chunk_size - overlap` characters after the previous one. The
/// last window may be shorter. Offsets are character positions, so
/// multi-byte text never splits inside a code point.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        bail!("chunk_size must be at least 1");
    }
    if overlap >= chunk_size {
        bail!("chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})");
    }

    let offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    let char_count = offsets.len();
    let byte_at = |pos: usize| {
        if pos < char_count {
            offsets[pos]
        } else {
            text.len()
        }
    };

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < char_count {
        let end = start + chunk_size;
        chunks.push(text[byte_at(start)..byte_at(end)].to_string());
        start = end - overlap;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(chunks: &[String]) -> Vec<usize> {
        chunks.iter().map(|chunk| chunk.chars().count()).collect()
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunk_text("", 500, 50).expect("chunk");
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_yields_a_single_chunk() {
        let chunks = chunk_text("hello world", 500, 50).expect("chunk");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let text: String = ('a'..='z').cycle().take(120).collect();
        let chunks = chunk_text(&text, 50, 10).expect("chunk");
        assert_eq!(lengths(&chunks), vec![50, 50, 40]);
        // Each window rewinds ten characters into the previous one.
        assert_eq!(chunks[0][40..], chunks[1][..10]);
        assert_eq!(chunks[1][40..], chunks[2][..10]);
    }

    #[test]
    fn text_exactly_one_window_long_also_emits_the_tail() {
        // The cursor lands at len - overlap, still inside the text, so a
        // second window covering only the overlap region is emitted.
        let text = "x".repeat(50);
        let chunks = chunk_text(&text, 50, 10).expect("chunk");
        assert_eq!(lengths(&chunks), vec![50, 10]);
    }

    #[test]
    fn chunks_reassemble_into_the_original_text() {
        let text: String = ('a'..='z').cycle().take(137).collect();
        let chunks = chunk_text(&text, 40, 10).expect("chunk");
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(10));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunk_count_is_len_over_stride_rounded_up() {
        for len in [1usize, 39, 40, 41, 100, 499, 500, 501, 1234] {
            let text = "y".repeat(len);
            let chunks = chunk_text(&text, 50, 10).expect("chunk");
            assert_eq!(chunks.len(), len.div_ceil(40), "len {len}");
        }
    }

    #[test]
    fn multibyte_text_is_split_on_character_boundaries() {
        let text: String = "é".repeat(75);
        let chunks = chunk_text(&text, 50, 10).expect("chunk");
        assert_eq!(lengths(&chunks), vec![50, 35]);
        assert_eq!(chunks[1].chars().next(), Some('é'));
    }

    #[test]
    fn zero_overlap_tiles_the_text() {
        let text = "0123456789";
        let chunks = chunk_text(text, 4, 0).expect("chunk");
        assert_eq!(chunks, vec!["0123", "4567", "89"]);
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let err = chunk_text("abc", 10, 10).expect_err("must reject");
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = chunk_text("abc", 0, 0).expect_err("must reject");
        assert!(err.to_string().contains("chunk_size"));
    }
}
