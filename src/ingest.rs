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

//! Document loading and batch ingestion.
//!
//! Each call to [`ingest_paths`] produces exactly one batch: every loadable
//! document's text lands in the batch content behind a marker line, the
//! batch is appended to the store, and the combined content is chunked into
//! the store's flat chunk list. Files that cannot be loaded are skipped with
//! a warning; they never fail the batch.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::model::DocumentFormat;
use crate::model::DocumentMeta;
use crate::model::IngestBatch;
use crate::store::DocStore;

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub glob: Option<String>,
}

#[derive(Debug)]
pub struct IngestReport {
    pub documents_processed: usize,
    pub chunks_created: usize,
    pub content_chars: usize,
    pub warnings: Vec<String>,
}

pub fn ingest_paths(
    store: &mut DocStore,
    config: &Config,
    paths: Vec<PathBuf>,
    opts: IngestOptions,
) -> Result<IngestReport> {
    let include_set = build_globset(opts.glob.as_deref())?;
    let files = expand_paths(paths, &include_set);

    let mut batch = IngestBatch::default();
    let mut warnings = Vec::new();
    for path in &files {
        let Some(format) = DocumentFormat::from_path(path) else {
            warnings.push(format!("unsupported file format: {}", path.display()));
            continue;
        };
        match extract_text(path, format) {
            Ok(Some(text)) if !text.is_empty() => {
                let filename = file_name(path);
                batch.content.push_str(&document_marker(&filename));
                batch.content.push_str(&text);
                batch.metadata.push(DocumentMeta {
                    filename,
                    size: text.chars().count(),
                    format: file_suffix(path),
                });
                batch.total_documents += 1;
            }
            Ok(Some(_)) => {
                debug!(path = %path.display(), "no text extracted, skipping");
            }
            Ok(None) => {
                warnings.push(format!(
                    "docx extraction is not supported yet, skipping {}",
                    path.display()
                ));
            }
            Err(err) => {
                warnings.push(format!("skip {}: {err:#}", path.display()));
            }
        }
    }

    let chunks = chunk_text(&batch.content, config.chunk_size, config.chunk_overlap)?;
    let report = IngestReport {
        documents_processed: batch.total_documents,
        chunks_created: chunks.len(),
        content_chars: batch.content.chars().count(),
        warnings,
    };
    debug!(
        documents = report.documents_processed,
        chunks = report.chunks_created,
        chars = report.content_chars,
        "ingested batch"
    );
    // Zero loaded documents still appends an (empty) batch.
    store.push_batch(batch);
    store.extend_chunks(chunks);
    Ok(report)
}

/// Marker line written into the batch content before each document's text.
fn document_marker(filename: &str) -> String {
    format!("\n\n--- Document: {filename} ---\n\n")
}

/// File arguments pass through in order; directory arguments are walked
/// recursively and contribute their allow-set files in sorted order.
fn expand_paths(paths: Vec<PathBuf>, include_set: &Option<GlobSet>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walked: Vec<PathBuf> = WalkDir::new(&path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|file| DocumentFormat::from_path(file).is_some())
                .filter(|file| {
                    include_set
                        .as_ref()
                        .is_none_or(|set| set.is_match(file.as_path()))
                })
                .collect();
            walked.sort();
            files.extend(walked);
        } else {
            files.push(path);
        }
    }
    files
}

fn build_globset(pattern: Option<&str>) -> Result<Option<GlobSet>> {
    if let Some(pat) = pattern {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(pat)?);
        let set = builder.build()?;
        Ok(Some(set))
    } else {
        Ok(None)
    }
}

/// Returns `Ok(None)` for formats in the allow-set without an extractor.
fn extract_text(path: &Path, format: DocumentFormat) -> Result<Option<String>> {
    match format {
        DocumentFormat::Text => read_text(path).map(Some),
        DocumentFormat::Pdf => read_pdf(path).map(Some),
        DocumentFormat::Docx => Ok(None),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {} as utf-8", path.display()))
}

/// Extracts text page by page in page order. Page texts are concatenated
/// with no separator; any unreadable page fails the whole file.
fn read_pdf(path: &Path) -> Result<String> {
    let doc =
        lopdf::Document::load(path).with_context(|| format!("open pdf {}", path.display()))?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .with_context(|| format!("extract text from page {page_number}"))?;
        text.push_str(&page_text);
    }
    Ok(text)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_suffix(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::tempdir;

    fn small_config() -> Config {
        Config {
            chunk_size: 40,
            chunk_overlap: 8,
            ..Config::default()
        }
    }

    /// Builds a valid PDF with one page per phrase, each page drawing its
    /// phrase with the built-in Helvetica font.
    fn pdf_with_pages(phrases: &[&str]) -> Vec<u8> {
        let page_count = phrases.len();
        let font_id = 3 + 2 * page_count;
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 3 + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
                kids.join(" ")
            ),
        ];
        for (i, phrase) in phrases.iter().enumerate() {
            let stream = format!("BT /F1 12 Tf 72 712 Td ({phrase}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
        }
        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn txt_file_appends_marker_text_and_metadata() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, "alpha beta")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![path],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 1);
        assert!(report.warnings.is_empty());
        let batch = &store.batches()[0];
        assert_eq!(batch.content, "\n\n--- Document: a.txt ---\n\nalpha beta");
        assert_eq!(batch.metadata.len(), 1);
        assert_eq!(batch.metadata[0].filename, "a.txt");
        assert_eq!(batch.metadata[0].size, 10);
        assert_eq!(batch.metadata[0].format, ".txt");
        Ok(())
    }

    #[test]
    fn unsupported_and_failing_files_warn_without_failing_the_batch() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.xyz");
        let c = dir.path().join("c.pdf");
        fs::write(&a, "alpha")?;
        fs::write(&b, "ignored")?;
        fs::write(&c, pdf_with_pages(&["gamma delta"]))?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![a, b, c],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("b.xyz"));
        let batch = &store.batches()[0];
        assert_eq!(batch.total_documents, 2);
        let filenames: Vec<&str> = batch
            .metadata
            .iter()
            .map(|meta| meta.filename.as_str())
            .collect();
        assert_eq!(filenames, vec!["a.txt", "c.pdf"]);
        assert_eq!(batch.metadata[1].format, ".pdf");
        assert!(batch.metadata[1].size > 0);
        assert!(batch.content.contains("gamma delta"));
        Ok(())
    }

    #[test]
    fn pdf_pages_concatenate_in_page_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("two.pdf");
        fs::write(&path, pdf_with_pages(&["first page words", "second page words"]))?;

        let text = read_pdf(&path)?;
        let first = text.find("first page words").expect("first page");
        let second = text.find("second page words").expect("second page");
        assert!(first < second);
        Ok(())
    }

    #[test]
    fn corrupt_pdf_is_skipped_with_a_warning() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a valid pdf")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![path],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("broken.pdf"));
        assert_eq!(store.batches()[0].total_documents, 0);
        Ok(())
    }

    #[test]
    fn docx_is_accepted_but_yields_no_document() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("report.docx");
        fs::write(&path, "placeholder")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![path],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("report.docx"));
        Ok(())
    }

    #[test]
    fn empty_ingest_still_appends_a_batch() -> Result<()> {
        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            Vec::new(),
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 0);
        assert_eq!(report.chunks_created, 0);
        assert_eq!(store.batches().len(), 1);
        assert!(store.chunks().is_empty());
        Ok(())
    }

    #[test]
    fn empty_file_is_skipped_silently() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.txt");
        fs::write(&path, "")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![path],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 0);
        assert!(report.warnings.is_empty());
        assert!(store.batches()[0].metadata.is_empty());
        Ok(())
    }

    #[test]
    fn directories_contribute_sorted_allow_set_files() -> Result<()> {
        let dir = tempdir()?;
        let docs = dir.path().join("docs");
        fs::create_dir(&docs)?;
        fs::write(docs.join("b.txt"), "bravo")?;
        fs::write(docs.join("a.txt"), "alpha")?;
        fs::write(docs.join("notes.rs"), "fn main() {}")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![docs],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 2);
        assert!(report.warnings.is_empty(), "walked files filter silently");
        let filenames: Vec<&str> = store.batches()[0]
            .metadata
            .iter()
            .map(|meta| meta.filename.as_str())
            .collect();
        assert_eq!(filenames, vec!["a.txt", "b.txt"]);
        Ok(())
    }

    #[test]
    fn glob_restricts_walked_directory_entries() -> Result<()> {
        let dir = tempdir()?;
        let docs = dir.path().join("docs");
        fs::create_dir(&docs)?;
        fs::write(docs.join("keep.txt"), "keep me")?;
        fs::write(docs.join("drop.txt"), "drop me")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![docs],
            IngestOptions {
                glob: Some("**/keep.txt".to_string()),
            },
        )?;

        assert_eq!(report.documents_processed, 1);
        assert_eq!(store.batches()[0].metadata[0].filename, "keep.txt");
        Ok(())
    }

    #[test]
    fn extension_matching_ignores_case_but_metadata_preserves_it() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("UPPER.TXT");
        fs::write(&path, "shouting")?;

        let mut store = DocStore::new();
        let report = ingest_paths(
            &mut store,
            &small_config(),
            vec![path],
            IngestOptions::default(),
        )?;

        assert_eq!(report.documents_processed, 1);
        assert_eq!(store.batches()[0].metadata[0].format, ".TXT");
        Ok(())
    }

    #[test]
    fn batch_content_is_chunked_with_the_configured_window() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        fs::write(&path, "a".repeat(200))?;

        let config = small_config();
        let mut store = DocStore::new();
        let report = ingest_paths(&mut store, &config, vec![path], IngestOptions::default())?;

        let stride = config.chunk_size - config.chunk_overlap;
        assert_eq!(report.chunks_created, report.content_chars.div_ceil(stride));
        assert_eq!(store.chunks().len(), report.chunks_created);
        Ok(())
    }
}
