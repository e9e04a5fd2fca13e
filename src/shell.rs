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

//! Interactive question session.
//!
//! One store lives for the whole session, so `:ingest` calls accumulate
//! batches and `:clear` forgets them, the same ledger behavior the one-shot
//! commands exercise within a single invocation. Lines starting with `:`
//! are commands; anything else is asked as a question.

use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::answer;
use crate::config::Config;
use crate::ingest;
use crate::ingest::IngestOptions;
use crate::ingest::IngestReport;
use crate::llm::LanguageModel;
use crate::query;
use crate::store::DocStore;

const HELP_TEXT: &str = "\
Commands:
  :ingest <paths>...   load more documents
  :search <query>      show ranked chunks without asking the model
  :summarize           summarize everything ingested so far
  :stats               show ledger counts
  :clear               forget all ingested documents
  :help                show this help
  :quit                exit
Anything else is asked as a question.";

pub fn run_shell(
    config: &Config,
    model: &mut dyn LanguageModel,
    initial_paths: Vec<PathBuf>,
    glob: Option<String>,
) -> Result<()> {
    let mut store = DocStore::new();
    if !initial_paths.is_empty() {
        let report =
            ingest::ingest_paths(&mut store, config, initial_paths, IngestOptions { glob })?;
        print_report(&report);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("docent> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            if !run_command(&mut store, config, model, command)? {
                break;
            }
        } else {
            let reply = answer::answer_question(&store, model, line, config.top_k);
            println!("{reply}");
        }
    }
    Ok(())
}

/// Returns `Ok(false)` when the session should end.
fn run_command(
    store: &mut DocStore,
    config: &Config,
    model: &mut dyn LanguageModel,
    command: &str,
) -> Result<bool> {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    match name {
        "quit" | "exit" => return Ok(false),
        "help" => println!("{HELP_TEXT}"),
        "clear" => {
            store.clear();
            println!("Cleared all ingested documents");
        }
        "stats" => {
            let stats = store.stats();
            println!("Batches: {}", stats.batch_count);
            println!("Documents: {}", stats.doc_count);
            println!("Chunks: {}", stats.chunk_count);
            println!("Content chars: {}", stats.content_chars);
        }
        "ingest" => {
            let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
            if paths.is_empty() {
                println!("usage: :ingest <paths>...");
            } else {
                let report = ingest::ingest_paths(store, config, paths, IngestOptions::default())?;
                print_report(&report);
            }
        }
        "search" => {
            let query_text = words.collect::<Vec<_>>().join(" ");
            if query_text.is_empty() {
                println!("usage: :search <query>");
            } else {
                let ranked: Vec<_> = query::rank_chunks(store, &query_text)
                    .into_iter()
                    .take(config.top_k)
                    .collect();
                query::print_table(&ranked);
            }
        }
        "summarize" => {
            let summary = answer::summarize_documents(store, model, config.max_output_tokens);
            println!("{summary}");
        }
        _ => println!("unknown command :{name}; try :help"),
    }
    Ok(true)
}

fn print_report(report: &IngestReport) {
    println!(
        "Ingested {} documents ({} chunks)",
        report.documents_processed, report.chunks_created
    );
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}
