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

mod answer;
mod chunk;
mod cli;
mod config;
mod ingest;
mod llm;
mod model;
mod output;
mod query;
mod shell;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::config::Config;
use crate::ingest::IngestOptions;
use crate::llm::GeminiClient;
use crate::output::JsonResponse;
use crate::output::StatsOut;
use crate::output::print_json;
use crate::store::DocStore;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => {
            handle_result(cmd_ingest(args.paths, args.glob, args.json), args.json)
        }
        Commands::Search(args) => handle_result(
            cmd_search(args.query, args.paths, args.glob, args.top_k, args.json),
            args.json,
        ),
        Commands::Ask(args) => handle_result(
            cmd_ask(args.question, args.paths, args.glob, args.top_k, args.json),
            args.json,
        ),
        Commands::Summarize(args) => handle_result(
            cmd_summarize(args.paths, args.glob, args.max_tokens, args.json),
            args.json,
        ),
        Commands::Shell(args) => cmd_shell(args.paths, args.glob),
        Commands::Doctor { json } => handle_result(cmd_doctor(json), json),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = JsonResponse::error("error", &format!("{err:#}"));
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn load_store(
    config: &Config,
    paths: Vec<PathBuf>,
    glob: Option<String>,
) -> Result<(DocStore, ingest::IngestReport)> {
    let mut store = DocStore::new();
    let report = ingest::ingest_paths(&mut store, config, paths, IngestOptions { glob })?;
    Ok((store, report))
}

fn cmd_ingest(paths: Vec<PathBuf>, glob: Option<String>, json: bool) -> Result<()> {
    let started = Instant::now();
    let config = config::load_global_config()?;
    let (store, report) = load_store(&config, paths, glob)?;

    if json {
        let resp = JsonResponse::ok()
            .with_results(metadata_results(&store)?)
            .with_stats(StatsOut::from_store(
                &store.stats(),
                started.elapsed().as_millis() as i64,
            ))
            .with_warnings(report.warnings);
        print_json(&resp)?;
    } else {
        println!(
            "Ingested {} documents ({} chunks)",
            report.documents_processed, report.chunks_created
        );
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
    }
    Ok(())
}

fn metadata_results(store: &DocStore) -> Result<Vec<Value>> {
    let mut results = Vec::new();
    for batch in store.batches() {
        for meta in &batch.metadata {
            results.push(serde_json::to_value(meta).context("serialize document metadata")?);
        }
    }
    Ok(results)
}

fn cmd_search(
    query_text: String,
    paths: Vec<PathBuf>,
    glob: Option<String>,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let started = Instant::now();
    let config = config::load_global_config()?;
    let top_k = top_k.unwrap_or(config.top_k);
    let (store, report) = load_store(&config, paths, glob)?;

    let ranked: Vec<_> = query::rank_chunks(&store, &query_text)
        .into_iter()
        .take(top_k)
        .collect();

    if json {
        let results = ranked
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("serialize results")?;
        let resp = JsonResponse::ok()
            .with_query(&query_text, top_k)
            .with_results(results)
            .with_stats(StatsOut::from_store(
                &store.stats(),
                started.elapsed().as_millis() as i64,
            ))
            .with_warnings(report.warnings);
        print_json(&resp)?;
    } else {
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
        query::print_table(&ranked);
    }
    Ok(())
}

fn cmd_ask(
    question: String,
    paths: Vec<PathBuf>,
    glob: Option<String>,
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let started = Instant::now();
    let config = config::load_global_config()?;
    // Fail on a missing key before any documents are read.
    let mut model = GeminiClient::from_env(&config)?;
    let top_k = top_k.unwrap_or(config.top_k);
    let (store, report) = load_store(&config, paths, glob)?;

    let reply = answer::answer_question(&store, &mut model, &question, top_k);

    if json {
        let resp = JsonResponse::ok()
            .with_query(&question, top_k)
            .with_answer(&reply)
            .with_stats(StatsOut::from_store(
                &store.stats(),
                started.elapsed().as_millis() as i64,
            ))
            .with_warnings(report.warnings);
        print_json(&resp)?;
    } else {
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
        println!("{reply}");
    }
    Ok(())
}

fn cmd_summarize(
    paths: Vec<PathBuf>,
    glob: Option<String>,
    max_tokens: Option<u32>,
    json: bool,
) -> Result<()> {
    let started = Instant::now();
    let config = config::load_global_config()?;
    let mut model = GeminiClient::from_env(&config)?;
    let max_tokens = max_tokens.unwrap_or(config.max_output_tokens);
    let (store, report) = load_store(&config, paths, glob)?;

    let summary = answer::summarize_documents(&store, &mut model, max_tokens);

    if json {
        let resp = JsonResponse::ok()
            .with_summary(&summary)
            .with_stats(StatsOut::from_store(
                &store.stats(),
                started.elapsed().as_millis() as i64,
            ))
            .with_warnings(report.warnings);
        print_json(&resp)?;
    } else {
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
        println!("{summary}");
    }
    Ok(())
}

fn cmd_shell(paths: Vec<PathBuf>, glob: Option<String>) -> Result<()> {
    let config = config::load_global_config()?;
    let mut model = GeminiClient::from_env(&config)?;
    shell::run_shell(&config, &mut model, paths, glob)
}

fn cmd_doctor(json: bool) -> Result<()> {
    let config = config::load_global_config()?;
    let config_file = config::global_config_path().filter(|path| path.exists());
    // Report presence only; the key value never leaves the environment.
    let api_key = match std::env::var(llm::API_KEY_VAR) {
        Ok(value) if !value.is_empty() => "configured",
        _ => "missing",
    };

    if json {
        let diagnostics = serde_json::json!({
            "config_file": config_file.map(|path| path.display().to_string()),
            "chunk_size": config.chunk_size,
            "chunk_overlap": config.chunk_overlap,
            "top_k": config.top_k,
            "model": config.model,
            "api_key": api_key,
        });
        let resp = JsonResponse::ok().with_diagnostics(diagnostics);
        print_json(&resp)?;
    } else {
        match config_file {
            Some(path) => println!("Config: {}", path.display()),
            None => println!("Config: defaults (no config file)"),
        }
        println!(
            "Chunk window: {} chars with {} overlap",
            config.chunk_size, config.chunk_overlap
        );
        println!("Model: {}", config.model);
        println!("API key: {api_key}");
    }
    Ok(())
}

fn cmd_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "docent", &mut std::io::stdout());
    Ok(())
}
