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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(
    name = "docent",
    version,
    about = "Ask questions about local documents from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load documents and report what was ingested
    Ingest(IngestArgs),

    /// Rank stored chunks against a query without calling the model
    Search(SearchArgs),

    /// Answer a question from the ingested documents
    Ask(AskArgs),

    /// Summarize everything that was ingested
    Summarize(SummarizeArgs),

    /// Interactive session that keeps documents loaded between questions
    Shell(ShellArgs),

    /// Check configuration and credentials
    Doctor {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Files or directories to load
    pub paths: Vec<PathBuf>,

    /// Glob filter for walked directories
    #[arg(long)]
    pub glob: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Files or directories to load
    pub paths: Vec<PathBuf>,

    /// Glob filter for walked directories
    #[arg(long)]
    pub glob: Option<String>,

    /// Number of chunks to return (defaults to the configured top_k)
    #[arg(long, value_parser = parse_top_k)]
    pub top_k: Option<usize>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// Files or directories to load
    pub paths: Vec<PathBuf>,

    /// Glob filter for walked directories
    #[arg(long)]
    pub glob: Option<String>,

    /// Number of context chunks (defaults to the configured top_k)
    #[arg(long, value_parser = parse_top_k)]
    pub top_k: Option<usize>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Files or directories to load
    pub paths: Vec<PathBuf>,

    /// Glob filter for walked directories
    #[arg(long)]
    pub glob: Option<String>,

    /// Token budget for the summary (defaults to the configured limit)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Files or directories to load before the prompt appears
    pub paths: Vec<PathBuf>,

    /// Glob filter for walked directories
    #[arg(long)]
    pub glob: Option<String>,
}

/// Parse a `--top-k` value, holding it to the same bound as the config file.
fn parse_top_k(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value == 0 {
        return Err("top_k must be at least 1".to_string());
    }
    Ok(value)
}
