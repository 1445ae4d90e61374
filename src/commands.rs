use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use crate::SiteQaError;
use crate::config::Config;
use crate::crawler::validate_url;
use crate::index::VectorIndex;
use crate::orchestrator::Orchestrator;
use crate::providers::openai::OpenAiClient;

fn load_config() -> Result<Config> {
    let dir = Config::default_dir()?;
    Config::load(dir)
}

fn parse_seeds(urls: &[String]) -> Result<Vec<Url>> {
    urls.iter()
        .map(|u| validate_url(u).with_context(|| format!("Invalid seed URL: {}", u)))
        .collect()
}

fn build_orchestrator(config: Config) -> Result<Orchestrator> {
    let client = Arc::new(OpenAiClient::new(&config.provider, config.api_key())?);
    Ok(Orchestrator::new(
        config,
        Arc::new(VectorIndex::new()),
        Arc::clone(&client) as Arc<dyn crate::providers::Embedder>,
        client,
    ))
}

async fn initialize(orchestrator: &Orchestrator, seeds: &[Url]) -> Result<()> {
    println!("Indexing {} site(s)...", seeds.len());

    let report = orchestrator.initialize(seeds).await?;
    println!(
        "{} Indexed {} chunks from {} site(s).",
        style("✓").green(),
        report.chunk_count,
        report.site_count
    );
    Ok(())
}

async fn answer_one(orchestrator: &Orchestrator, question: &str) {
    match orchestrator.query(question).await {
        Ok(answer) => {
            println!();
            println!("{}", answer);
            println!();
        }
        Err(SiteQaError::NoContent(_)) => {
            println!("No relevant content was found for that question.");
        }
        Err(e) => {
            error!("Query failed: {}", e);
            println!("{} {}", style("✗").red(), e);
        }
    }
}

/// Index the given sites, then answer questions interactively until the user
/// enters an empty line, "exit", or "quit".
#[inline]
pub async fn chat(urls: Vec<String>) -> Result<()> {
    let seeds = parse_seeds(&urls)?;
    let orchestrator = build_orchestrator(load_config()?)?;
    initialize(&orchestrator, &seeds).await?;

    let status = orchestrator.status();
    info!(
        "Session ready with {} documents, primary URL {:?}",
        status.document_count, status.primary_url
    );
    println!("Ask a question about the indexed content (empty line to exit).");

    loop {
        let read = Input::new()
            .with_prompt("?")
            .allow_empty(true)
            .interact_text();
        let Some(question) = question_or_eof(read) else {
            break;
        };

        let question = question.trim();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }

        answer_one(&orchestrator, question).await;
    }

    Ok(())
}

/// Closed stdin (EOF, or a detached terminal) ends the question loop the same
/// way an empty line does, rather than surfacing as a failure.
fn question_or_eof(read: dialoguer::Result<String>) -> Option<String> {
    match read {
        Ok(question) => Some(question),
        Err(e) => {
            debug!("Question input ended: {}", e);
            None
        }
    }
}

/// Index the given sites and answer a single question.
#[inline]
pub async fn ask(question: String, urls: Vec<String>) -> Result<()> {
    let seeds = parse_seeds(&urls)?;
    let orchestrator = build_orchestrator(load_config()?)?;
    initialize(&orchestrator, &seeds).await?;

    let answer = orchestrator.query(&question).await?;
    println!("{}", answer);

    Ok(())
}

/// Print the active configuration as TOML.
#[inline]
pub fn show_config() -> Result<()> {
    let dir = Config::default_dir()?;
    let config = Config::load(&dir)?;

    println!("Configuration directory: {}", dir.display());
    println!();
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered);

    Ok(())
}

/// Write a default config file if none exists yet.
#[inline]
pub fn init_config() -> Result<()> {
    let dir = Config::default_dir()?;
    let path = dir.join("config.toml");

    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    let config = Config {
        base_dir: dir,
        ..Config::default()
    };
    config.save()?;
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}
