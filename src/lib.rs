use thiserror::Error;

pub type Result<T> = std::result::Result<T, SiteQaError>;

#[derive(Error, Debug)]
pub enum SiteQaError {
    /// Bad request input: empty query, no seeds, malformed URL.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Operation requires a populated index.
    #[error("Not ready: {0}")]
    State(String),

    /// An external collaborator (embedder, answer generator) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The pipeline ran but produced nothing to work with.
    #[error("No content: {0}")]
    NoContent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod chunker;
pub mod commands;
pub mod config;
pub mod crawler;
pub mod extractor;
pub mod index;
pub mod orchestrator;
pub mod providers;
