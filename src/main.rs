use clap::{Parser, Subcommand};
use siteqa::Result;
use siteqa::commands::{ask, chat, init_config, show_config};

#[derive(Parser)]
#[command(name = "siteqa")]
#[command(about = "Index a website and answer questions about its content")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index one or more sites and answer questions interactively
    Chat {
        /// Seed URLs to crawl and index
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Index one or more sites and answer a single question
    Ask {
        /// The question to answer
        question: String,
        /// Seed URL to crawl and index (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
    },
    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { urls } => {
            chat(urls).await?;
        }
        Commands::Ask { question, urls } => {
            ask(question, urls).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                init_config()?;
            }
        }
    }

    Ok(())
}
