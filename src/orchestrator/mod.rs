
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::chunker;
use crate::config::Config;
use crate::crawler::FrontierCrawler;
use crate::index::{Document, VectorIndex};
use crate::providers::{AnswerGenerator, Embedder};
use crate::{Result, SiteQaError};

/// Separator between retrieved chunk texts in the generator prompt.
const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

const ANSWER_PLACEHOLDER: &str = "No answer could be generated for this question.";

/// Session lifecycle. Queries are rejected until an initialize run has
/// populated the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotReady,
    Ready { primary_url: Url },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeReport {
    /// Total chunks indexed across all seeds.
    pub chunk_count: usize,
    /// Number of seeds that yielded at least one page of text.
    pub site_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub ready: bool,
    pub document_count: usize,
    pub primary_url: Option<Url>,
}

/// Drives the initialize and query flows over the crawler, chunker, vector
/// index, and the external embedding/answer providers.
pub struct Orchestrator {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    config: Config,
    state: RwLock<SessionState>,
}

struct PendingChunk {
    text: String,
    source_url: Url,
    chunk_index: usize,
    start: usize,
    end: usize,
}

impl Orchestrator {
    #[inline]
    pub fn new(
        config: Config,
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            config,
            state: RwLock::new(SessionState::NotReady),
        }
    }

    /// Crawl every seed, chunk and embed the extracted text, and replace the
    /// index contents. On success the session transitions to ready with the
    /// first seed recorded as the primary URL.
    ///
    /// A seed whose crawl fails is skipped with a warning. Any failure before
    /// the index swap leaves the previous contents and session state intact.
    #[inline]
    pub async fn initialize(&self, seeds: &[Url]) -> Result<InitializeReport> {
        if seeds.is_empty() {
            return Err(SiteQaError::Input("No seed URLs supplied".to_string()));
        }

        info!("Initializing from {} seed(s)", seeds.len());

        let mut pending = Vec::new();
        let mut site_count = 0;

        for seed in seeds {
            let mut crawler = FrontierCrawler::new(self.config.crawler.clone());
            let pages = match crawler.crawl(seed).await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!("Skipping seed {}: {}", seed, e);
                    continue;
                }
            };

            let before = pending.len();
            for page in pages {
                if page.text.trim().is_empty() {
                    continue;
                }
                for chunk in chunker::chunk_text(&page.text, &self.config.chunking) {
                    pending.push(PendingChunk {
                        text: chunk.text,
                        source_url: page.url.clone(),
                        chunk_index: chunk.index,
                        start: chunk.start,
                        end: chunk.end,
                    });
                }
            }

            if pending.len() > before {
                site_count += 1;
            }
        }

        if pending.is_empty() {
            return Err(SiteQaError::NoContent(
                "No content could be scraped from any seed".to_string(),
            ));
        }

        debug!("Embedding {} chunks", pending.len());
        let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embed_in_batches(&texts).await?;

        let indexed_at = Utc::now().to_rfc3339();
        // Serialized URLs never contain spaces, so a space-joined list is
        // unambiguous to split back apart.
        let seed_urls = seeds
            .iter()
            .map(Url::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let documents: Vec<Document> = pending
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let mut metadata = BTreeMap::new();
                metadata.insert("source_url".to_string(), chunk.source_url.to_string());
                metadata.insert("seed_urls".to_string(), seed_urls.clone());
                metadata.insert("chunk_index".to_string(), chunk.chunk_index.to_string());
                metadata.insert("start".to_string(), chunk.start.to_string());
                metadata.insert("end".to_string(), chunk.end.to_string());
                metadata.insert("indexed_at".to_string(), indexed_at.clone());
                Document {
                    id: Uuid::new_v4().to_string(),
                    content: chunk.text,
                    embedding,
                    metadata,
                }
            })
            .collect();

        let chunk_count = documents.len();
        self.index.replace_all(documents)?;

        let primary_url = seeds[0].clone();
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *state = SessionState::Ready {
                primary_url: primary_url.clone(),
            };
        }

        info!(
            "Indexed {} chunks from {} site(s), primary URL {}",
            chunk_count, site_count, primary_url
        );

        Ok(InitializeReport {
            chunk_count,
            site_count,
        })
    }

    /// Answer a question against the indexed content. Fails before making any
    /// provider call if the session is not ready.
    #[inline]
    pub async fn query(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SiteQaError::Input("Query text is empty".to_string()));
        }

        {
            let state = self
                .state
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if *state == SessionState::NotReady {
                return Err(SiteQaError::State(
                    "No site has been indexed yet; initialize first".to_string(),
                ));
            }
        }

        debug!("Embedding query ({} chars)", question.len());
        let query_vector = self.embedder.embed(question).await?;

        let results = self.index.search(&query_vector, self.config.search.top_k)?;
        if results.is_empty() {
            return Err(SiteQaError::NoContent(
                "No relevant content found for this question".to_string(),
            ));
        }

        debug!("Retrieved {} chunks for context", results.len());
        let prompt = build_prompt(&results, question);
        let answer = self.generator.complete(&prompt).await?;

        if answer.trim().is_empty() {
            Ok(ANSWER_PLACEHOLDER.to_string())
        } else {
            Ok(answer)
        }
    }

    #[inline]
    pub fn status(&self) -> Status {
        let state = self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let primary_url = match &*state {
            SessionState::NotReady => None,
            SessionState::Ready { primary_url } => Some(primary_url.clone()),
        };
        Status {
            ready: primary_url.is_some(),
            document_count: self.index.count(),
            primary_url,
        }
    }

    /// Embed chunk texts in fixed-size batches with a pause between batches,
    /// preserving input order so chunk `i` receives vector `i`.
    async fn embed_in_batches(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.config.provider.batch_size;
        let pause = Duration::from_millis(self.config.provider.batch_pause_ms);

        let mut embeddings = Vec::with_capacity(texts.len());
        let mut batches = texts.chunks(batch_size).peekable();

        while let Some(batch) = batches.next() {
            let vectors = self.embedder.embed_batch(batch).await?;
            if vectors.len() != batch.len() {
                return Err(SiteQaError::Upstream(format!(
                    "Embedder returned {} vectors for a batch of {}",
                    vectors.len(),
                    batch.len()
                )));
            }
            embeddings.extend(vectors);

            if batches.peek().is_some() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        Ok(embeddings)
    }
}

fn build_prompt(documents: &[Document], question: &str) -> String {
    let context: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
    format!(
        "Answer the question using only the context below.\n\n\
         Context:\n{}\n\nQuestion: {}\n\nAnswer:",
        context.join(CONTEXT_DELIMITER),
        question
    )
}
