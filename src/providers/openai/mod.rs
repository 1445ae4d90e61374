
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::providers::{AnswerGenerator, Embedder};
use crate::{Result, SiteQaError};

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for an OpenAI-compatible API, covering both the `/embeddings` and
/// `/chat/completions` endpoints.
///
/// Exactly one response shape is accepted per endpoint; anything else is a
/// hard upstream error rather than a fallback probe.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: Url,
    embedding_model: String,
    chat_model: String,
    api_key: Option<String>,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &ProviderConfig, api_key: Option<String>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SiteQaError::Config(format!("Invalid provider base URL: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .build()
            .into();

        Ok(Self {
            base_url,
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            api_key,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                SiteQaError::Config("Provider base URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().extend(path.split('/'));
        }
        Ok(url)
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting embeddings for {} texts", texts.len());

        let request = EmbeddingsRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let url = self.endpoint("embeddings")?;
        let body = serde_json::to_string(&request)
            .map_err(|e| SiteQaError::Upstream(format!("Failed to encode request: {}", e)))?;

        let response_text = self.post_with_retry(&url, &body)?;

        let response: EmbeddingsResponse = serde_json::from_str(&response_text).map_err(|e| {
            SiteQaError::Upstream(format!("Unexpected embeddings response shape: {}", e))
        })?;

        if response.data.len() != texts.len() {
            return Err(SiteQaError::Upstream(format!(
                "Embeddings count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                response.data.len()
            )));
        }

        // The API reports an index per vector; order by it so input i always
        // receives vector i.
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        for (i, datum) in data.iter().enumerate() {
            if datum.index != i {
                return Err(SiteQaError::Upstream(format!(
                    "Embeddings response has inconsistent indices (missing {})",
                    i
                )));
            }
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn complete_prompt(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion for prompt of {} chars", prompt.len());

        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let url = self.endpoint("chat/completions")?;
        let body = serde_json::to_string(&request)
            .map_err(|e| SiteQaError::Upstream(format!("Failed to encode request: {}", e)))?;

        let response_text = self.post_with_retry(&url, &body)?;

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            SiteQaError::Upstream(format!("Unexpected completion response shape: {}", e))
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(answer)
    }

    fn post_with_retry(&self, url: &Url, body: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match self.try_post(url, body) {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 || *status == 429 {
                                warn!(
                                    "Server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                return Err(SiteQaError::Upstream(format!(
                                    "Provider rejected request: HTTP {}",
                                    status
                                )));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            return Err(SiteQaError::Upstream(format!(
                                "Provider request failed: {}",
                                error
                            )));
                        }
                    };

                    if should_retry {
                        last_error = Some(SiteQaError::Upstream(format!(
                            "Provider request failed: {}",
                            error
                        )));
                        if attempt < self.retry_attempts {
                            let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 500;
                            std::thread::sleep(Duration::from_millis(delay_ms));
                        }
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SiteQaError::Upstream("Provider request failed after retries".to_string())
        }))
    }

    fn try_post(&self, url: &Url, body: &str) -> std::result::Result<String, ureq::Error> {
        let mut request = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &format!("Bearer {}", key));
        }
        request
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    #[inline]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| SiteQaError::Upstream("Embeddings response was empty".to_string()))
    }

    #[inline]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_texts(texts)
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiClient {
    #[inline]
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.complete_prompt(prompt)
    }
}
