pub mod openai;

use async_trait::async_trait;

use crate::Result;

/// External text-to-vector service.
///
/// Batch embedding must preserve index correspondence: input *i* receives
/// output *i*.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// External chat-completion service producing the final answer text.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
