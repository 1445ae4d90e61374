
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

use crate::{Result, SiteQaError};

/// A chunk bound to its embedding vector and provenance metadata. Owned
/// exclusively by the index once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique within the index.
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: BTreeMap<String, String>,
}

/// In-memory collection of documents searchable by cosine similarity.
///
/// Single writer (the orchestrator's initialize path, via [`replace_all`]),
/// many readers. Replacement swaps the whole collection under the write lock,
/// so readers observe either the full old or the full new collection.
///
/// [`replace_all`]: VectorIndex::replace_all
#[derive(Debug, Default)]
pub struct VectorIndex {
    documents: RwLock<Vec<Document>>,
}

impl VectorIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically discard the current collection and install `documents`.
    ///
    /// All documents must share one embedding dimensionality; a mismatch is a
    /// usage error and leaves the existing collection untouched.
    #[inline]
    pub fn replace_all(&self, documents: Vec<Document>) -> Result<()> {
        if let Some(first) = documents.first() {
            let dim = first.embedding.len();
            if dim == 0 {
                return Err(SiteQaError::Input(
                    "Documents must have non-empty embeddings".to_string(),
                ));
            }
            for doc in &documents {
                if doc.embedding.len() != dim {
                    return Err(SiteQaError::Input(format!(
                        "Embedding dimensionality mismatch: expected {}, document '{}' has {}",
                        dim,
                        doc.id,
                        doc.embedding.len()
                    )));
                }
            }
        }

        let count = documents.len();
        let mut guard = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = documents;
        drop(guard);

        debug!("Replaced index contents with {} documents", count);
        Ok(())
    }

    /// Return up to `k` documents ordered by descending cosine similarity to
    /// `query`. Ties keep insertion order. An empty index yields an empty
    /// result, not an error; a dimensionality mismatch is an error.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Document>> {
        if k == 0 {
            return Err(SiteQaError::Input("k must be at least 1".to_string()));
        }

        let guard = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if guard.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &Document)> = Vec::with_capacity(guard.len());
        for doc in guard.iter() {
            let score = cosine_similarity(query, &doc.embedding)?;
            scored.push((score, doc));
        }

        // Stable sort on the score alone preserves insertion order for ties.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    /// Current document count.
    #[inline]
    pub fn count(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

/// Cosine similarity of two equal-length vectors, accumulated in f64.
/// Defined as 0 when either norm is zero; a length mismatch is an error
/// rather than a degenerate score.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(SiteQaError::Input(format!(
            "Vector length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / denom) as f32)
}
