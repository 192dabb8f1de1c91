//! Fitted TF-IDF text vectorizer
//!
//! The vocabulary and idf weights come from the training run that produced the
//! similarity matrix. Transforming text here must reproduce the vectors the
//! matrix was built from, so tokenisation mirrors the fitted settings exactly:
//! tokens are runs of word characters at least `min_token_len` long, optionally
//! lower-cased, weighted by `tf * idf` and L2-normalised.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::artifacts::ArtifactError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term → column
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column
    idf: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_min_token_len")]
    min_token_len: usize,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_true")]
    normalize: bool,
}

fn default_true() -> bool {
    true
}

fn default_min_token_len() -> usize {
    2
}

/// Sparse vector with strictly increasing column indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from (column, value) pairs, dropping zeros
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (col, value) in entries {
            *merged.entry(col).or_insert(0.0) += value;
        }
        Self {
            entries: merged.into_iter().filter(|(_, v)| *v != 0.0).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_val) = self.entries[i];
            let (b_col, b_val) = other.entries[j];
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; zero when either vector has no weight
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0)
    }

    fn scale(&mut self, factor: f64) {
        for (_, v) in &mut self.entries {
            *v *= factor;
        }
    }
}

impl TfidfVectorizer {
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: true,
            min_token_len: default_min_token_len(),
            sublinear_tf: false,
            normalize: true,
        }
    }

    /// Number of columns produced by `transform`
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Checks that every vocabulary column has an idf weight
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if let Some((term, col)) = self
            .vocabulary
            .iter()
            .find(|(_, col)| **col >= self.idf.len())
        {
            return Err(ArtifactError::Incompatible(format!(
                "vectorizer term '{}' maps to column {} but idf has {} entries",
                term,
                col,
                self.idf.len()
            )));
        }
        Ok(())
    }

    fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(move |token| token.chars().count() >= self.min_token_len)
            .map(move |token| {
                if self.lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
    }

    /// Maps raw text to its TF-IDF vector; out-of-vocabulary terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in self.tokenize(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector::from_entries(counts.into_iter().map(|(col, count)| {
            let tf = if self.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            (col, tf * self.idf[col])
        }));

        if self.normalize {
            let norm = vector.norm();
            if norm > 0.0 {
                vector.scale(1.0 / norm);
            }
        }

        vector
    }
}
