use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Delimiter between tags in a `champ{i}_tags` cell
pub const TAG_DELIMITER: char = ',';

/// Token-count vectorizer for free-text archetype tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagVectorizer {
    vocabulary: Vec<String>,
}

/// Lower-cased, trimmed, non-empty tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(TAG_DELIMITER)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

impl TagVectorizer {
    pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let vocabulary: BTreeSet<String> = texts.into_iter().flat_map(tokenize).collect();
        Self {
            vocabulary: vocabulary.into_iter().collect(),
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Column names, `tag_<token>` in vocabulary order
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabulary.iter().map(|t| format!("tag_{}", t)).collect()
    }

    /// Token counts in vocabulary order; unknown tokens are dropped
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut counts = vec![0.0; self.vocabulary.len()];
        for token in tokenize(text) {
            if let Ok(i) = self.vocabulary.binary_search(&token) {
                counts[i] += 1.0;
            }
        }
        counts
    }
}
