//! Content feature extraction: TF-IDF vectors over item text.
//!
//! Each item contributes one document (its genre and synopsis text).
//! Terms are weighted by term frequency × smoothed inverse document
//! frequency and every item vector is L2-normalised, so the dot
//! product of two item vectors is directly their cosine similarity.
//!
//! ## Determinism
//! Given the same corpus the builder always produces the same
//! vocabulary and the same vectors: tokenization has no configuration,
//! the vocabulary cap resolves ties lexicographically, and term
//! indices are assigned in sorted term order.

use dataset::SparseVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Term ↔ index map for the content vector space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    fn from_sorted_terms(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx as u32))
            .collect();
        Self { terms, index }
    }

    pub fn index_of(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    pub fn term_of(&self, index: u32) -> &str {
        &self.terms[index as usize]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Lowercased alphanumeric runs of at least two characters.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(|token| token.to_string())
        .collect()
}

/// Build one TF-IDF vector per document plus the vocabulary used.
///
/// The vocabulary is capped at `max_terms`: when the corpus has more
/// distinct terms, the ones with the lowest corpus-wide frequency are
/// dropped (ties broken lexicographically so the cut is stable).
pub fn build_content_vectors(
    documents: &[String],
    max_terms: usize,
) -> (Vec<SparseVector>, Vocabulary) {
    let tokenized: Vec<Vec<String>> = documents.par_iter().map(|doc| tokenize(doc)).collect();

    // Corpus-wide term frequency and document frequency.
    let mut corpus_tf: HashMap<&str, u64> = HashMap::new();
    let mut doc_freq: HashMap<&str, u64> = HashMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = Vec::new();
        for token in tokens {
            *corpus_tf.entry(token).or_insert(0) += 1;
            if !seen.contains(&token.as_str()) {
                seen.push(token);
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }
    }

    // Cap the vocabulary by corpus frequency, then assign indices in
    // sorted term order.
    let mut ranked: Vec<(&str, u64)> = corpus_tf.iter().map(|(&t, &c)| (t, c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.truncate(max_terms);

    let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
    terms.sort_unstable();
    let vocabulary = Vocabulary::from_sorted_terms(terms);

    // Smoothed idf, as if one extra document contained every term.
    let n_docs = documents.len() as f64;
    let idf: Vec<f64> = (0..vocabulary.len() as u32)
        .map(|idx| {
            let df = doc_freq[vocabulary.term_of(idx)] as f64;
            ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
        })
        .collect();

    let vectors: Vec<SparseVector> = tokenized
        .par_iter()
        .map(|tokens| {
            let mut counts: HashMap<u32, u32> = HashMap::new();
            for token in tokens {
                if let Some(idx) = vocabulary.index_of(token) {
                    *counts.entry(idx).or_insert(0) += 1;
                }
            }
            let entries = counts
                .into_iter()
                .map(|(idx, count)| (idx, (count as f64 * idf[idx as usize]) as f32))
                .collect();
            let mut vector = SparseVector::from_entries(entries);
            vector.l2_normalize();
            vector
        })
        .collect();

    info!(
        documents = documents.len(),
        vocabulary = vocabulary.len(),
        "built content vectors"
    );

    (vectors, vocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Sci-Fi: a SPACE odyssey, 2001!"),
            vec!["sci", "fi", "space", "odyssey", "2001"]
        );
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(tokenize("a b cd"), vec!["cd"]);
    }

    #[test]
    fn test_vectors_are_unit_norm() {
        let (vectors, _) = build_content_vectors(
            &docs(&["drama love story", "horror night", "drama night story"]),
            100,
        );
        for vector in &vectors {
            if !vector.is_empty() {
                assert!((vector.norm() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_shared_terms_raise_similarity() {
        let (vectors, _) = build_content_vectors(
            &docs(&[
                "drama romance seoul",
                "drama romance busan",
                "horror zombie outbreak",
            ]),
            100,
        );
        let close = vectors[0].cosine(&vectors[1]);
        let far = vectors[0].cosine(&vectors[2]);
        assert!(close > far);
        assert!(far.abs() < 1e-12);
    }

    #[test]
    fn test_empty_document_yields_empty_vector() {
        let (vectors, _) = build_content_vectors(&docs(&["", "drama story"]), 100);
        assert!(vectors[0].is_empty());
        assert!(!vectors[1].is_empty());
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent() {
        let (_, vocabulary) = build_content_vectors(
            &docs(&["aa aa aa bb bb cc", "aa bb dd", "aa bb"]),
            2,
        );
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.index_of("aa").is_some());
        assert!(vocabulary.index_of("bb").is_some());
        assert!(vocabulary.index_of("cc").is_none());
    }

    #[test]
    fn test_build_is_deterministic() {
        let corpus = docs(&["drama love story", "comedy love", "thriller chase night"]);
        let (va, a) = build_content_vectors(&corpus, 4);
        let (vb, b) = build_content_vectors(&corpus, 4);
        assert_eq!(a, b);
        assert_eq!(va, vb);
    }
}
