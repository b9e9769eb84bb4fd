//! Text embeddings for relevance ranking.
//!
//! [`HashedNgramEmbedder`] maps word unigrams and character trigrams into a
//! fixed number of buckets with FNV-1a. It needs no model files and gives
//! the same vector for the same text on every machine.

use unicode_normalization::UnicodeNormalization;

/// Default number of embedding dimensions.
pub const DEFAULT_DIMENSIONS: usize = 512;

/// Weight of a word unigram relative to a character trigram.
const WORD_WEIGHT: f32 = 2.0;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Turns text into a fixed-length vector.
pub trait Embedder: Send + Sync {
    /// Embed one text.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Length of every vector returned by [`Embedder::embed`].
    fn dimensions(&self) -> usize;
}

/// Bag of hashed word and character n-grams, L2 normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedNgramEmbedder {
    dimensions: usize,
}

impl HashedNgramEmbedder {
    /// Create an embedder with `dimensions` buckets (at least one).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, feature: &str, salt: u8) -> usize {
        (fnv1a(salt, feature.as_bytes()) % self.dimensions as u64) as usize
    }
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashedNgramEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let normalized = normalize(text);

        for word in normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(word, b'w')] += WORD_WEIGHT;

            // Padded so short words still contribute a trigram
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            let mut gram = String::with_capacity(12);
            for window in padded.windows(3) {
                gram.clear();
                gram.extend(window);
                vector[self.bucket(&gram, b'c')] += 1.0;
            }
        }

        l2_normalize(&mut vector);
        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// NFKC-normalize and lowercase.
fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

fn fnv1a(salt: u8, bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in std::iter::once(&salt).chain(bytes) {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for vectors of different length or with zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_is_normalized() {
        let embedder = HashedNgramEmbedder::default();
        let v = embedder.embed("Plan a trip to the coast");
        assert_eq!(v.len(), DEFAULT_DIMENSIONS);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_embed_empty_text() {
        let embedder = HashedNgramEmbedder::new(64);
        let v = embedder.embed("  ...  ");
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
        assert_eq!(cosine_similarity(&v, &embedder.embed("anything")), 0.0);
    }

    #[test]
    fn test_embed_normalizes_case_and_width() {
        let embedder = HashedNgramEmbedder::default();
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(embedder.embed("ＰＤＦ Forms"), embedder.embed("pdf forms"));
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashedNgramEmbedder::default();
        let query = embedder.embed("As a travel planner, I need to plan coastal beach activities.");
        let near = embedder.embed("Beach activities along the coast: swimming and sailing.");
        let far = embedder.embed("Configure the signature fields of fillable forms.");
        assert!(cosine_similarity(&query, &near) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
