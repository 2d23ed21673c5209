//! Cosine similarity ranking over the whole corpus index.

use sanad_core::types::RankedResult;
use std::cmp::Ordering;

use crate::index::CorpusIndex;

/// Cosine of the angle between `a` and `b`.
///
/// Zero-norm inputs score 0 rather than NaN. Vectors of different lengths
/// are compared over their common prefix with each norm taken over the full
/// vector, so a dimension mismatch lowers the score instead of panicking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32;
    if sim.is_finite() { sim } else { 0.0 }
}

/// Score every chunk against `query` and order by descending similarity.
///
/// Full scan, no pruning. The sort is stable, so equal scores keep corpus
/// order (ascending chunk index).
pub fn rank(query: &[f32], index: &CorpusIndex) -> Vec<RankedResult> {
    let mut results: Vec<RankedResult> = index
        .iter()
        .map(|(chunk, vector)| RankedResult {
            chunk: chunk.clone(),
            similarity: cosine_similarity(query, vector),
        })
        .collect();

    results.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
    results
}

/// `rank` truncated to the best `k` results.
pub fn top_k(query: &[f32], index: &CorpusIndex, k: usize) -> Vec<RankedResult> {
    let mut results = rank(query, index);
    results.truncate(k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_text;

    fn index_of(vectors: Vec<Vec<f32>>) -> CorpusIndex {
        let text = (0..vectors.len())
            .map(|i| format!("Chunk {i}."))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, 8, 0);
        CorpusIndex::new(chunks, vectors).unwrap()
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3, -1.2, 4.5, 0.0, 2.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let a = [1.0, 2.0, 3.0];
        let b = [-0.5, 4.0, 0.25];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_is_zero_not_nan() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_does_not_panic() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0]);
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_rank_descending() {
        let index = index_of(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
        let ranked = rank(&[1.0, 0.0], &index);
        let order: Vec<usize> = ranked.iter().map(|r| r.chunk.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        for pair in ranked.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let index = index_of(vec![
            vec![0.0, 1.0],
            vec![2.0, 0.0],
            vec![0.0, 3.0],
            vec![5.0, 0.0],
        ]);
        let ranked = rank(&[1.0, 0.0], &index);
        let order: Vec<usize> = ranked.iter().map(|r| r.chunk.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_rank_is_deterministic_and_pure() {
        let index = index_of(vec![vec![0.2, 0.9], vec![0.7, 0.1]]);
        let before = index.vectors().to_vec();
        let first = rank(&[0.5, 0.5], &index);
        let second = rank(&[0.5, 0.5], &index);
        assert_eq!(first, second);
        assert_eq!(index.vectors(), before.as_slice());
    }

    #[test]
    fn test_top_k_truncates() {
        let index = index_of(vec![vec![1.0], vec![1.0], vec![1.0], vec![1.0]]);
        assert_eq!(top_k(&[1.0], &index, 3).len(), 3);
        assert_eq!(top_k(&[1.0], &index, 10).len(), 4);
    }
}
