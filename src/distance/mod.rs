//! Similarity computation with scalar and SIMD kernels.
//!
//! The store scores candidates by raw dot product. Recognition models emit
//! unit-normalized embeddings, in which case the dot product equals cosine
//! similarity; vectors that are not unit length are scored as given, and
//! keeping them normalized is the caller's contract.

pub mod scalar;
pub mod simd;

pub use simd::dot_product;

/// Similarity between two equal-length feature vectors.
///
/// # Panics
/// Panics if the vectors have different dimensions. The database checks
/// lengths before any probe reaches this point.
#[inline]
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    dot_product(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_is_dot_product() {
        let a = vec![3.0, 4.0];
        let b = vec![1.0, 2.0];
        // Not normalized: raw dot product, not cosine.
        assert!((similarity(&a, &b) - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_unit_vectors() {
        let a = vec![1.0, 0.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0, 0.0];
        assert_eq!(similarity(&a, &a), 1.0);
        assert_eq!(similarity(&a, &b), 0.0);
    }
}
