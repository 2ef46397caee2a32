//! SIMD dot-product kernels with runtime dispatch.
//!
//! - **AVX2+FMA** (x86_64): 8 floats per iteration, selected at runtime
//! - **NEON** (aarch64): 4 floats per iteration, always available
//! - **Scalar**: fallback for everything else
//!
//! [`dot_product`] picks the fastest kernel the running CPU supports.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

#[cfg(target_arch = "x86_64")]
use super::scalar;

/// Compute the dot product using AVX2 and FMA intrinsics.
///
/// # Safety
/// The caller must ensure the CPU supports AVX2 and FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[inline]
pub unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len();
    let mut acc = _mm256_setzero_ps();
    let mut i = 0;

    while i + 8 <= len {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        acc = _mm256_fmadd_ps(va, vb, acc);
        i += 8;
    }

    let lanes: [f32; 8] = std::mem::transmute(acc);
    let mut total: f32 = lanes.iter().sum();

    while i < len {
        total += a[i] * b[i];
        i += 1;
    }

    total
}

/// Compute the dot product using NEON intrinsics.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len();
    let mut i = 0;
    let mut acc = unsafe { vdupq_n_f32(0.0) };

    while i + 4 <= len {
        // SAFETY: i + 4 <= len bounds both loads.
        unsafe {
            let va = vld1q_f32(a.as_ptr().add(i));
            let vb = vld1q_f32(b.as_ptr().add(i));
            acc = vfmaq_f32(acc, va, vb);
        }
        i += 4;
    }

    let mut total = unsafe { vaddvq_f32(acc) };

    while i < len {
        total += a[i] * b[i];
        i += 1;
    }

    total
}

/// Compute the dot product with the best kernel for this CPU.
///
/// # Panics
/// Panics if the vectors have different lengths.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            // SAFETY: both features were just detected.
            return unsafe { dot_product_avx2(a, b) };
        }
        return scalar::dot_product(a, b);
    }

    #[cfg(target_arch = "aarch64")]
    {
        return dot_product_neon(a, b);
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    super::scalar::dot_product(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::scalar;

    #[test]
    fn test_dot_product_matches_scalar_on_tails() {
        for dim in [1, 3, 4, 7, 8, 9, 15, 16, 17, 128, 513] {
            let a: Vec<f32> = (0..dim).map(|i| (i as f32 * 0.37).sin()).collect();
            let b: Vec<f32> = (0..dim).map(|i| (i as f32 * 0.11).cos()).collect();
            let diff = (dot_product(&a, &b) - scalar::dot_product(&a, &b)).abs();
            assert!(diff < 1e-3, "mismatch at dim {}: diff={}", dim, diff);
        }
    }

    #[test]
    fn test_dot_product_exact_small() {
        let a = [1.0, 0.0, 0.0, 0.0];
        let b = [0.9, 0.1, 0.0, 0.0];
        assert_eq!(dot_product(&a, &b), 0.9);
    }
}
