//! In-memory feature records and name handling.

use crate::constants::format::MAX_NAME_BYTES;
use rand::Rng;

/// A live record: identity, feature data and optional label.
/// The data is owned and released when the record leaves the index.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: u16,
    pub data: Box<[f32]>,
    pub name: String,
}

impl Feature {
    /// Create a new record. Names are clipped to what the file can hold.
    pub fn new(id: u16, data: Vec<f32>, name: &str) -> Self {
        Self {
            id,
            data: data.into_boxed_slice(),
            name: clip_name(name).to_owned(),
        }
    }

    /// Create a random vector with unit L2 norm, the shape recognition
    /// models emit and the dot-product similarity assumes.
    pub fn random_unit(id: u16, dim: usize) -> Self {
        let mut rng = rand::thread_rng();
        let mut data: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        normalize(&mut data);
        Self::new(id, data, "")
    }

    /// Return the dimensionality of this vector.
    pub fn dim(&self) -> usize {
        self.data.len()
    }
}

/// Scale `data` to unit L2 norm in place. A zero vector is left unchanged.
pub fn normalize(data: &mut [f32]) {
    let norm = data.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        data.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Longest prefix of `name` that fits the name field, cut on a char boundary.
///
/// The stored field is nul-terminated, so anything from the first nul on
/// is dropped as well.
pub fn clip_name(name: &str) -> &str {
    let name = name.split('\0').next().unwrap_or_default();
    if name.len() <= MAX_NAME_BYTES {
        return name;
    }
    let mut end = MAX_NAME_BYTES;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_unit_has_unit_norm() {
        let f = Feature::random_unit(1, 128);
        let norm: f32 = f.data.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_eq!(f.dim(), 128);
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let mut v = vec![0.0; 4];
        normalize(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn test_clip_name() {
        assert_eq!(clip_name("alice"), "alice");

        let long = "x".repeat(40);
        assert_eq!(clip_name(&long).len(), 31);

        // 'é' is two bytes; 16 of them straddle the limit at byte 31.
        let accented = "é".repeat(16);
        let clipped = clip_name(&accented);
        assert_eq!(clipped.len(), 30);
        assert_eq!(clipped.chars().count(), 15);
    }

    #[test]
    fn test_clip_name_stops_at_nul() {
        assert_eq!(clip_name("ab\0cd"), "ab");
        assert_eq!(clip_name("\0hidden"), "");

        let padded = format!("{}\0tail", "y".repeat(40));
        assert_eq!(clip_name(&padded), "y".repeat(31));
    }

    #[test]
    fn test_new_clips_name() {
        let f = Feature::new(3, vec![1.0, 0.0], &"n".repeat(64));
        assert_eq!(f.name.len(), 31);
        assert_eq!(f.id, 3);
    }
}
