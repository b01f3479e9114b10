//! Snap point resolution
//!
//! A snap point is the fraction of the container extent a sheet exposes when
//! it rests at that point. Offsets measure the distance from the container's
//! top edge to the sheet's top edge, so a larger fraction yields a smaller
//! offset.
//!
//! Everything in this module is pure.

use crate::error::ConfigError;

/// Distances (px) closer than this count as equal when picking a snap point
pub const TIE_TOLERANCE: f32 = 1e-3;

/// A validated, strictly ascending, duplicate-free list of snap fractions.
///
/// Index 0 is the most collapsed point, the last index the most expanded.
/// The only way to build one is [`normalize`], so a `SnapPoints` is never
/// empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapPoints {
    fractions: Vec<f32>,
}

impl SnapPoints {
    /// Number of snap points (always at least one)
    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Index of the most expanded snap point
    pub fn last_index(&self) -> usize {
        self.fractions.len() - 1
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.fractions
    }

    /// Fraction at `index`, clamped into range
    pub fn fraction(&self, index: usize) -> f32 {
        self.fractions[index.min(self.last_index())]
    }

    /// Clamp a signed index into this list's valid range
    pub fn clamp(&self, index: isize) -> usize {
        clamp_index(index, self.len())
    }

    /// Absolute offset of the snap point at `index`
    pub fn offset_of(&self, index: usize, container_extent: f32) -> f32 {
        to_offset(self.fraction(index), container_extent)
    }

    /// Offsets of every snap point, in index order (descending values)
    pub fn offsets(&self, container_extent: f32) -> Vec<f32> {
        self.fractions
            .iter()
            .map(|&fraction| to_offset(fraction, container_extent))
            .collect()
    }

    /// The smallest offset a sheet may reach (fully expanded)
    pub fn most_expanded_offset(&self, container_extent: f32) -> f32 {
        self.offset_of(self.last_index(), container_extent)
    }

    /// The offset of the most collapsed resting point
    pub fn most_collapsed_offset(&self, container_extent: f32) -> f32 {
        self.offset_of(0, container_extent)
    }

    /// Index of the snap point closest to `offset`; ties go to the lower index
    pub fn nearest_index(&self, offset: f32, container_extent: f32) -> usize {
        nearest_index(&self.offsets(container_extent), offset)
    }
}

/// Sort, deduplicate and validate a list of snap fractions.
///
/// Every fraction must be finite and lie in (0, 1]. Input order and any
/// duplicates are irrelevant: the result contains each distinct value once,
/// ascending.
pub fn normalize(fractions: &[f32]) -> Result<SnapPoints, ConfigError> {
    if let Some((index, &value)) = fractions
        .iter()
        .enumerate()
        .find(|(_, f)| !f.is_finite() || **f <= 0.0 || **f > 1.0)
    {
        return Err(ConfigError::InvalidSnapPoint { index, value });
    }

    let mut sorted = fractions.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();

    if sorted.is_empty() {
        return Err(ConfigError::EmptySnapPoints);
    }

    Ok(SnapPoints { fractions: sorted })
}

/// Offset of the sheet's top edge when `fraction` of the container is exposed
#[inline]
pub fn to_offset(fraction: f32, container_extent: f32) -> f32 {
    (f64::from(container_extent) * (1.0 - f64::from(fraction))) as f32
}

/// Clamp a possibly negative index into `[0, count - 1]`.
///
/// A `count` of zero yields 0.
pub fn clamp_index(index: isize, count: usize) -> usize {
    if count == 0 || index <= 0 {
        return 0;
    }
    (index as usize).min(count - 1)
}

/// Position of the entry in `offsets` nearest to `target`.
///
/// A candidate replaces the current best only when it is closer by more than
/// [`TIE_TOLERANCE`], so equidistant candidates resolve to the lower index even
/// when the offsets carry float rounding.
pub fn nearest_index(offsets: &[f32], target: f32) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (index, offset) in offsets.iter().enumerate() {
        let distance = (offset - target).abs();
        if distance < best_distance - TIE_TOLERANCE {
            best = index;
            best_distance = distance;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let inputs: [&[f32]; 5] = [
            &[0.9, 0.4],
            &[0.4, 0.9, 0.4],
            &[0.9, 0.9, 0.9, 0.4],
            &[0.25, 1.0, 0.5, 0.75, 0.5],
            &[1.0],
        ];

        for input in inputs {
            let points = normalize(input).unwrap();
            let slice = points.as_slice();

            assert!(slice.windows(2).all(|w| w[0] < w[1]), "{slice:?}");
            for value in input {
                assert!(slice.contains(value));
            }
            for value in slice {
                assert!(input.contains(value));
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(&[0.9, 0.4, 0.6, 0.4]).unwrap();
        let twice = normalize(once.as_slice()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert_eq!(normalize(&[]), Err(ConfigError::EmptySnapPoints));
    }

    #[test]
    fn test_normalize_rejects_out_of_range() {
        assert_eq!(
            normalize(&[0.4, 0.0]),
            Err(ConfigError::InvalidSnapPoint {
                index: 1,
                value: 0.0
            })
        );
        assert!(matches!(
            normalize(&[1.5]),
            Err(ConfigError::InvalidSnapPoint { index: 0, .. })
        ));
        assert!(normalize(&[f32::NAN]).is_err());
    }

    #[test]
    fn test_to_offset() {
        assert_eq!(to_offset(1.0, 800.0), 0.0);
        assert_eq!(to_offset(0.5, 800.0), 400.0);
        assert!((to_offset(0.4, 800.0) - 480.0).abs() < 1e-3);
    }

    #[test]
    fn test_to_offset_decreases_with_fraction() {
        let extent = 640.0;
        let mut previous = f32::INFINITY;
        for step in 1..=100 {
            let offset = to_offset(step as f32 / 100.0, extent);
            assert!(offset < previous);
            previous = offset;
        }
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(99, 2), 1);
        assert_eq!(clamp_index(-5, 2), 0);
        assert_eq!(clamp_index(1, 2), 1);
        assert_eq!(clamp_index(3, 0), 0);
    }

    #[test]
    fn test_nearest_index_tie_goes_low() {
        assert_eq!(nearest_index(&[480.0, 80.0], 280.0), 0);
        assert_eq!(nearest_index(&[480.0, 80.0], 279.0), 1);
        assert_eq!(nearest_index(&[480.0, 80.0], 800.0), 0);
    }

    #[test]
    fn test_nearest_index_ties_survive_rounding() {
        // 0.9 has no exact f32 form, so its offset lands a hair above 80
        let points = normalize(&[0.4, 0.9]).unwrap();
        let offsets = points.offsets(800.0);
        assert_ne!(offsets[1], 80.0);

        assert_eq!(nearest_index(&offsets, 280.0), 0);
        assert_eq!(points.nearest_index(280.0, 800.0), 0);
        assert_eq!(nearest_index(&offsets, offsets[1] + 200.0), 0);
        assert_eq!(nearest_index(&offsets, 279.9), 1);
    }

    #[test]
    fn test_snap_points_offsets() {
        let points = normalize(&[0.9, 0.4]).unwrap();
        let offsets = points.offsets(800.0);

        assert_eq!(offsets.len(), 2);
        assert!((offsets[0] - 480.0).abs() < 1e-3);
        assert!((offsets[1] - 80.0).abs() < 1e-3);
        assert_eq!(points.most_expanded_offset(800.0), offsets[1]);
        assert_eq!(points.most_collapsed_offset(800.0), offsets[0]);
        assert_eq!(points.clamp(7), 1);
    }
}
