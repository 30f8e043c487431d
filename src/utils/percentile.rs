//! Order statistics over RTT samples.
//!
//! Percentiles use linear interpolation between the two closest order
//! statistics of the sorted samples: the rank of percentile `p` over `n`
//! samples is `p / 100 * (n - 1)`.

/// Calculate the `p`-th percentile (0..=100) of a slice.
///
/// Returns `None` for an empty slice. The result depends only on the
/// multiset of values, never on their order.
///
/// # Examples
/// ```
/// use hopcheck::utils::percentile::percentile;
///
/// assert_eq!(percentile(&[4.0], 5.0), Some(4.0));
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), Some(3.0));
/// assert_eq!(percentile(&[], 5.0), None);
/// ```
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(percentile_of_sorted(&sorted, p))
}

/// Same as [`percentile`] for data that is already sorted ascending and non-empty.
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let p = p.clamp(0.0, 100.0);
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_is_identity() {
        assert_eq!(percentile(&[12.5], 5.0), Some(12.5));
        assert_eq!(percentile(&[12.5], 95.0), Some(12.5));
    }

    #[test]
    fn test_linear_interpolation() {
        // rank = 0.05 * 2 = 0.1 -> 10 + (20 - 10) * 0.1
        let p5 = percentile(&[30.0, 10.0, 20.0], 5.0).unwrap();
        assert!((p5 - 11.0).abs() < 1e-9);

        // rank = 0.05 * 9 = 0.45
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let p5 = percentile(&values, 5.0).unwrap();
        assert!((p5 - 1.45).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(3.0));
    }

    #[test]
    fn test_order_independent() {
        let a = percentile(&[5.0, 1.0, 9.0, 3.0], 5.0);
        let b = percentile(&[9.0, 3.0, 1.0, 5.0], 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[], 0.0), None);
        assert_eq!(percentile(&[], 100.0), None);
    }
}
