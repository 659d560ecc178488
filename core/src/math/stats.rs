pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Smallest and largest value, `None` for an empty slice.
    pub fn extrema(samples: &[f64]) -> Option<(f64, f64)> {
        let first = *samples.first()?;
        Some(
            samples
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    pub fn is_non_decreasing(samples: &[f64]) -> bool {
        samples.windows(2).all(|pair| pair[1] >= pair[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        assert_eq!(StatsHelper::rms(&[4.0]), 4.0);
    }

    #[test]
    fn extrema_and_mean() {
        assert_eq!(StatsHelper::extrema(&[]), None);
        assert_eq!(StatsHelper::extrema(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(StatsHelper::mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn non_decreasing_accepts_plateaus() {
        assert!(StatsHelper::is_non_decreasing(&[0.0, 0.0, 0.6, 0.6]));
        assert!(!StatsHelper::is_non_decreasing(&[0.0, 1.0, 0.5]));
    }
}
