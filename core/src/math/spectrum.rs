use crate::math::stats::StatsHelper;
use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Helper that wraps the `rustfft` planner for one-sided magnitude spectra.
pub struct SpectrumHelper {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl SpectrumHelper {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Magnitudes of bins `0..=size/2` after removing the mean.
    ///
    /// Input is zero-padded or truncated to the planned size.
    pub fn magnitudes(&self, input: &[f64]) -> Vec<f64> {
        let used = input.len().min(self.size);
        let mean = StatsHelper::mean(&input[..used]);
        let mut buffer: Vec<Complex64> = input[..used]
            .iter()
            .map(|&value| Complex64::new(value - mean, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());

        self.fft.process(&mut buffer);
        buffer
            .iter()
            .take(self.size / 2 + 1)
            .map(|c| c.norm())
            .collect()
    }

    /// Strongest non-DC bin.
    pub fn dominant_bin(magnitudes: &[f64]) -> Option<usize> {
        magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, m)| **m > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
    }

    /// Angular frequency in radians per sample for a bin.
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        2.0 * PI * bin as f64 / self.size as f64
    }

    /// Gain of `y[n] = a*x[n] + (1-a)*y[n-1]` at `omega` radians per sample.
    pub fn smoothing_gain(alpha: f64, omega: f64) -> f64 {
        let decay = 1.0 - alpha;
        alpha / (1.0 - 2.0 * decay * omega.cos() + decay * decay).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, bin: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / len as f64).sin())
            .collect()
    }

    #[test]
    fn spectrum_finds_pure_tone() {
        let helper = SpectrumHelper::new(64);
        let mags = helper.magnitudes(&tone(64, 4));
        assert_eq!(mags.len(), 33);
        assert_eq!(SpectrumHelper::dominant_bin(&mags), Some(4));
    }

    #[test]
    fn constant_input_has_no_dominant_bin() {
        let helper = SpectrumHelper::new(16);
        let mags = helper.magnitudes(&[490.0; 16]);
        assert!(mags.iter().all(|m| m.abs() < 1e-9));
        assert_eq!(SpectrumHelper::dominant_bin(&mags), None);
    }

    #[test]
    fn smoothing_gain_is_unity_at_dc() {
        assert!((SpectrumHelper::smoothing_gain(0.1, 0.0) - 1.0).abs() < 1e-12);
        assert!(SpectrumHelper::smoothing_gain(0.1, PI) < 0.06);
    }

    #[test]
    fn measured_gain_tracks_analytic_gain() {
        let alpha = 0.1;
        let len = 1024;
        let raw = tone(len, 8);
        let mut filtered = Vec::with_capacity(len);
        let mut prev = raw[0];
        for &x in &raw {
            prev = alpha * x + (1.0 - alpha) * prev;
            filtered.push(prev);
        }

        let helper = SpectrumHelper::new(len);
        let raw_mags = helper.magnitudes(&raw);
        let filtered_mags = helper.magnitudes(&filtered);
        let measured = filtered_mags[8] / raw_mags[8];
        let analytic = SpectrumHelper::smoothing_gain(alpha, helper.bin_frequency(8));
        assert!((measured - analytic).abs() / analytic < 0.05);
    }
}
