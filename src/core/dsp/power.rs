//! Sub-band spectral power meter

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Measures signal power inside a frequency sub-band.
///
/// Works on fixed-length real signals; all scratch space is sized once at
/// construction. Cloning shares the FFT plan and copies the buffers, which
/// gives each worker thread its own meter.
#[derive(Clone)]
pub struct SpecPowerMeter {
    len: usize,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    eq_mask: Vec<f32>,
    eq_enabled: bool,
}

impl SpecPowerMeter {
    /// Meter for signals of exactly `len` samples
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            len,
            fft,
            spectrum: vec![Complex::new(0.0, 0.0); len],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            eq_mask: vec![1.0; len],
            eq_enabled: false,
        }
    }

    /// Power of `signal` in `center ± bandwidth / 2`.
    ///
    /// Frequencies are normalized (1.0 = sample rate) and map to bins modulo
    /// the transform length. A band collapsing to one bin is widened to
    /// `[lo, lo + 1)`. Signals shorter than the meter are zero-padded, longer
    /// ones truncated.
    pub fn calc_power(&mut self, signal: &[f32], center: f32, bandwidth: f32) -> f32 {
        let lo = self.freq_to_bin(center - bandwidth / 2.0);
        let mut hi = self.freq_to_bin(center + bandwidth / 2.0);
        if lo == hi {
            hi = lo + 1;
        }

        for (i, bin) in self.spectrum.iter_mut().enumerate() {
            *bin = Complex::new(signal.get(i).copied().unwrap_or(0.0), 0.0);
        }

        self.fft.process_with_scratch(&mut self.spectrum, &mut self.scratch);

        self.bin_power(lo, hi)
    }

    /// Copy per-bin weights into the meter's mask. Extra weights are ignored;
    /// bins not covered keep their previous weight.
    pub fn set_equalizer(&mut self, mask: &[f32]) {
        let n = mask.len().min(self.len);
        self.eq_mask[..n].copy_from_slice(&mask[..n]);
    }

    pub fn enable_equalizer(&mut self) {
        self.eq_enabled = true;
    }

    /// Stop weighting bins. The stored mask is kept.
    pub fn disable_equalizer(&mut self) {
        self.eq_enabled = false;
    }

    /// Sum of squared magnitudes over bins `[lo, hi)`
    fn bin_power(&self, lo: usize, hi: usize) -> f32 {
        let hi = hi.min(self.len);
        if lo >= hi {
            return 0.0;
        }

        let bins = &self.spectrum[lo..hi];
        if self.eq_enabled {
            bins.iter()
                .zip(&self.eq_mask[lo..hi])
                .map(|(c, &g)| {
                    let re = c.re * g;
                    let im = c.im * g;
                    re * re + im * im
                })
                .sum()
        } else {
            bins.iter().map(|c| c.re * c.re + c.im * c.im).sum()
        }
    }

    fn freq_to_bin(&self, freq: f32) -> usize {
        if self.len == 0 {
            return 0;
        }
        let bin = (freq as f64 * self.len as f64).floor() as i64;
        bin.rem_euclid(self.len as i64) as usize
    }
}

impl std::fmt::Debug for SpecPowerMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecPowerMeter")
            .field("len", &self.len)
            .field("eq_enabled", &self.eq_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(len: usize, bin: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / len as f32).cos())
            .collect()
    }

    #[test]
    fn test_tone_lands_in_its_band() {
        let mut meter = SpecPowerMeter::new(256);
        let x = tone(256, 20);

        let in_band = meter.calc_power(&x, 20.5 / 256.0, 4.0 / 256.0);
        let out_band = meter.calc_power(&x, 0.4, 0.1);

        // cos at bin 20: |X[20]|^2 = (N/2)^2
        assert!((in_band - 128.0 * 128.0).abs() / (128.0 * 128.0) < 1e-3);
        assert!(out_band < 1e-3 * in_band);
    }

    #[test]
    fn test_collapsed_band_is_widened() {
        let mut meter = SpecPowerMeter::new(64);
        let x = tone(64, 5);

        // Zero bandwidth maps lo == hi == 5, widened to [5, 6)
        let p = meter.calc_power(&x, 5.0 / 64.0, 0.0);
        assert!((p - 32.0 * 32.0).abs() < 1.0);

        // Bin next to the tone is empty but still a valid one-bin band
        let p = meter.calc_power(&x, 7.0 / 64.0, 0.0);
        assert!(p < 1e-3);
    }

    #[test]
    fn test_collapsed_band_at_last_bin() {
        let mut meter = SpecPowerMeter::new(16);
        let x = vec![1.0f32; 16];
        let p = meter.calc_power(&x, 15.0 / 16.0, 0.0);
        assert!(p.is_finite());
    }

    #[test]
    fn test_unity_equalizer_matches_disabled() {
        let mut meter = SpecPowerMeter::new(128);
        let x: Vec<f32> = (0..128).map(|i| ((i * 37 % 17) as f32) - 8.0).collect();

        meter.disable_equalizer();
        let plain = meter.calc_power(&x, 0.25, 0.5);

        meter.set_equalizer(&vec![1.0; 128]);
        meter.enable_equalizer();
        let unity = meter.calc_power(&x, 0.25, 0.5);

        assert_eq!(plain, unity);
    }

    #[test]
    fn test_zero_equalizer_kills_power() {
        let mut meter = SpecPowerMeter::new(128);
        let x = tone(128, 10);

        meter.set_equalizer(&vec![0.0; 128]);
        meter.enable_equalizer();
        assert_eq!(meter.calc_power(&x, 0.25, 0.5), 0.0);
    }

    #[test]
    fn test_disable_keeps_mask() {
        let mut meter = SpecPowerMeter::new(128);
        let x = tone(128, 10);

        meter.set_equalizer(&vec![0.5; 128]);
        meter.enable_equalizer();
        let weighted = meter.calc_power(&x, 0.25, 0.5);

        meter.disable_equalizer();
        let plain = meter.calc_power(&x, 0.25, 0.5);
        assert!((weighted - 0.25 * plain).abs() < 1e-2 * plain);

        meter.enable_equalizer();
        assert_eq!(meter.calc_power(&x, 0.25, 0.5), weighted);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut meter = SpecPowerMeter::new(64);
        let mut other = meter.clone();
        other.set_equalizer(&vec![0.0; 64]);
        other.enable_equalizer();

        let x = tone(64, 3);
        assert!(meter.calc_power(&x, 0.1, 0.2) > 0.0);
        assert_eq!(other.calc_power(&x, 0.1, 0.2), 0.0);
    }
}
