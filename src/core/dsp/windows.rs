//! Polyphase prototype window

use std::f32::consts::PI;

/// Two-lobe sinc tapered by a Hann window. Symmetric, with `size - 1` as
/// the period.
pub fn sinc_hann(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }

    let m = (size - 1) as f32;
    (0..size)
        .map(|i| {
            let n = i as f32;
            let hann = 0.5 * (1.0 - (2.0 * PI * n / m).cos());
            // x sweeps [-2pi, 2pi] across the window
            let x = (4.0 * PI / m) * n - 2.0 * PI;
            let sinc = if x.abs() < 1e-6 { 1.0 } else { x.sin() / x };
            sinc * hann
        })
        .collect()
}
