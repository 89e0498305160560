//! Polyphase decimation and dither equalizer mask

/// Window `x` in place, then fold it into `taps` equal sub-blocks summed
/// sample-wise. Output length is `x.len() / taps`.
pub fn polyphase_fold(x: &mut [f32], window: &[f32], taps: usize) -> Vec<f32> {
    let taps = taps.max(1);
    let out_len = x.len() / taps;

    for (s, &w) in x.iter_mut().zip(window) {
        *s *= w;
    }

    let mut y = vec![0.0f32; out_len];
    if out_len == 0 {
        return y;
    }

    for block in x.chunks_exact(out_len).take(taps) {
        super::stats::accumulate(&mut y, block);
    }

    y
}

/// Per-bin weights that flatten typical dither noise shaping.
///
/// Unity below `f1`, a linear ramp down to `10^(-atten_db/20)` at `f2`,
/// flat above. Frequencies are normalized to the sample rate; the upper half
/// of the mask mirrors the lower half.
pub fn equalizer_mask(len: usize, f1: f32, f2: f32, atten_db: f32) -> Vec<f32> {
    let mut mask = vec![1.0f32; len];
    let floor = 10.0f32.powf(-atten_db / 20.0);
    let slope = (floor - 1.0) / (f2 - f1);

    for n in 0..len / 2 {
        let f = n as f32 / len as f32;
        let gain = if f < f1 {
            1.0
        } else if f < f2 {
            slope * (f - f1) + 1.0
        } else {
            floor
        };
        mask[n] = gain;
        mask[len - n - 1] = gain;
    }

    mask
}
