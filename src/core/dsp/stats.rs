//! Vector statistics used by the classifier

/// Arithmetic mean
pub fn mean(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().sum::<f32>() / samples.len() as f32
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Sample-wise `acc += other` over the common length
pub fn accumulate(acc: &mut [f32], other: &[f32]) {
    for (a, &b) in acc.iter_mut().zip(other) {
        *a += b;
    }
}

/// Index and value of the first maximum.
///
/// Starts from `NEG_INFINITY` at index 0 and only moves on a strictly
/// greater value, so NaN entries never win and ties keep the earliest index.
pub fn arg_max(values: &[f32]) -> (usize, f32) {
    let mut best = (0, f32::NEG_INFINITY);

    for (i, &v) in values.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }

    best
}
