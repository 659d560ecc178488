/// `amplitude * sin(phase_rate * t) + offset`, swinging between `low` and `high`.
pub fn sinusoid(t: i64, low: f64, high: f64, phase_rate: f64) -> f64 {
    let amplitude = (high - low) / 2.0;
    let offset = (high + low) / 2.0;
    amplitude * (phase_rate * t as f64).sin() + offset
}

/// `before` until time index `at`, `after` from then on.
pub fn step(t: i64, before: f64, after: f64, at: i64) -> f64 {
    if t < at {
        before
    } else {
        after
    }
}
