//! Vector normalisation helpers.

/// L2 norm, floored so callers can always divide by it.
pub fn l2_norm(v: &[f32]) -> f32 {
    let s: f32 = v.iter().map(|x| x * x).sum();
    s.sqrt().max(1e-10)
}

/// Scale `v` to unit length in place. Zero vectors stay zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    for x in v.iter_mut() {
        *x /= norm;
    }
}
