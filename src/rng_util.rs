/// Draw an index from a categorical distribution by inverse transform.
///
/// Weights need not be normalized. Returns `None` for an empty slice, a
/// negative or non-finite weight, or a zero total.
pub(crate) fn categorical(rng: &mut fastrand::Rng, probs: &[f64]) -> Option<usize> {
    if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return None;
    }
    let total: f64 = probs.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    let threshold = rng.f64() * total;

    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if threshold < cumulative {
            return Some(i);
        }
    }

    // Rounding can leave `cumulative` a hair below `total`.
    probs.iter().rposition(|&p| p > 0.0)
}
