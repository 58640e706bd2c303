/// Shannon entropy of an unnormalized weight distribution
///
/// Computes `ln(ΣW) - Σ(w·ln w) / ΣW`, which equals the entropy of the normalized
/// distribution without normalizing first. Zero and negative weights carry no mass and are
/// skipped.
///
/// Returns `None` when the distribution has no positive mass, where the formula would take the
/// logarithm of zero and divide by zero.
pub fn shannon_entropy<I>(weights: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut sum_weighted_logs = 0.0;

    for weight in weights {
        if weight > 0.0 {
            sum += weight;
            sum_weighted_logs += weight * weight.ln();
        }
    }

    if sum > 0.0 && sum.is_finite() {
        Some(sum.ln() - sum_weighted_logs / sum)
    } else {
        None
    }
}

