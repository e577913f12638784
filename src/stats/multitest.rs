//! Joint p-value correction across a family of tests.
//!
//! Adjusted p-values are returned in input order, clipped to `[0, 1]`.
//! Non-finite p-values are left as they are and do not count toward the
//! family size.

use crate::config::CorrectionMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub adjusted: Vec<f64>,
    /// `adjusted <= alpha`; always `false` for non-finite inputs.
    pub rejected: Vec<bool>,
}

pub fn correct(method: CorrectionMethod, p_values: &[f64], alpha: f64) -> Correction {
    let pairs: Vec<(usize, f64)> = p_values.iter().copied().enumerate().collect();
    let mut adjusted = p_values.to_vec();
    for (idx, q) in adjusted_pairs(method, &pairs) {
        adjusted[idx] = q;
    }
    let rejected = adjusted.iter().map(|q| q.is_finite() && *q <= alpha).collect();
    Correction { adjusted, rejected }
}

/// `(key, p)` pairs in, `(key, adjusted)` pairs out, sorted by raw p-value.
pub fn adjusted_pairs(method: CorrectionMethod, pairs: &[(usize, f64)]) -> Vec<(usize, f64)> {
    let mut sorted: Vec<(usize, f64)> = pairs
        .iter()
        .copied()
        .filter(|(_, p)| p.is_finite())
        .map(|(key, p)| (key, p.max(0.0).min(1.0)))
        .collect();
    if sorted.is_empty() {
        return Vec::new();
    }

    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    let m = sorted.len() as f64;

    let mut q: Vec<(usize, f64)> = sorted
        .iter()
        .copied()
        .enumerate()
        .map(|(idx, (key, p))| {
            let rank = (idx + 1) as f64;
            let remaining = m - idx as f64;
            let raw = match method {
                CorrectionMethod::Bonferroni => p * m,
                CorrectionMethod::Sidak => one_minus_pow_complement(p, m),
                CorrectionMethod::Holm | CorrectionMethod::SimesHochberg => p * remaining,
                CorrectionMethod::HolmSidak => one_minus_pow_complement(p, remaining),
                CorrectionMethod::FdrBh => p * m / rank,
                CorrectionMethod::FdrBy => p * m * harmonic(sorted.len()) / rank,
            };
            (key, raw.max(0.0).min(1.0))
        })
        .collect();

    match method {
        CorrectionMethod::Bonferroni | CorrectionMethod::Sidak => {}
        // Step-down: q_i = max(q_i, q_{i-1}) from the start.
        CorrectionMethod::Holm | CorrectionMethod::HolmSidak => {
            for idx in 1..q.len() {
                let prev = q[idx - 1].1;
                if q[idx].1 < prev {
                    q[idx].1 = prev;
                }
            }
        }
        // Step-up: q_i = min(q_i, q_{i+1}) from the end.
        CorrectionMethod::SimesHochberg | CorrectionMethod::FdrBh | CorrectionMethod::FdrBy => {
            for idx in (0..q.len().saturating_sub(1)).rev() {
                let next = q[idx + 1].1;
                if q[idx].1 > next {
                    q[idx].1 = next;
                }
            }
        }
    }

    q
}

/// `1 - (1 - p)^k`, computed without cancellation for small `p`.
fn one_minus_pow_complement(p: f64, k: f64) -> f64 {
    -(k * (-p).ln_1p()).exp_m1()
}

fn harmonic(m: usize) -> f64 {
    (1..=m).map(|k| 1.0 / (k as f64)).sum()
}
