//! Nelder-Mead simplex minimization
//!
//! Used by the filter designers for band-stop edge search and for solving
//! the elliptic degree equation. The search returns the best parameter
//! vector found; it does not guarantee a global optimum, which the design
//! callers accept.

use crate::error::{DspError, Result};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Convergence threshold on the spread of simplex function values.
const TOLERANCE: f64 = 1e-12;

/// Weight of the quadratic penalty applied outside the constraint box.
const PENALTY: f64 = 1e10;

/// Minimizes `function` starting from `start`, allowing at most `nmax`
/// simplex iterations. An `nmax` of 1 or less removes the iteration cap and
/// the search runs until the simplex collapses to machine precision.
pub fn minimize_function<F>(mut function: F, start: &[f64], nmax: usize) -> Vec<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    nelder_mead(&mut function, start, nmax)
}

/// Minimizes `function` with each parameter box-constrained to
/// `[lower[i], upper[i]]`. The search starts from the box midpoint and
/// constraint violations are discouraged with a quadratic penalty.
pub fn minimize_function_constrained<F>(
    mut function: F,
    lower: &[f64],
    upper: &[f64],
    nmax: usize,
) -> Result<Vec<f64>>
where
    F: FnMut(&[f64]) -> f64,
{
    if lower.len() != upper.len() {
        return Err(DspError::InvalidArgument(
            "lower and upper bound arrays must have equal sizes".into(),
        ));
    }
    if lower.iter().zip(upper).any(|(l, u)| l > u) {
        return Err(DspError::InvalidArgument(
            "each lower bound must not exceed its upper bound".into(),
        ));
    }

    let start: Vec<f64> = lower
        .iter()
        .zip(upper)
        .map(|(l, u)| (l + u) / 2.0)
        .collect();

    let mut penalized = |params: &[f64]| {
        let mut penalty = 0.0;
        for ((&p, &l), &u) in params.iter().zip(lower).zip(upper) {
            if p < l {
                penalty += PENALTY * (l - p) * (l - p);
            } else if p > u {
                penalty += PENALTY * (p - u) * (p - u);
            }
        }
        function(params) + penalty
    };

    Ok(nelder_mead(&mut penalized, &start, nmax))
}

fn nelder_mead<F>(function: &mut F, start: &[f64], nmax: usize) -> Vec<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    let n = start.len();
    if n == 0 {
        return Vec::new();
    }

    // Initial simplex: the start point plus one vertex per dimension,
    // offset along each axis.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.to_vec());
    for i in 0..n {
        let mut vertex = start.to_vec();
        let step = if vertex[i].abs() > 1e-12 {
            0.1 * vertex[i].abs()
        } else {
            0.1
        };
        vertex[i] += step;
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| function(v)).collect();

    let mut iterations = 0usize;
    loop {
        // Order vertices by function value
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let spread = (values[worst] - values[best]).abs();
        let scale = values[best].abs().max(values[worst].abs()).max(1.0);
        if spread <= TOLERANCE * scale {
            return simplex[best].clone();
        }
        if nmax > 1 && iterations >= nmax {
            return simplex[best].clone();
        }
        iterations += 1;

        // Centroid of all vertices except the worst
        let mut centroid = vec![0.0; n];
        for (idx, vertex) in simplex.iter().enumerate() {
            if idx == worst {
                continue;
            }
            for (c, &x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        for c in centroid.iter_mut() {
            *c /= n as f64;
        }

        let reflected = combine(&centroid, &simplex[worst], 1.0 + REFLECTION, -REFLECTION);
        let reflected_value = function(&reflected);

        if reflected_value < values[best] {
            let expanded = combine(&centroid, &simplex[worst], 1.0 + EXPANSION, -EXPANSION);
            let expanded_value = function(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
        } else if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
        } else {
            let contracted = combine(&centroid, &simplex[worst], 1.0 - CONTRACTION, CONTRACTION);
            let contracted_value = function(&contracted);
            if contracted_value < values[worst] {
                simplex[worst] = contracted;
                values[worst] = contracted_value;
            } else {
                // Shrink every vertex toward the best one
                let best_vertex = simplex[best].clone();
                for (idx, vertex) in simplex.iter_mut().enumerate() {
                    if idx == best {
                        continue;
                    }
                    for (x, &b) in vertex.iter_mut().zip(&best_vertex) {
                        *x = b + SHRINK * (*x - b);
                    }
                    values[idx] = function(vertex);
                }
            }
        }
    }
}

fn combine(centroid: &[f64], vertex: &[f64], centroid_weight: f64, vertex_weight: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(vertex)
        .map(|(&c, &v)| centroid_weight * c + vertex_weight * v)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimize_quadratic() {
        let result = minimize_function(|x| (x[0] - 3.0) * (x[0] - 3.0), &[0.0], 0);
        assert!((result[0] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_minimize_two_dimensional() {
        let result = minimize_function(
            |x| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2) + 5.0,
            &[10.0, 10.0],
            0,
        );
        assert!((result[0] - 1.0).abs() < 1e-4);
        assert!((result[1] + 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_minimize_respects_iteration_cap() {
        let mut evaluations = 0usize;
        let _ = minimize_function(
            |x| {
                evaluations += 1;
                x[0] * x[0]
            },
            &[100.0],
            5,
        );
        // 5 iterations cannot evaluate more than a few dozen times
        assert!(evaluations < 50);
    }

    #[test]
    fn test_constrained_minimum_on_boundary() {
        // x^2 over [1, 2] is minimized at the lower boundary
        let result = minimize_function_constrained(|x| x[0] * x[0], &[1.0], &[2.0], 0).unwrap();
        assert!((result[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_constrained_interior_minimum() {
        let result =
            minimize_function_constrained(|x| (x[0] - 0.3).powi(2), &[0.0], &[1.0], 0).unwrap();
        assert!((result[0] - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_constrained_rejects_mismatched_bounds() {
        assert!(minimize_function_constrained(|x| x[0], &[0.0, 1.0], &[1.0], 0).is_err());
    }
}
