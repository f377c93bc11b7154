//! Derivative-free minimization for conditional-least-squares fitting.
//!
//! SARIMA coefficient estimation minimizes a residual sum of squares that is
//! cheap to evaluate but has no useful analytic gradient, so a bounded
//! Nelder-Mead simplex does the work. The iteration cap doubles as the
//! per-candidate cost bound during grid search: a non-converging order spends
//! at most `max_iter` evaluations and then reports the best vertex found.

/// Configuration for the simplex minimizer.
#[derive(Debug, Clone)]
pub struct MinimizeConfig {
    /// Hard cap on iterations; also the per-candidate cost bound.
    pub max_iter: usize,
    /// Convergence tolerance on the objective spread across the simplex.
    pub tolerance: f64,
    /// Relative step used to seed the initial simplex.
    pub initial_step: f64,
}

impl Default for MinimizeConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at the best point.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed below tolerance.
    pub converged: bool,
}

/// Minimize `objective` starting from `initial`, clamping every trial point
/// into `bounds`.
///
/// Standard Nelder-Mead coefficients (reflection 1, expansion 2, contraction
/// 0.5, shrink 0.5). Bounds are enforced by clamping rather than rejection so
/// the search never stalls on the feasible-region boundary.
pub fn minimize<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &MinimizeConfig,
) -> MinimizeResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return MinimizeResult {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }
    debug_assert_eq!(bounds.len(), n);

    let clamp = |p: &mut Vec<f64>| {
        for (x, &(lo, hi)) in p.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    };

    // Seed simplex: initial point plus one perturbed vertex per dimension.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        clamp(&mut vertex);
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        // Order vertices best-to-worst.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let (best, second_worst, worst) = (order[0], order[n - 1], order[n]);

        if values[worst] - values[best] < config.tolerance {
            converged = true;
            break;
        }

        // Centroid of all vertices except the worst.
        let mut centroid = vec![0.0; n];
        for (i, vertex) in simplex.iter().enumerate() {
            if i != worst {
                for (c, x) in centroid.iter_mut().zip(vertex) {
                    *c += x;
                }
            }
        }
        for c in &mut centroid {
            *c /= n as f64;
        }

        let blend = |towards: &[f64], coeff: f64| -> Vec<f64> {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(towards)
                .map(|(c, x)| c + coeff * (x - c))
                .collect();
            clamp(&mut p);
            p
        };

        // Reflection.
        let reflected = blend(&simplex[worst], -1.0);
        let f_reflected = objective(&reflected);

        if f_reflected < values[best] {
            // Expansion.
            let expanded = blend(&simplex[worst], -2.0);
            let f_expanded = objective(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        // Contraction, toward the better of (worst, reflected).
        let contracted = if f_reflected < values[worst] {
            blend(&reflected, 0.5)
        } else {
            blend(&simplex[worst], 0.5)
        };
        let f_contracted = objective(&contracted);
        if f_contracted < values[worst].min(f_reflected) {
            simplex[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // Shrink everything toward the best vertex.
        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i != best {
                for (x, a) in simplex[i].iter_mut().zip(&anchor) {
                    *x = a + 0.5 * (*x - a);
                }
                clamp(&mut simplex[i]);
                values[i] = objective(&simplex[i]);
            }
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    MinimizeResult {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}
