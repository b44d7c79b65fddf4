//! Composite Gauss–Legendre quadrature.
//!
//! The node/weight table is process-wide immutable state, computed on first
//! use behind a [`OnceLock`] so concurrent first callers cannot race.

use std::f64::consts::PI;
use std::ops::{Add, Mul};
use std::sync::OnceLock;

/// Points per panel.
pub const ORDER: usize = 20;

/// Gauss–Legendre nodes and weights on `[-1, 1]`.
#[derive(Debug)]
pub struct GaussLegendre {
    nodes: [f64; ORDER],
    weights: [f64; ORDER],
}

impl GaussLegendre {
    /// Shared rule, built once per process.
    pub fn get() -> &'static GaussLegendre {
        static RULE: OnceLock<GaussLegendre> = OnceLock::new();
        RULE.get_or_init(GaussLegendre::compute)
    }

    /// Roots of `P_n` by Newton iteration from Chebyshev-like starting points,
    /// weights `2 / ((1 − x²) P_n'(x)²)`.
    ///
    /// Reference: Press et al. (2007), *Numerical Recipes*, §4.6 (`gauleg`).
    fn compute() -> Self {
        let n = ORDER;
        let mut nodes = [0.0; ORDER];
        let mut weights = [0.0; ORDER];
        for i in 0..n.div_ceil(2) {
            let mut z = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut pp = 0.0;
            for _ in 0..100 {
                let mut p1 = 1.0;
                let mut p2 = 0.0;
                for j in 0..n {
                    let p3 = p2;
                    p2 = p1;
                    p1 = ((2.0 * j as f64 + 1.0) * z * p2 - j as f64 * p3) / (j as f64 + 1.0);
                }
                pp = n as f64 * (z * p1 - p2) / (z * z - 1.0);
                let z_old = z;
                z = z_old - p1 / pp;
                if (z - z_old).abs() < 1e-15 {
                    break;
                }
            }
            let w = 2.0 / ((1.0 - z * z) * pp * pp);
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }
        Self { nodes, weights }
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Integrates `f` over `[a, b]` split into `panels` equal panels.
    ///
    /// # Examples
    /// ```
    /// use u_probdist::quadrature::GaussLegendre;
    /// let rule = GaussLegendre::get();
    /// let v: f64 = rule.integrate(|x: f64| x.exp(), 0.0, 1.0, 1);
    /// assert!((v - (1f64.exp() - 1.0)).abs() < 1e-14);
    /// ```
    pub fn integrate<T, F>(&self, mut f: F, a: f64, b: f64, panels: usize) -> T
    where
        T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>,
        F: FnMut(f64) -> T,
    {
        let panels = panels.max(1);
        let width = (b - a) / panels as f64;
        let mut total = T::default();
        for k in 0..panels {
            let lo = a + k as f64 * width;
            let half = 0.5 * width;
            let mid = lo + half;
            let mut panel = T::default();
            for (&x, &w) in self.nodes.iter().zip(&self.weights) {
                panel = panel + f(mid + half * x) * w;
            }
            total = total + panel * half;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_weights_sum_to_two() {
        let rule = GaussLegendre::get();
        let s: f64 = rule.weights().iter().sum();
        assert!((s - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_nodes_sorted_and_symmetric() {
        let rule = GaussLegendre::get();
        let nodes = rule.nodes();
        for w in nodes.windows(2) {
            assert!(w[0] < w[1]);
        }
        for i in 0..ORDER {
            assert!((nodes[i] + nodes[ORDER - 1 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_exact_for_high_degree_polynomials() {
        // An n-point rule integrates degree 2n − 1 exactly.
        let rule = GaussLegendre::get();
        let deg = 2 * ORDER as i32 - 2;
        let v: f64 = rule.integrate(|x: f64| x.powi(deg), -1.0, 1.0, 1);
        assert!((v - 2.0 / (deg as f64 + 1.0)).abs() < 1e-14);
    }

    #[test]
    fn test_complex_oscillatory_integral() {
        // ∫₀¹ e^{itx} dx = (e^{it} − 1)/(it)
        let rule = GaussLegendre::get();
        let t = 40.0;
        let got: Complex64 = rule.integrate(|x| Complex64::new(0.0, t * x).exp(), 0.0, 1.0, 16);
        let expected = (Complex64::new(0.0, t).exp() - 1.0) / Complex64::new(0.0, t);
        assert!((got - expected).norm() < 1e-13);
    }

    #[test]
    fn test_shared_rule_is_single_instance() {
        let a = GaussLegendre::get() as *const GaussLegendre;
        let b = std::thread::spawn(|| GaussLegendre::get() as *const GaussLegendre as usize)
            .join()
            .unwrap();
        assert_eq!(a as usize, b);
    }
}
