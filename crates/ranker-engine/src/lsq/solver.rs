// Box-constrained linear least squares.
//
// Minimizes ||A x - b||^2 subject to lower <= x_i <= upper by projected cyclic
// coordinate descent on the normal equations. The rating systems solved here
// are translation invariant (every row sums to zero), so the minimizer is not
// unique; starting every solve from the box midpoint keeps results
// reproducible.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, Copy)]
pub struct BoundedLeastSquares {
    pub lower: f64,
    pub upper: f64,
    /// Converged once no coordinate moves more than this in a sweep.
    pub tolerance: f64,
    pub max_sweeps: usize,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub x: DVector<f64>,
    pub sweeps: usize,
    pub converged: bool,
    /// Largest coordinate change in the final sweep.
    pub last_step: f64,
}

impl BoundedLeastSquares {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            tolerance: 1e-9,
            max_sweeps: 5_000,
        }
    }

    pub fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Solution {
        let gram = a.transpose() * a;
        let target = a.transpose() * b;
        let n = gram.nrows();

        let mid = 0.5 * (self.lower + self.upper);
        let mut x = DVector::from_element(n, mid);
        let mut last_step = 0.0_f64;

        for sweep in 1..=self.max_sweeps {
            last_step = 0.0;
            for k in 0..n {
                let diag = gram[(k, k)];
                if diag <= 0.0 {
                    continue;
                }
                // Gram matrix is symmetric, so column k doubles as row k.
                let grad = gram.column(k).dot(&x) - target[k];
                let next = (x[k] - grad / diag).clamp(self.lower, self.upper);
                last_step = last_step.max((next - x[k]).abs());
                x[k] = next;
            }
            if last_step < self.tolerance {
                return Solution {
                    x,
                    sweeps: sweep,
                    converged: true,
                    last_step,
                };
            }
        }

        Solution {
            x,
            sweeps: self.max_sweeps,
            converged: false,
            last_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_optimum_inside_box() {
        // Single difference equation x0 - x1 = 10, symmetric around the midpoint.
        let a = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);
        let b = DVector::from_vec(vec![10.0]);
        let sol = BoundedLeastSquares::new(30.0, 130.0).solve(&a, &b);
        assert!(sol.converged);
        assert!((sol.x[0] - sol.x[1] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn solution_is_clamped_to_bounds() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![500.0, -20.0]);
        let sol = BoundedLeastSquares::new(30.0, 130.0).solve(&a, &b);
        assert!(sol.converged);
        assert_eq!(sol.x[0], 130.0);
        assert_eq!(sol.x[1], 30.0);
    }

    #[test]
    fn reports_non_convergence_when_out_of_sweeps() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, -1.0, 1.0, -0.9]);
        let b = DVector::from_vec(vec![10.0, 5.0]);
        let solver = BoundedLeastSquares {
            max_sweeps: 1,
            ..BoundedLeastSquares::new(30.0, 130.0)
        };
        let sol = solver.solve(&a, &b);
        assert!(!sol.converged);
        assert_eq!(sol.sweeps, 1);
    }

    #[test]
    fn zero_columns_stay_at_midpoint() {
        let a = DMatrix::from_row_slice(1, 3, &[1.0, -1.0, 0.0]);
        let b = DVector::from_vec(vec![4.0]);
        let sol = BoundedLeastSquares::new(30.0, 130.0).solve(&a, &b);
        assert_eq!(sol.x[2], 80.0);
    }
}
