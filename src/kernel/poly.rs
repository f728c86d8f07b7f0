//! Polynomial kernel implementation

use crate::kernel::traits::dot;
use crate::kernel::Kernel;

/// Polynomial kernel: K(x, y) = (γ * x^T * y + coef0)^degree
#[derive(Debug, Clone, Copy)]
pub struct PolyKernel {
    gamma: f64,
    degree: u32,
    coef0: f64,
}

impl PolyKernel {
    /// Create a new polynomial kernel
    ///
    /// # Panics
    /// Panics if gamma is not positive or degree is zero
    pub fn new(gamma: f64, degree: u32, coef0: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        assert!(degree > 0, "Degree must be at least 1");
        Self {
            gamma,
            degree,
            coef0,
        }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn coef0(&self) -> f64 {
        self.coef0
    }
}

impl Kernel for PolyKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (self.gamma * dot(x, y) + self.coef0).powi(self.degree as i32)
    }

    fn name(&self) -> &'static str {
        "poly"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_poly_degree_one_matches_scaled_linear() {
        let kernel = PolyKernel::new(2.0, 1, 0.0);
        // 2 * (1*3 + 2*4) = 22
        assert_relative_eq!(kernel.compute(&[1.0, 2.0], &[3.0, 4.0]), 22.0);
    }

    #[test]
    fn test_poly_known_value() {
        let kernel = PolyKernel::new(1.0, 2, 1.0);
        // (1*2 + 1)^2 = 9
        assert_relative_eq!(kernel.compute(&[1.0], &[2.0]), 9.0);
    }

    #[test]
    fn test_poly_coef0_shift() {
        let with_shift = PolyKernel::new(1.0, 3, 1.0);
        let without = PolyKernel::new(1.0, 3, 0.0);
        let x = [0.5, 0.5];
        assert!(with_shift.compute(&x, &x) > without.compute(&x, &x));
    }

    #[test]
    #[should_panic(expected = "Degree must be at least 1")]
    fn test_poly_rejects_zero_degree() {
        PolyKernel::new(1.0, 0, 0.0);
    }
}
