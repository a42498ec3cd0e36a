use serde::Serialize;
use crate::Float;

/// Lagrangian terms at one iterate:
/// `f = lam1 + beta/2*lam2 + mu/2*lam3 - lam4 - lam5`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Terms {
    /// TV norm of the shrinkage variables.
    pub lam1: Float,
    /// `‖DTU - W‖²`
    pub lam2: Float,
    /// `‖AU - b‖²`
    pub lam3: Float,
    /// `Re⟨sigma, DTU - W⟩`
    pub lam4: Float,
    /// `Re⟨delta, AU - b⟩`
    pub lam5: Float,
    pub f: Float
}

impl Terms {
    pub fn objective(lam1: Float, lam2: Float, lam3: Float, lam4: Float, lam5: Float, beta: Float, mu: Float) -> Float {
        lam1 + beta/2.0*lam2 + mu/2.0*lam3 - lam4 - lam5
    }

    pub fn recompute(&mut self, beta: Float, mu: Float) -> () {
        self.f = Terms::objective(self.lam1, self.lam2, self.lam3, self.lam4, self.lam5, beta, mu);
    }
}

/// History of one solve. Per-iteration series grow by one entry per inner
/// iteration (plus an initial entry for `f`, `c` and the `lam*` series);
/// per-cycle series by one entry per completed outer cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub f: Vec<Float>,
    /// Non-monotone reference cost.
    pub c: Vec<Float>,
    pub lam1: Vec<Float>,
    pub lam2: Vec<Float>,
    pub lam3: Vec<Float>,
    pub lam4: Vec<Float>,
    pub lam5: Vec<Float>,
    /// Inner stopping metric.
    pub res: Vec<Float>,
    /// Step lengths.
    pub tau: Vec<Float>,
    /// Accepted line search fraction, 0 when back-tracking gave up.
    pub alpha: Vec<Float>,
    /// Back-tracking counts.
    pub cnt: Vec<usize>,
    /// Relative error against the ground truth, when one was given.
    pub n2re: Vec<Float>,

    pub mus: Vec<Float>,
    pub betas: Vec<Float>,
    /// Outer stopping metric.
    pub reer: Vec<Float>,
    /// `f + lam4 + lam5` at the end of each cycle.
    pub obj: Vec<Float>,
    /// Inner iterations per cycle.
    pub itrs: Vec<usize>,

    pub mu_final: Float,
    pub beta_final: Float,
    /// Whether `A` was normalised; false when disabled, near-orthonormal or already below one.
    pub operator_scaled: bool,
    /// Factor `A` was divided by, 1 when unscaled.
    pub operator_scale: Float,
    /// Factor `b` was multiplied by.
    pub measurement_scale: Float,
    /// Total inner iterations.
    pub itr: usize,
    pub converged: bool
}

impl Diagnostics {
    pub fn record_terms(&mut self, terms: &Terms) -> () {
        self.f.push(terms.f);
        self.lam1.push(terms.lam1);
        self.lam2.push(terms.lam2);
        self.lam3.push(terms.lam3);
        self.lam4.push(terms.lam4);
        self.lam5.push(terms.lam5);
    }

    pub fn record_penalties(&mut self, beta: Float, mu: Float) -> () {
        self.betas.push(beta);
        self.mus.push(mu);
    }

    pub fn outer_cycles(&self) -> usize {
        self.itrs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_combines_terms() {
        let mut terms = Terms { lam1: 1.0, lam2: 2.0, lam3: 4.0, lam4: 0.5, lam5: 0.25, f: 0.0 };
        terms.recompute(2.0, 0.5);
        assert_eq!(terms.f, 1.0 + 2.0 + 1.0 - 0.5 - 0.25);

        let mut diagnostics = Diagnostics::default();
        diagnostics.record_terms(&terms);
        assert_eq!(diagnostics.f, vec![terms.f]);
        assert_eq!(diagnostics.lam3, vec![4.0]);
    }
}
