extern crate nalgebra as na;

use na::DVector;
use crate::{Float, GenericScalar};
use crate::image::{Shape, TvOperators};
use crate::numerics::{guard, real_dot};
use crate::numerics::shrinkage::{shrink_fields, tv_norm, TvNorm};
use crate::operator::LinearOperator;
use super::diagnostics::Terms;

/// Quantities derived from the primal variable `u`.
#[derive(Debug, Clone)]
pub struct Iterate<T: GenericScalar> {
    pub u: DVector<T>,
    /// `D(T(u))`
    pub ux: DVector<T>,
    pub uy: DVector<T>,
    /// `A u`
    pub au: DVector<T>,
    /// `A'(Au) - A'b`
    pub g: DVector<T>,
    /// `Tt(Dt(DTu - W))`
    pub g2: DVector<T>
}

/// Full-step change of every cached quantity, used to interpolate back-tracked points.
#[derive(Debug, Clone)]
pub struct Increment<T: GenericScalar> {
    du: DVector<T>,
    dux: DVector<T>,
    duy: DVector<T>,
    dau: DVector<T>,
    dg: DVector<T>,
    dg2: DVector<T>
}

impl<T: GenericScalar> Increment<T> {
    pub fn between(from: &Iterate<T>, to: &Iterate<T>) -> Increment<T> {
        Increment {
            du: &to.u - &from.u,
            dux: &to.ux - &from.ux,
            duy: &to.uy - &from.uy,
            dau: &to.au - &from.au,
            dg: &to.g - &from.g,
            dg2: &to.g2 - &from.g2
        }
    }
}

#[derive(Debug, Clone)]
pub struct Shrinkage<T: GenericScalar> {
    pub wx: DVector<T>,
    pub wy: DVector<T>
}

/// Multipliers of the TV constraint (`sigmax`, `sigmay`) and the data constraint (`delta`).
#[derive(Debug, Clone)]
pub struct Multipliers<T: GenericScalar> {
    pub sigmax: DVector<T>,
    pub sigmay: DVector<T>,
    pub delta: DVector<T>
}

impl<T: GenericScalar> Multipliers<T> {
    pub fn zeros(n: usize, m: usize) -> Multipliers<T> {
        Multipliers {
            sigmax: DVector::<T>::zeros(n),
            sigmay: DVector::<T>::zeros(n),
            delta: DVector::<T>::zeros(m)
        }
    }
}

/// Everything that stays fixed during one solve.
pub struct Problem<'a, T: GenericScalar> {
    pub operator: &'a dyn LinearOperator<T>,
    pub operators: &'a TvOperators<T>,
    pub b: DVector<T>,
    pub atb: DVector<T>,
    pub shape: Shape,
    pub tv_norm: TvNorm
}

impl<'a, T: GenericScalar> Problem<'a, T> {
    pub fn new(operator: &'a dyn LinearOperator<T>, operators: &'a TvOperators<T>, b: DVector<T>, shape: Shape, tv_norm: TvNorm) -> Problem<'a, T> {
        let atb = operator.adjoint(&b);
        Problem { operator, operators, b, atb, shape, tv_norm }
    }

    pub fn transform(&self, u: &DVector<T>) -> (DVector<T>, DVector<T>) {
        self.operators.forward(u, &self.shape)
    }

    /// Shrinkage of `DTu - sigma/beta` with threshold `1/beta`.
    pub fn shrink(&self, ux: &DVector<T>, uy: &DVector<T>, multipliers: &Multipliers<T>, beta: Float) -> Shrinkage<T> {
        let inv_beta = T::from_real(1.0/beta);
        let uxbar = ux - &multipliers.sigmax*inv_beta;
        let uybar = uy - &multipliers.sigmay*inv_beta;
        let (wx, wy) = shrink_fields(&uxbar, &uybar, 1.0/beta, self.tv_norm);
        Shrinkage { wx, wy }
    }

    pub fn tv_norm(&self, w: &Shrinkage<T>) -> Float {
        tv_norm(&w.wx, &w.wy, self.tv_norm)
    }

    /// Objective terms and gradients at `u`, given `D(T(u))` and the current shrinkage.
    pub fn evaluate(&self, u: DVector<T>, ux: DVector<T>, uy: DVector<T>, w: &Shrinkage<T>, lam1: Float, multipliers: &Multipliers<T>, beta: Float, mu: Float) -> (Iterate<T>, Terms) {
        let au = self.operator.forward(&u);
        let g = self.operator.adjoint(&au) - &self.atb;

        let vx = &ux - &w.wx;
        let vy = &uy - &w.wy;
        let g2 = self.operators.adjoint(&vx, &vy, &self.shape);
        let aub = &au - &self.b;
        let terms = self.terms(&vx, &vy, &aub, lam1, multipliers, beta, mu);

        (Iterate { u, ux, uy, au, g, g2 }, terms)
    }

    /// Point `from + alpha*increment`; every cached quantity is linear in `u`
    /// so no operator is applied.
    pub fn interpolate(&self, from: &Iterate<T>, increment: &Increment<T>, alpha: Float, w: &Shrinkage<T>, lam1: Float, multipliers: &Multipliers<T>, beta: Float, mu: Float) -> (Iterate<T>, Terms) {
        let a = T::from_real(alpha);
        let iterate = Iterate {
            u: &from.u + &increment.du*a,
            ux: &from.ux + &increment.dux*a,
            uy: &from.uy + &increment.duy*a,
            au: &from.au + &increment.dau*a,
            g: &from.g + &increment.dg*a,
            g2: &from.g2 + &increment.dg2*a
        };

        let vx = &iterate.ux - &w.wx;
        let vy = &iterate.uy - &w.wy;
        let aub = &iterate.au - &self.b;
        let terms = self.terms(&vx, &vy, &aub, lam1, multipliers, beta, mu);
        (iterate, terms)
    }

    /// Refreshes the terms that depend on `W` after a new shrinkage.
    pub fn refresh_shrinkage(&self, iterate: &mut Iterate<T>, w: &Shrinkage<T>, multipliers: &Multipliers<T>, terms: &mut Terms, beta: Float) -> () {
        let rest = terms.f - terms.lam1 - beta/2.0*terms.lam2 + terms.lam4;
        terms.lam1 = self.tv_norm(w);
        let vx = &iterate.ux - &w.wx;
        let vy = &iterate.uy - &w.wy;
        iterate.g2 = self.operators.adjoint(&vx, &vy, &self.shape);
        terms.lam2 = vx.norm_squared() + vy.norm_squared();
        terms.lam4 = real_dot(&multipliers.sigmax, &vx) + real_dot(&multipliers.sigmay, &vy);
        terms.f = rest + terms.lam1 + beta/2.0*terms.lam2 - terms.lam4;
    }

    /// Gradient ascent on the multipliers; refreshes `lam4` and `lam5`.
    pub fn update_multipliers(&self, iterate: &Iterate<T>, w: &Shrinkage<T>, multipliers: &mut Multipliers<T>, terms: &mut Terms, beta: Float, mu: Float) -> () {
        let vx = &iterate.ux - &w.wx;
        let vy = &iterate.uy - &w.wy;
        let aub = &iterate.au - &self.b;
        multipliers.sigmax -= &vx*T::from_real(beta);
        multipliers.sigmay -= &vy*T::from_real(beta);
        multipliers.delta -= &aub*T::from_real(mu);

        terms.lam4 = real_dot(&multipliers.sigmax, &vx) + real_dot(&multipliers.sigmay, &vy);
        terms.lam5 = real_dot(&multipliers.delta, &aub);
    }

    /// Exact minimiser along `-d` of the quadratic part:
    /// `|⟨d,d⟩ / (‖DTd‖² + (mu/beta)‖Ad‖²)|`.
    pub fn steepest_descent_step(&self, d: &DVector<T>, mu_d_beta: Float) -> Float {
        let (dx, dy) = self.transform(d);
        let d_d_d = dx.norm_squared() + dy.norm_squared();
        let ad = self.operator.forward(d);
        (d.norm_squared()/guard(d_d_d + mu_d_beta*ad.norm_squared())).abs()
    }

    fn terms(&self, vx: &DVector<T>, vy: &DVector<T>, aub: &DVector<T>, lam1: Float, multipliers: &Multipliers<T>, beta: Float, mu: Float) -> Terms {
        let lam2 = vx.norm_squared() + vy.norm_squared();
        let lam3 = aub.norm_squared();
        let lam4 = real_dot(&multipliers.sigmax, vx) + real_dot(&multipliers.sigmay, vy);
        let lam5 = real_dot(&multipliers.delta, aub);
        let f = Terms::objective(lam1, lam2, lam3, lam4, lam5, beta, mu);
        Terms { lam1, lam2, lam3, lam4, lam5, f }
    }
}
