extern crate nalgebra as na;

use log::{debug, info, warn};
use na::{DMatrix, DVector};
use crate::{Float, GenericScalar};
use crate::error::{Error, Result};
use crate::image::{Shape, TvOperators};
use crate::numerics::{guard, project_nonnegative, real_dot, real_part};
use crate::operator::{is_near_orthonormal, LinearOperator, ScaledOperator};
use super::diagnostics::Diagnostics;
use super::lagrangian::{Increment, Iterate, Multipliers, Problem};
use super::options::{InitPolicy, Options, StoppingCriterion};
use super::scaling::{scale_measurements, scale_operator};

const MAX_BACKTRACKS: usize = 5;

/// Result of a solve: the signal in the caller's units and the run history.
#[derive(Debug, Clone)]
pub struct Reconstruction<T: GenericScalar> {
    pub signal: DVector<T>,
    pub shape: Shape,
    pub diagnostics: Diagnostics
}

impl<T: GenericScalar> Reconstruction<T> {
    pub fn frame(&self, k: usize) -> Result<DMatrix<T>> {
        self.shape.frame(&self.signal, k)
    }

    pub fn relative_error(&self, truth: &DVector<T>) -> Float {
        (&self.signal - truth).norm()/guard(truth.norm())
    }
}

/// Values kept from the previous inner iteration for the Barzilai-Borwein step.
struct StepMemory<T: GenericScalar> {
    g: DVector<T>,
    g2: DVector<T>,
    uup: DVector<T>
}

/// TV minimisation subject to `A u = b` by the augmented Lagrangian method
/// with continuation on `beta`/`mu`.
pub struct Tval3<T: GenericScalar> {
    options: Options,
    operators: TvOperators<T>,
    initial_guess: Option<DVector<T>>,
    ground_truth: Option<DVector<T>>
}

impl<T: GenericScalar> Tval3<T> {
    pub fn new(options: Options) -> Tval3<T> {
        Tval3 {
            options,
            operators: TvOperators::periodic(),
            initial_guess: None,
            ground_truth: None
        }
    }

    pub fn with_operators(mut self, operators: TvOperators<T>) -> Tval3<T> {
        self.operators = operators;
        self
    }

    /// Overrides `Options::init`. A guess of the wrong size is dropped in favour of `A'b`.
    pub fn with_initial_guess(mut self, guess: DVector<T>) -> Tval3<T> {
        self.initial_guess = Some(guess);
        self
    }

    /// Only used to record the relative error per iteration.
    pub fn with_ground_truth(mut self, truth: DVector<T>) -> Tval3<T> {
        self.ground_truth = Some(truth);
        self
    }

    #[allow(non_snake_case)]
    pub fn solve(&self, A: &dyn LinearOperator<T>, b: &DVector<T>, shape: Shape) -> Result<Reconstruction<T>> {
        let opts = &self.options;
        opts.validate()?;
        let (beta0, mu0) = opts.initial_penalties()?;
        check_dimensions(A, b, &shape)?;

        let mut diagnostics = Diagnostics::default();
        let mut b = b.clone();
        let mut mu = opts.mu;

        let mut scale_a = opts.scale_a;
        if scale_a && is_near_orthonormal(A, &b) {
            debug!("A A' is close to the identity, operator scaling disabled");
            scale_a = false;
        }
        let operator_factor = match scale_a {
            true => scale_operator(A, &mut b, &mut mu, opts.consist_mu),
            false => 1.0
        };
        let scl = match opts.scale_b {
            true => scale_measurements(&mut b, &mut mu, opts.consist_mu),
            false => 1.0
        };

        let scaled = ScaledOperator::new(A, operator_factor);
        diagnostics.operator_scaled = operator_factor != 1.0;
        let problem = Problem::new(&scaled, &self.operators, b, shape, opts.tv_norm);

        let muf = mu;
        let betaf = opts.beta;
        let mut beta = beta0.min(betaf);
        mu = mu0.min(muf);
        let mut mu_d_beta = mu/beta;
        diagnostics.mu_final = muf;
        diagnostics.beta_final = betaf;
        diagnostics.operator_scale = 1.0/scaled.factor();
        diagnostics.measurement_scale = scl;

        let u = self.initial_signal(&problem, scl);
        let truth = self.scaled_ground_truth(&shape, scl);

        let n = shape.len();
        let mut multipliers = Multipliers::<T>::zeros(n, problem.b.nrows());
        let mut dts_atd = DVector::<T>::zeros(n);

        let (ux, uy) = problem.transform(&u);
        let mut w = problem.shrink(&ux, &uy, &multipliers, beta);
        let lam1 = problem.tv_norm(&w);
        let (mut iterate, mut terms) = problem.evaluate(u, ux, uy, &w, lam1, &multipliers, beta, mu);
        let mut d = descent_direction(&iterate, mu_d_beta, &dts_atd);

        let mut count = 1;
        let mut q: Float = 1.0;
        let mut c = terms.f;
        let mut gam = opts.gam;
        let mut memory: Option<StepMemory<T>> = None;
        let mut rcd_u = iterate.u.clone();
        let mut inner_its = 0;

        diagnostics.record_terms(&terms);
        diagnostics.c.push(c);
        diagnostics.record_penalties(beta, mu);
        if let Some((ut, nrm_ut)) = &truth {
            diagnostics.n2re.push((&iterate.u - ut).norm()/nrm_ut);
        }

        for ii in 0..opts.maxit {
            if opts.disp > 0 && ii % opts.disp == 0 {
                info!("outer iter = {}, total iter = {}, normU = {:4.2e}", count, ii + 1, iterate.u.norm());
            }

            let mut tau = match &memory {
                Some(previous) => {
                    let dg = &iterate.g - &previous.g;
                    let dg2 = &iterate.g2 - &previous.g2;
                    let ss = previous.uup.norm_squared();
                    let sy = real_dot(&previous.uup, &(dg2 + dg*T::from_real(mu_d_beta)));
                    (ss/guard(sy)).abs()
                },
                None => problem.steepest_descent_step(&d, mu_d_beta)
            };

            // Up, gp, g2p, Aup, Uxp, Uyp
            let snapshot = iterate.clone();

            let taud = &d*T::from_real(tau);
            let mut u = &snapshot.u - &taud;
            if opts.nonneg {
                project_nonnegative(&mut u);
            }
            let (ux, uy) = problem.transform(&u);
            let (candidate, candidate_terms) = problem.evaluate(u, ux, uy, &w, terms.lam1, &multipliers, beta, mu);
            iterate = candidate;
            terms = candidate_terms;

            // non-monotone back-tracking along U = Up + alpha*(U - Up)
            let mut alpha: Float = 1.0;
            let slack = opts.c*beta*real_dot(&d, &taud);
            let mut cnt = 0;
            let mut increment: Option<Increment<T>> = None;
            while terms.f > c - alpha*slack {
                if cnt == MAX_BACKTRACKS {
                    gam *= opts.rate_gam;
                    debug!("back tracking reached {} attempts at iteration {}, falling back to steepest descent", cnt, ii + 1);

                    tau = problem.steepest_descent_step(&d, mu_d_beta);
                    let mut u = &snapshot.u - &d*T::from_real(tau);
                    if opts.nonneg {
                        project_nonnegative(&mut u);
                    }
                    let (ux, uy) = problem.transform(&u);
                    w = problem.shrink(&ux, &uy, &multipliers, beta);
                    let lam1 = problem.tv_norm(&w);
                    let (fallback, fallback_terms) = problem.evaluate(u, ux, uy, &w, lam1, &multipliers, beta, mu);
                    iterate = fallback;
                    terms = fallback_terms;
                    alpha = 0.0;
                    break;
                }
                let increment = increment.get_or_insert_with(|| Increment::between(&snapshot, &iterate));
                alpha *= opts.gamma;
                let (shrunk, shrunk_terms) = problem.interpolate(&snapshot, increment, alpha, &w, terms.lam1, &multipliers, beta, mu);
                iterate = shrunk;
                terms = shrunk_terms;
                cnt += 1;
            }

            if alpha != 0.0 {
                w = problem.shrink(&iterate.ux, &iterate.uy, &multipliers, beta);
                problem.refresh_shrinkage(&mut iterate, &w, &multipliers, &mut terms, beta);
            }

            let q_prev = q;
            q = gam*q_prev + 1.0;
            c = (gam*q_prev*c + terms.f)/q;

            let uup = &iterate.u - &snapshot.u;
            let nrm_uup = uup.norm();
            let nrm_up = snapshot.u.norm();

            d = descent_direction(&iterate, mu_d_beta, &dts_atd);

            let inner_metric = match opts.stopping {
                StoppingCriterion::RelativeChange => nrm_uup/nrm_up,
                StoppingCriterion::OptimalityGap => d.norm()/guard(iterate.u.norm())
            };

            diagnostics.res.push(inner_metric);
            diagnostics.record_terms(&terms);
            diagnostics.c.push(c);
            diagnostics.cnt.push(cnt);
            diagnostics.tau.push(tau);
            diagnostics.alpha.push(alpha);
            if let Some((ut, nrm_ut)) = &truth {
                diagnostics.n2re.push((&iterate.u - ut).norm()/nrm_ut);
            }

            memory = Some(StepMemory { g: snapshot.g, g2: snapshot.g2, uup });
            inner_its += 1;

            if inner_metric < opts.tol_inn || inner_its >= opts.maxin {
                count += 1;
                let outer_metric = match opts.stopping {
                    StoppingCriterion::RelativeChange => (&iterate.u - &rcd_u).norm()/nrm_up,
                    StoppingCriterion::OptimalityGap => (&iterate.au - &problem.b).norm()/guard(problem.b.norm())
                };
                diagnostics.reer.push(outer_metric);
                diagnostics.obj.push(terms.f + terms.lam4 + terms.lam5);
                diagnostics.itrs.push(inner_its);
                rcd_u = iterate.u.clone();
                inner_its = 0;

                if outer_metric < opts.tol || count > opts.maxcnt {
                    diagnostics.itr = ii + 1;
                    diagnostics.converged = true;
                    info!("Number of total iterations is {}.", diagnostics.itr);
                    return Ok(self.finish(iterate.u, scl, shape, diagnostics));
                }

                problem.update_multipliers(&iterate, &w, &mut multipliers, &mut terms, beta, mu);

                let beta_prev = beta;
                beta = (beta*opts.rate_ctn).min(betaf);
                mu = (mu*opts.rate_ctn).min(muf);
                mu_d_beta = mu/beta;
                diagnostics.record_penalties(beta, mu);

                terms.recompute(beta, mu);
                // D'sigma + A'delta divided by the new beta
                dts_atd = &d*T::from_real(-(beta_prev/beta));
                d = descent_direction(&iterate, mu_d_beta, &dts_atd);

                memory = None;
                gam = opts.gam;
                q = 1.0;
                c = terms.f;
            }
        }

        diagnostics.itr = opts.maxit;
        diagnostics.converged = false;
        warn!("Attain the maximum of iterations {}.", opts.maxit);
        Ok(self.finish(iterate.u, scl, shape, diagnostics))
    }

    fn initial_signal(&self, problem: &Problem<T>, scl: Float) -> DVector<T> {
        let n = problem.shape.len();
        let mut u = match &self.initial_guess {
            Some(guess) if guess.nrows() == n => guess*T::from_real(scl),
            Some(guess) => {
                warn!("Input initial guess has incompatible size ({} instead of {})! Switch to the default initial guess.", guess.nrows(), n);
                problem.atb.clone()
            },
            None => match self.options.init {
                InitPolicy::Zero => DVector::<T>::zeros(n),
                InitPolicy::Adjoint => problem.atb.clone()
            }
        };
        if self.options.nonneg {
            project_nonnegative(&mut u);
        }
        u
    }

    fn scaled_ground_truth(&self, shape: &Shape, scl: Float) -> Option<(DVector<T>, Float)> {
        match &self.ground_truth {
            Some(ut) if ut.nrows() == shape.len() => {
                let ut = ut*T::from_real(scl);
                let nrm_ut = guard(ut.norm());
                Some((ut, nrm_ut))
            },
            Some(ut) => {
                warn!("ground truth has {} elements instead of {}, error tracking disabled", ut.nrows(), shape.len());
                None
            },
            None => None
        }
    }

    fn finish(&self, u: DVector<T>, scl: Float, shape: Shape, diagnostics: Diagnostics) -> Reconstruction<T> {
        let mut signal = match self.options.isreal {
            true => real_part(&u),
            false => u
        };
        if scl != 1.0 {
            signal.unscale_mut(scl);
        }
        Reconstruction { signal, shape, diagnostics }
    }
}

/// `solve` with the periodic difference operators and no initial guess.
#[allow(non_snake_case)]
pub fn solve<T: GenericScalar>(A: &dyn LinearOperator<T>, b: &DVector<T>, shape: Shape, options: &Options) -> Result<Reconstruction<T>> {
    Tval3::new(options.clone()).solve(A, b, shape)
}

/// `d = g2 + (mu/beta)*g - DtsAtd`
fn descent_direction<T: GenericScalar>(iterate: &Iterate<T>, mu_d_beta: Float, dts_atd: &DVector<T>) -> DVector<T> {
    &iterate.g2 + &iterate.g*T::from_real(mu_d_beta) - dts_atd
}

#[allow(non_snake_case)]
fn check_dimensions<T: GenericScalar>(A: &dyn LinearOperator<T>, b: &DVector<T>, shape: &Shape) -> Result<()> {
    if b.nrows() == 0 || shape.is_empty() {
        return Err(Error::OperatorShape(format!("empty problem: {} measurements, {} unknowns", b.nrows(), shape.len())));
    }
    if A.nrows() != b.nrows() {
        return Err(Error::OperatorShape(format!("A has {} rows but b has {} entries", A.nrows(), b.nrows())));
    }
    if A.ncols() != shape.len() {
        return Err(Error::OperatorShape(format!("A has {} columns but the volume {}x{}x{} has {} elements", A.ncols(), shape.rows, shape.cols, shape.frames, shape.len())));
    }
    Ok(())
}
