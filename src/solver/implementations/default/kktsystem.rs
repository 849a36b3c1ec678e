#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::kktsolvers::{kktsolver_constructor, KKTSolver};
use crate::solver::core::traits::KKTSystem;
use std::iter::zip;

// ---------------
// KKT system for the default problem format
// ---------------

/// Standard-form solver type implementing the [`KKTSystem`](crate::solver::core::traits::KKTSystem) trait.
///
/// Each iteration requires (x̃, ν) satisfying the augmented system
///
/// ```text
/// [P + σI    Aᵀ ] [x̃]   [σx − q   ]
/// [A       −R⁻¹ ] [ν] = [z − R⁻¹y ]
/// ```
///
/// Eliminating ν gives the reduced problem
/// `(P + σI + AᵀRA)x̃ = σx − q + Aᵀ(Rz − y)`, which the configured
/// backend solves, after which the ν reconstruction collapses to
/// `z̃ = Ax̃`.
pub struct DefaultKKTSystem<T> {
    kktsolver: Box<dyn KKTSolver<T> + Send>,

    // reduced system right hand side (length n)
    rhs: Vec<T>,
    // scratch for Rz − y (length m)
    work_m: Vec<T>,
}

impl<T> DefaultKKTSystem<T>
where
    T: FloatT,
{
    pub fn new(
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        settings: &DefaultSettings<T>,
    ) -> Self {
        // settings validation has already confirmed that the
        // backend exists
        let ctor = kktsolver_constructor::<T>(&settings.linear_solver_method)
            .expect("unvalidated linear solver backend");

        let kktsolver = ctor(&data.P, &data.A, &variables.rho_vec, settings);

        Self {
            kktsolver,
            rhs: vec![T::zero(); data.n],
            work_m: vec![T::zero(); data.m],
        }
    }

    /// capability information for the configured backend
    pub fn linear_solver_info(&self) -> crate::solver::core::kktsolvers::LinearSolverInfo {
        self.kktsolver.linear_solver_info()
    }
}

impl<T> KKTSystem<T> for DefaultKKTSystem<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type SE = DefaultSettings<T>;

    fn solve(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        let n = data.n;
        let σ = settings.sigma;

        // rhs = σx − q + Aᵀ(Rz − y)
        for (w, ((&z, &y), &rho)) in zip(
            &mut self.work_m,
            zip(zip(&variables.z, &variables.y), &variables.rho_vec),
        ) {
            *w = rho * z - y;
        }
        data.A
            .t()
            .gemv(&mut self.rhs, &self.work_m, T::one(), T::zero());
        for (rhs, (&x, &q)) in zip(&mut self.rhs, zip(&variables.x, &data.q)) {
            *rhs += σ * x - q;
        }

        // solve in place, warm started from the previous x̃
        let (xtilde, ztilde) = variables.xz_tilde.split_at_mut(n);
        if !self.kktsolver.solve(&self.rhs, xtilde) {
            return false;
        }

        // z̃ = Ax̃
        data.A.gemv(ztilde, xtilde, T::one(), T::zero());

        true
    }

    fn update_tolerances(&mut self, res_prim_scaled: T, res_dual_scaled: T) {
        self.kktsolver
            .update_tolerances(res_prim_scaled, res_dual_scaled);
    }

    fn update_rho(&mut self, variables: &DefaultVariables<T>) {
        self.kktsolver.update_rho(&variables.rho_vec);
    }

    fn update_matrices(&mut self, data: &DefaultProblemData<T>) {
        self.kktsolver.update_matrices(&data.P, &data.A);
    }
}
