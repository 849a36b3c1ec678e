#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::{
    traits::{Info, Variables},
    PolishStatus, SolverStatus,
};
use crate::timers::*;
use itertools::izip;

// ---------------
// Progress information for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Info`](crate::solver::core::traits::Info) and
/// [`InfoPrint`](crate::solver::core::traits::InfoPrint) traits

#[derive(Default, Debug, Clone)]
pub struct DefaultInfo<T> {
    /// interim or final solver status
    pub status: SolverStatus,
    /// iterations taken by the most recent solve
    pub iterations: u32,
    /// objective value of the current iterate
    pub obj_val: T,
    /// primal residual (unscaled)
    pub res_prim: T,
    /// dual residual (unscaled)
    pub res_dual: T,
    /// primal residual in the equilibrated space
    pub res_prim_scaled: T,
    /// dual residual in the equilibrated space
    pub res_dual_scaled: T,
    /// primal tolerance of the latest termination check
    pub eps_prim: T,
    /// dual tolerance of the latest termination check
    pub eps_dual: T,
    /// number of accepted ρ rebuilds
    pub rho_updates: u32,
    /// step parameter suggested by the latest residual balance
    pub rho_estimate: T,
    /// outcome of solution polishing
    pub polish_status: PolishStatus,

    /// setup time (seconds)
    pub setup_time: f64,
    /// solve time for the most recent solve (seconds)
    pub solve_time: f64,
    /// polish time for the most recent solve (seconds)
    pub polish_time: f64,
    /// total of the times above (seconds)
    pub run_time: f64,

    // unscaled norms of iterate products, for the residual tolerances
    norm_Ax: T,
    norm_z: T,
    norm_Px: T,
    norm_Aty: T,
    norm_q: T,

    // equilibrated-space counterparts, for the ρ estimate
    norm_Ax_sc: T,
    norm_z_sc: T,
    norm_Px_sc: T,
    norm_Aty_sc: T,
    norm_q_sc: T,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    // (ε_prim, ε_dual) for the given settings, from the norms of the
    // latest residual update
    fn tolerances(&self, settings: &DefaultSettings<T>) -> (T, T) {
        let eps_prim = settings.eps_abs + settings.eps_rel * T::max(self.norm_Ax, self.norm_z);
        let eps_dual = settings.eps_abs
            + settings.eps_rel * T::max(self.norm_Px, T::max(self.norm_Aty, self.norm_q));
        (eps_prim, eps_dual)
    }

    // Primal infeasibility certificate from δy over the latest check
    // window: ‖Aᵀδy‖∞ small relative to ‖δy‖∞, and δy a descent
    // direction for the bound support function.   All measures are
    // computed on the unscaled problem.
    fn is_primal_infeasible(
        &self,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        eps: T,
    ) -> bool {
        let equil = &data.equilibration;
        let cinv = T::recip(equil.c);

        let norm_dy = variables.delta_y.norm_inf_scaled(&equil.e) * cinv;
        if !(norm_dy > T::zero() && norm_dy.is_finite()) {
            return false;
        }
        let thresh = eps * norm_dy;

        if residuals.Atdy.norm_inf_scaled(&equil.dinv) * cinv > thresh {
            return false;
        }

        // support function of the bounds along δy.   A bound that is
        // infinite on the active side makes the certificate worthless.
        let mut support = T::zero();
        for (&dy, &l, &u) in izip!(&variables.delta_y, &data.l, &data.u) {
            if dy > T::zero() {
                if !u.is_finite() {
                    return false;
                }
                support += u * dy;
            } else if dy < T::zero() {
                if !l.is_finite() {
                    return false;
                }
                support += l * dy;
            }
        }

        support * cinv <= thresh
    }

    // Dual infeasibility certificate from δx over the latest check
    // window: Pδx ≈ 0, qᵀδx sufficiently negative, and Aδx in the
    // recession cone of the constraint interval.
    fn is_dual_infeasible(
        &self,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        eps: T,
    ) -> bool {
        let equil = &data.equilibration;
        let cinv = T::recip(equil.c);

        let norm_dx = variables.delta_x.norm_inf_scaled(&equil.d);
        if !(norm_dx > T::zero() && norm_dx.is_finite()) {
            return false;
        }
        let thresh = eps * norm_dx;

        if data.q.dot(&variables.delta_x) * cinv > -thresh {
            return false;
        }
        if residuals.Pdx.norm_inf_scaled(&equil.dinv) * cinv > thresh {
            return false;
        }

        for (&Adx, &einv, &l, &u) in izip!(&residuals.Adx, &equil.einv, &data.l, &data.u) {
            let v = Adx * einv;
            if (u.is_finite() && v > thresh) || (l.is_finite() && v < -thresh) {
                return false;
            }
        }

        true
    }
}

impl<T> Info<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type V = DefaultVariables<T>;
    type R = DefaultResiduals<T>;

    fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.polish_status = PolishStatus::NotPerformed;
        self.iterations = 0;
        self.rho_updates = 0;
        self.solve_time = 0f64;
        self.polish_time = 0f64;

        timers.reset("solve");
        timers.reset("polish");
    }

    fn update(
        &mut self,
        data: &mut DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        timers: &Timers,
    ) {
        let normq = data.get_normq();

        let equil = &data.equilibration;
        let (dinv, einv) = (&equil.dinv, &equil.einv);
        let cinv = T::recip(equil.c);

        // residual norms, in the equilibrated and the user space
        self.res_prim_scaled = _norm_diff(&residuals.Ax, &variables.z);
        self.res_dual_scaled = _norm_sum3(&residuals.Px, &data.q, &residuals.Aty);

        self.res_prim = _norm_scaled_diff(einv, &residuals.Ax, &variables.z);
        self.res_dual = _norm_scaled_sum3(dinv, &residuals.Px, &data.q, &residuals.Aty) * cinv;

        // norms feeding the relative tolerances (user space)
        self.norm_Ax = residuals.Ax.norm_inf_scaled(einv);
        self.norm_z = variables.z.norm_inf_scaled(einv);
        self.norm_Px = residuals.Px.norm_inf_scaled(dinv) * cinv;
        self.norm_Aty = residuals.Aty.norm_inf_scaled(dinv) * cinv;
        self.norm_q = normq;

        // the ρ estimate balances the scaled residuals, each
        // normalized by the size of its own ingredients
        self.norm_Ax_sc = residuals.Ax.norm_inf();
        self.norm_z_sc = variables.z.norm_inf();
        self.norm_Px_sc = residuals.Px.norm_inf();
        self.norm_Aty_sc = residuals.Aty.norm_inf();
        self.norm_q_sc = data.q.norm_inf();

        let guard = T::epsilon();
        let prim_norm = T::max(T::max(self.norm_Ax_sc, self.norm_z_sc), guard);
        let dual_norm = T::max(
            T::max(self.norm_Px_sc, T::max(self.norm_Aty_sc, self.norm_q_sc)),
            guard,
        );

        let prim_ratio = self.res_prim_scaled / prim_norm;
        let dual_ratio = T::max(self.res_dual_scaled / dual_norm, guard);

        self.rho_estimate = (variables.rho * T::sqrt(prim_ratio / dual_ratio))
            .clip(RHO_MIN.as_T(), RHO_MAX.as_T());

        // objective value.   Inner products with the scaled data give
        // c times the user objective.
        let half: T = (0.5).as_T();
        self.obj_val = (half * residuals.dot_xPx + residuals.dot_qx) * cinv;

        // solve time so far
        self.solve_time = timers.read("solve").as_secs_f64();
    }

    fn check_termination(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
        iter: u32,
    ) -> bool {
        self.iterations = iter;

        (self.eps_prim, self.eps_dual) = self.tolerances(settings);

        // a non-finite iterate cannot recover
        if !(self.res_prim.is_finite() && self.res_dual.is_finite()) || !variables.is_finite() {
            self.status = SolverStatus::NumericalError;
            return true;
        }

        if self.res_prim <= self.eps_prim && self.res_dual <= self.eps_dual {
            self.status = SolverStatus::Solved;
        } else if self.is_primal_infeasible(data, variables, residuals, settings.eps_prim_inf) {
            self.status = SolverStatus::PrimalInfeasible;
        } else if self.is_dual_infeasible(data, variables, residuals, settings.eps_dual_inf) {
            self.status = SolverStatus::DualInfeasible;
        } else if iter == settings.max_iter {
            self.status = SolverStatus::MaxIterations;
        }

        self.status != SolverStatus::Unsolved
    }

    fn finalize(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
        timers: &mut Timers,
    ) {
        // iteration and time limit exits are reclassified when the
        // iterate is within 10x of the requested accuracy
        if matches!(
            self.status,
            SolverStatus::MaxIterations | SolverStatus::MaxTime
        ) {
            let ten: T = (10.0).as_T();
            let (eps_prim, eps_dual) = self.tolerances(settings);

            if self.res_prim <= ten * eps_prim && self.res_dual <= ten * eps_dual {
                self.status = SolverStatus::SolvedInaccurate;
            } else if self.is_primal_infeasible(
                data,
                variables,
                residuals,
                ten * settings.eps_prim_inf,
            ) {
                self.status = SolverStatus::PrimalInfeasibleInaccurate;
            } else if self.is_dual_infeasible(
                data,
                variables,
                residuals,
                ten * settings.eps_dual_inf,
            ) {
                self.status = SolverStatus::DualInfeasibleInaccurate;
            }
        }

        self.setup_time = timers.read("setup").as_secs_f64();
        self.solve_time = timers.read("solve").as_secs_f64();
        self.polish_time = timers.read("polish").as_secs_f64();
        self.run_time = self.setup_time + self.solve_time + self.polish_time;
    }

    fn scaled_residuals(&self) -> (T, T) {
        (self.res_prim_scaled, self.res_dual_scaled)
    }

    fn rho_estimate(&self) -> T {
        self.rho_estimate
    }

    fn save_rho_update(&mut self) {
        self.rho_updates += 1;
    }

    fn get_status(&self) -> SolverStatus {
        self.status
    }

    fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }
}

// inf-norm helpers over elementwise expressions, avoiding
// intermediate storage

// max |a_i - b_i|
fn _norm_diff<T: FloatT>(a: &[T], b: &[T]) -> T {
    izip!(a, b).fold(T::zero(), |acc, (&a, &b)| T::max(acc, T::abs(a - b)))
}

// max |s_i (a_i - b_i)|
fn _norm_scaled_diff<T: FloatT>(s: &[T], a: &[T], b: &[T]) -> T {
    izip!(s, a, b).fold(T::zero(), |acc, (&s, &a, &b)| T::max(acc, T::abs(s * (a - b))))
}

// max |a_i + b_i + c_i|
fn _norm_sum3<T: FloatT>(a: &[T], b: &[T], c: &[T]) -> T {
    izip!(a, b, c).fold(T::zero(), |acc, (&a, &b, &c)| T::max(acc, T::abs(a + b + c)))
}

// max |s_i (a_i + b_i + c_i)|
fn _norm_scaled_sum3<T: FloatT>(s: &[T], a: &[T], b: &[T], c: &[T]) -> T {
    izip!(s, a, b, c).fold(T::zero(), |acc, (&s, &a, &b, &c)| {
        T::max(acc, T::abs(s * (a + b + c)))
    })
}
