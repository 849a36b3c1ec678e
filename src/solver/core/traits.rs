//! Required traits for types providing a solver implementation.
//!
//! This module defines the core traits that must be implemented by a
//! collection of mutually associated data types to make a solver for a
//! particular problem format.
//!
//! In nearly all cases there is no need for a user to implement these
//! traits.  Instead, users should use the collection of types that are
//! provided in the [default solver implementation](crate::solver::DefaultSolver),
//! which collectively implement support for the problem format described
//! in the top level crate documentation.

use super::{CoreSettings, SolverStatus};
use crate::algebra::*;
use crate::timers::*;

/// Problem data for a QP in standard form.

pub trait ProblemData<T: FloatT> {
    type SE: Settings<T>;

    /// Equilibrate internal data before the solver starts.
    fn equilibrate(&mut self, settings: &Self::SE);
}

/// Iterate state of the splitting algorithm.

pub trait Variables<T: FloatT> {
    type D: ProblemData<T>;
    type SE: Settings<T>;

    /// Zero the iterate for a cold start.
    fn reset(&mut self);

    /// Record the previous constraint iterate, i.e. `z_prev ← z`.
    fn shift_prev(&mut self);

    /// Over-relaxed primal update `x ← αx̃ + (1−α)x`.
    fn over_relax_x(&mut self, α: T);

    /// Constraint iterate update with projection onto the constraint
    /// interval: `z ← Π(αz̃ + (1−α)z_prev + R⁻¹y)`.
    fn project_z(&mut self, data: &Self::D, α: T);

    /// Dual update `y ← y + R(αz̃ + (1−α)z_prev − z)`.
    fn update_y(&mut self, α: T);

    /// Record the change in (x,y) since the iterate `prev`.   Used for
    /// infeasibility certificates.
    fn save_deltas(&mut self, prev: &Self);

    /// Rebuild the per-constraint step parameter vector around a new
    /// scalar estimate ρ.
    fn update_rho_vec(&mut self, ρ: T, data: &Self::D, settings: &Self::SE);

    /// Current scalar step parameter estimate.
    fn rho(&self) -> T;

    /// Overwrite values with those from another object
    fn copy_from(&mut self, src: &Self);

    /// Checks that the iterate contains no Infs or NaNs.
    fn is_finite(&self) -> bool;
}

/// Products of the problem data with the current iterate, used in
/// residual and objective computations.

pub trait Residuals<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;

    /// Compute data products for the given variables.
    fn update(&mut self, variables: &Self::V, data: &Self::D);
}

/// The per-iteration linear system subproblem.

pub trait KKTSystem<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type SE: Settings<T>;

    /// Solve the linear subproblem for (x̃, z̃), writing the result
    /// into the variables' working storage.   Returns `false` on a
    /// numerical failure.
    fn solve(&mut self, variables: &mut Self::V, data: &Self::D, settings: &Self::SE) -> bool;

    /// Report the latest scaled residuals.   Iterative backends use
    /// these to tighten their termination tolerance across iterations.
    fn update_tolerances(&mut self, res_prim_scaled: T, res_dual_scaled: T);

    /// Refresh internal terms after a change to the ρ vector.
    fn update_rho(&mut self, variables: &Self::V);

    /// Refresh internal terms after matrix value updates.
    fn update_matrices(&mut self, data: &Self::D);
}

/// Post-solve refinement of the solution on the active constraint set.

pub trait Polisher<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type I;
    type SE: Settings<T>;

    /// Attempt to refine a solved iterate.   Commits the refined
    /// iterate into `variables` and updates `info` only when the
    /// refinement does not degrade the residuals.
    fn polish(
        &mut self,
        data: &Self::D,
        variables: &mut Self::V,
        info: &mut Self::I,
        settings: &Self::SE,
    );
}

/// Printing functions for the solver's Info

pub trait InfoPrint<T>
where
    T: FloatT,
{
    type D: ProblemData<T>;
    type SE: Settings<T>;

    /// Print the solver configuration, e.g. settings etc.
    /// Called once at the start of the solve.
    fn print_configuration(&self, settings: &Self::SE, data: &Self::D) -> std::io::Result<()>;

    /// Print a header to appear at the top of progress information.
    fn print_status_header(&self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver progress information.   Called at every
    /// termination check.
    fn print_status(&self, settings: &Self::SE) -> std::io::Result<()>;

    /// Print solver final status and other exit information.   Called
    /// at solver termination.
    fn print_footer(&self, settings: &Self::SE) -> std::io::Result<()>;
}

/// Internal information for the solver to monitor progress and check
/// for termination.

pub trait Info<T>: InfoPrint<T>
where
    T: FloatT,
{
    type V: Variables<T>;
    type R: Residuals<T>;

    /// Reset internal data, particularly solve timers.
    fn reset(&mut self, timers: &mut Timers);

    /// Update residual norms, tolerances and the objective for the
    /// current iterate.
    fn update(
        &mut self,
        data: &mut Self::D,
        variables: &Self::V,
        residuals: &Self::R,
        timers: &Timers,
    );

    /// Return `true` if a terminal status has been reached.
    fn check_termination(
        &mut self,
        data: &Self::D,
        variables: &Self::V,
        residuals: &Self::R,
        settings: &Self::SE,
        iter: u32,
    ) -> bool;

    /// Compute final values before solver termination, including the
    /// inaccurate-convergence reclassification of iteration and time
    /// limit exits.
    fn finalize(
        &mut self,
        data: &Self::D,
        variables: &Self::V,
        residuals: &Self::R,
        settings: &Self::SE,
        timers: &mut Timers,
    );

    /// Latest scaled primal/dual residual pair.
    fn scaled_residuals(&self) -> (T, T);

    /// Step parameter suggested by the latest residual balance.
    fn rho_estimate(&self) -> T;

    /// Record that the ρ vector was rebuilt.
    fn save_rho_update(&mut self);

    /// Report or update termination status
    fn get_status(&self) -> SolverStatus;
    fn set_status(&mut self, status: SolverStatus);
}

/// User-facing solution for the problem.

pub trait Solution<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type I;

    /// Compute the (unscaled) solution from the variables at solver
    /// termination.
    fn post_process(&mut self, data: &Self::D, variables: &mut Self::V, info: &Self::I);
}

/// Settings for the solver.
///
/// Implementors of this trait can define any internal or problem
/// specific settings they wish.   They must, however, also maintain
/// a settings object of type [`CoreSettings`](crate::solver::core::CoreSettings)
/// and return this to the solver internally.

pub trait Settings<T: FloatT> {
    /// Return the core settings.
    fn core(&self) -> &CoreSettings<T>;

    /// Return the core settings (mutably).
    fn core_mut(&mut self) -> &mut CoreSettings<T>;
}
