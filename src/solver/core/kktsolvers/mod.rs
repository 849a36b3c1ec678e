#![allow(non_snake_case)]
use super::CoreSettings;
use crate::algebra::*;

pub(crate) mod context;
pub mod direct;
pub mod indirect;

/// Linear system backend consumed by the solver engine.
///
/// A backend solves the reduced system `(P + σI + AᵀRA)x̃ = b` arising
/// at each iteration, with `R = diag(rho_vec)`.   Backends are selected
/// through the `linear_solver_method` setting and advertise their
/// capabilities through [`LinearSolverInfo`].
pub trait KKTSolver<T: FloatT>: HasLinearSolverInfo {
    /// Solve the reduced system for the given right hand side.   The
    /// `lhs` argument carries the previous solution on entry and may be
    /// used as a warm start.   Returns `false` on numerical failure.
    fn solve(&mut self, rhs: &[T], lhs: &mut [T]) -> bool;

    /// Rebuild ρ-dependent internal terms (e.g. the preconditioner).
    fn update_rho(&mut self, rho_vec: &[T]);

    /// Accept new matrix values.   The sparsity patterns must be
    /// unchanged from construction.
    fn update_matrices(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>);

    /// Report the latest scaled residuals of the outer iteration.
    /// Iterative backends use these to tighten their termination
    /// tolerance; direct backends ignore them.
    fn update_tolerances(&mut self, _res_prim_scaled: T, _res_dual_scaled: T) {}
}

pub trait HasLinearSolverInfo {
    fn linear_solver_info(&self) -> LinearSolverInfo;
}

/// Capability descriptor for a linear system backend.
#[derive(Debug, Default, Clone)]
pub struct LinearSolverInfo {
    pub name: String,
    /// direct (factorization) vs indirect (iterative) method
    pub direct: bool,
}

type BoxedKKTSolver<T> = Box<dyn KKTSolver<T> + Send>;
type KKTSolverConstructor<T> =
    fn(&CscMatrix<T>, &CscMatrix<T>, &[T], &CoreSettings<T>) -> BoxedKKTSolver<T>;

// Fixed registry of compiled-in backends, keyed by the
// `linear_solver_method` setting.   Any new supported backend must be
// added here and to the settings validator.
pub(crate) fn kktsolver_constructor<T: FloatT>(method: &str) -> Option<KKTSolverConstructor<T>> {
    match method {
        "pcg" => Some(|P, A, rho_vec, settings| {
            Box::new(indirect::PcgKKTSolver::new(P, A, rho_vec, settings))
        }),
        _ => None,
    }
}
