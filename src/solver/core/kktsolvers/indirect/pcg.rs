#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::core::kktsolvers::context::BackendContextGuard;
use crate::solver::core::kktsolvers::{HasLinearSolverInfo, KKTSolver, LinearSolverInfo};
use crate::solver::core::CoreSettings;
use std::iter::zip;

// -------------------------------------
// KKTSolver using matrix-free preconditioned conjugate gradients
// on the reduced system (P + σI + AᵀRA)x̃ = b
// -------------------------------------

// the relative tolerance never leaves [CG_EPS_MIN, CG_EPS_MAX], and
// only tightens as the outer iteration converges
const CG_EPS_MIN: f64 = 1e-12;
const CG_EPS_MAX: f64 = 0.1;

// fraction of the outer residual used to set the inner tolerance
const CG_TOL_FRACTION: f64 = 0.1;

pub struct PcgKKTSolver<T> {
    n: usize,

    // problem data for the reduced operator.  P is triu
    P: CscMatrix<T>,
    A: CscMatrix<T>,
    rho_vec: Vec<T>,
    σ: T,

    // Jacobi preconditioner: inverse of diag(P + σI + AᵀRA)
    precond_inv: Vec<T>,

    // CG workspace
    r: Vec<T>,
    d: Vec<T>,
    Kd: Vec<T>,
    Minv_r: Vec<T>,
    work_m: Vec<T>,

    // tolerance schedule state
    eps: T,
    res_prim_scaled: T,
    res_dual_scaled: T,
    eps_abs: T,
    max_cg_iter: usize,

    // keeps the process-wide backend context alive
    _context: BackendContextGuard,
}

impl<T> PcgKKTSolver<T>
where
    T: FloatT,
{
    pub fn new(P: &CscMatrix<T>, A: &CscMatrix<T>, rho_vec: &[T], settings: &CoreSettings<T>) -> Self {
        let n = P.ncols();
        let m = A.nrows();

        let max_cg_iter = if settings.cg_max_iter > 0 {
            settings.cg_max_iter as usize
        } else {
            usize::max(n, 20)
        };

        let mut solver = Self {
            n,
            P: P.clone(),
            A: A.clone(),
            rho_vec: rho_vec.to_vec(),
            σ: settings.sigma,
            precond_inv: vec![T::zero(); n],
            r: vec![T::zero(); n],
            d: vec![T::zero(); n],
            Kd: vec![T::zero(); n],
            Minv_r: vec![T::zero(); n],
            work_m: vec![T::zero(); m],
            eps: CG_EPS_MAX.as_T(),
            res_prim_scaled: T::infinity(),
            res_dual_scaled: T::infinity(),
            eps_abs: settings.cg_eps_abs,
            max_cg_iter,
            _context: BackendContextGuard::acquire(),
        };
        solver.update_preconditioner();
        solver
    }

    // M = diag(P + σI + AᵀRA), stored as its inverse.   Non-positive
    // diagonal entries are replaced by σ.
    fn update_preconditioner(&mut self) {
        let (P, A) = (&self.P, &self.A);

        for col in 0..self.n {
            let mut dii = self.σ;

            // diagonal of P: last triu entry in the column, when present
            let last = P.colptr[col + 1];
            if last > P.colptr[col] && P.rowval[last - 1] == col {
                dii += P.nzval[last - 1];
            }

            // diagonal of AᵀRA: columnwise ρ-weighted sum of squares
            for k in A.colptr[col]..A.colptr[col + 1] {
                dii += self.rho_vec[A.rowval[k]] * A.nzval[k] * A.nzval[k];
            }

            if dii <= T::zero() || !dii.is_finite() {
                dii = self.σ;
            }
            self.precond_inv[col] = T::recip(dii);
        }
    }

    // tolerance for this call, tightened as the outer residuals fall
    fn solve_tolerance(&mut self, norm_rhs: T) -> T {
        let outer = T::max(self.res_prim_scaled, self.res_dual_scaled);
        let denom = T::max(norm_rhs, T::epsilon());

        let cg_tol_fraction: T = CG_TOL_FRACTION.as_T();
        let candidate = T::min(CG_EPS_MAX.as_T(), cg_tol_fraction * outer / denom);
        self.eps = T::max(CG_EPS_MIN.as_T(), T::min(self.eps, candidate));

        self.eps * norm_rhs + self.eps_abs
    }
}

// out = (P + σI + AᵀRA)v.   Free function so that workspace and data
// can be borrowed from disjoint solver fields.
fn _apply_operator<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    rho_vec: &[T],
    σ: T,
    work_m: &mut [T],
    out: &mut [T],
    v: &[T],
) {
    // work_m = R(Av)
    A.gemv(work_m, v, T::one(), T::zero());
    work_m.hadamard(rho_vec);

    // out = Aᵀwork_m + Pv + σv
    A.t().gemv(out, work_m, T::one(), T::zero());
    P.sym().symv(out, v, T::one(), T::one());
    zip(out, v).for_each(|(o, &v)| *o += σ * v);
}

impl<T> HasLinearSolverInfo for PcgKKTSolver<T> {
    fn linear_solver_info(&self) -> LinearSolverInfo {
        LinearSolverInfo {
            name: "pcg".to_string(),
            direct: false,
        }
    }
}

impl<T> KKTSolver<T> for PcgKKTSolver<T>
where
    T: FloatT,
{
    fn solve(&mut self, rhs: &[T], lhs: &mut [T]) -> bool {
        assert_eq!(rhs.len(), self.n);
        assert_eq!(lhs.len(), self.n);

        let tol = self.solve_tolerance(rhs.norm());

        // r = rhs - K*lhs, warm started from the previous solution
        _apply_operator(
            &self.P, &self.A, &self.rho_vec, self.σ, &mut self.work_m, &mut self.Kd, lhs,
        );
        self.r.waxpby(T::one(), rhs, -T::one(), &self.Kd);

        if self.r.norm() <= tol {
            return true;
        }

        // d = M⁻¹r
        self.Minv_r.copy_from(&self.r);
        self.Minv_r.hadamard(&self.precond_inv);
        self.d.copy_from(&self.Minv_r);

        let mut rMr = self.r.dot(&self.Minv_r);

        for _ in 0..self.max_cg_iter {
            _apply_operator(
                &self.P,
                &self.A,
                &self.rho_vec,
                self.σ,
                &mut self.work_m,
                &mut self.Kd,
                &self.d,
            );

            let dKd = self.d.dot(&self.Kd);
            if dKd <= T::zero() || !dKd.is_finite() {
                // operator is not behaving as SPD
                return false;
            }

            let α = rMr / dKd;
            lhs.axpby(α, &self.d, T::one());
            self.r.axpby(-α, &self.Kd, T::one());

            if self.r.norm() <= tol {
                return true;
            }

            self.Minv_r.copy_from(&self.r);
            self.Minv_r.hadamard(&self.precond_inv);

            let rMr_new = self.r.dot(&self.Minv_r);
            let β = rMr_new / rMr;
            rMr = rMr_new;

            // d = M⁻¹r + βd
            self.d.axpby(T::one(), &self.Minv_r, β);
        }

        // iteration cap exhausted without convergence
        false
    }

    fn update_rho(&mut self, rho_vec: &[T]) {
        self.rho_vec.copy_from(rho_vec);
        self.update_preconditioner();
    }

    fn update_matrices(&mut self, P: &CscMatrix<T>, A: &CscMatrix<T>) {
        self.P.nzval.copy_from(&P.nzval);
        self.A.nzval.copy_from(&A.nzval);
        self.update_preconditioner();
    }

    fn update_tolerances(&mut self, res_prim_scaled: T, res_dual_scaled: T) {
        self.res_prim_scaled = res_prim_scaled;
        self.res_dual_scaled = res_dual_scaled;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::core::CoreSettings;

    #[test]
    fn test_pcg_small_spd() {
        // P = [4 1; 1 2] triu, A = I, ρ = 1, σ = 1e-6
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
        let A = CscMatrix::identity(2);
        let rho_vec = vec![1., 1.];

        let settings = CoreSettings::<f64>::default();
        let mut pcg = PcgKKTSolver::new(&P, &A, &rho_vec, &settings);

        // force a tight inner tolerance
        pcg.update_tolerances(1e-12, 1e-12);

        let rhs = vec![1., 1.];
        let mut x = vec![0., 0.];
        assert!(pcg.solve(&rhs, &mut x));

        // K = P + σI + I ≈ [5 1; 1 3]; K⁻¹[1;1] = [1/7; 2/7]
        assert!((x[0] - 1. / 7.).abs() < 1e-6);
        assert!((x[1] - 2. / 7.).abs() < 1e-6);
    }

    #[test]
    fn test_pcg_sigma_only_system() {
        // P with no entries and an empty A: the operator reduces to σI
        // and the preconditioner must not divide by zero
        let P = CscMatrix::new(1, 1, vec![0, 0], vec![], vec![]);
        let A = CscMatrix::spalloc(0, 1, 0);
        let rho_vec: Vec<f64> = vec![];

        let settings = CoreSettings::<f64>::default();
        let mut pcg = PcgKKTSolver::new(&P, &A, &rho_vec, &settings);
        pcg.update_tolerances(1e-12, 1e-12);

        let rhs = vec![2e-6];
        let mut x = vec![0.];
        assert!(pcg.solve(&rhs, &mut x));

        // system is just σx = b
        assert!((x[0] - 2.).abs() < 1e-6);
    }
}
