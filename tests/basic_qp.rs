#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn basic_qp_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // P = [4. 1; 1 2]
    let P = CscMatrix::new(
        2,                    // m
        2,                    // n
        vec![0, 2, 4],        // colptr
        vec![0, 1, 0, 1],     // rowval
        vec![4., 1., 1., 2.], // nzval
    );

    // x1 + x2 = 1, 0 ≤ x1 ≤ 0.7, 0 ≤ x2 ≤ 0.7
    let A = CscMatrix::from(&[
        [1., 1.], //
        [1., 0.], //
        [0., 1.], //
    ]);

    let q = vec![1., 1.];
    let l = vec![1., 0., 0.];
    let u = vec![1., 0.7, 0.7];

    (P, q, A, l, u)
}

#[test]
fn test_qp_univariate() {
    // minimize ½(2)x² − 2x, unconstrained → x = 1
    let P = CscMatrix::from(&[[2.]]);
    let q = vec![-2.];
    let A = CscMatrix::spalloc(0, 1, 0);
    let (l, u): (Vec<f64>, Vec<f64>) = (vec![], vec![]);

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-8)
        .eps_rel(1e-8)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(f64::abs(solver.solution.x[0] - 1.) <= 1e-7);
    assert_eq!(solver.solution.r_prim, 0.);
    assert!(solver.solution.r_dual <= 1e-7);
    assert!(f64::abs(solver.solution.obj_val - (-1.)) <= 1e-7);
}

#[test]
fn test_qp_feasible() {
    let (P, q, A, l, u) = basic_qp_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![0.3, 0.7];
    assert!(solver.solution.x.dist(&refsol) <= 1e-4);

    let refobj = 1.88;
    assert!(f64::abs(solver.solution.obj_val - refobj) <= 1e-4);

    // residuals reported against the unscaled problem
    assert!(solver.solution.r_prim <= 1e-6 + 1e-6 * 1.0_f64.max(1.0));
    assert!(solver.solution.r_dual.is_finite());
}

#[test]
fn test_qp_box_only() {
    // A = I box problem: solution is the clipped unconstrained optimum
    let P = CscMatrix::from(&[
        [1., 0.], //
        [0., 1.], //
    ]);
    let q = vec![0., 0.];
    let A = CscMatrix::identity(2);
    let l = vec![1., 1.];
    let u = vec![2., 2.];

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&vec![1., 1.]) <= 1e-4);
    assert!(solver.solution.y.dist(&vec![-1., -1.]) <= 1e-3);
    assert!(f64::abs(solver.solution.obj_val - 1.) <= 1e-4);
}

#[test]
fn test_qp_equality_constrained() {
    // minimize ½‖x‖² − x1  s.t.  x1 + x2 = 1 → x = (1, 0), y = (1)?
    let P = CscMatrix::identity(2);
    let q = vec![-1., 0.];
    let A = CscMatrix::from(&[[1., 1.]]);
    let l = vec![1.];
    let u = vec![1.];

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-8)
        .eps_rel(1e-8)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(solver.solution.x.dist(&vec![1., 0.]) <= 1e-5);
    assert!(f64::abs(solver.solution.obj_val - (-0.5)) <= 1e-5);
}

#[test]
fn test_qp_max_iter_limit() {
    let (P, q, A, l, u) = basic_qp_data();

    let settings = DefaultSettingsBuilder::default()
        .max_iter(1)
        .check_termination(1)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();

    assert!(matches!(
        solver.solution.status,
        SolverStatus::MaxIterations | SolverStatus::SolvedInaccurate
    ));
    assert!(solver.solution.r_prim.is_finite());
    assert!(solver.solution.r_dual.is_finite());
}

#[test]
fn test_qp_objective_against_reference() {
    // P = [4 1; 1 2], q = [1; 1], x ∈ simplex-ish box.   Reference
    // objective from an exact active-set solve.
    let (P, q, A, l, u) = basic_qp_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .adaptive_rho(true)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    // KKT optimality of the returned pair on the original data:
    // ‖Px + q + Aᵀy‖ small
    let (x, y) = (&solver.solution.x, &solver.solution.y);
    let mut kkt = q.clone();
    P.sym_test_mul(&mut kkt, x);
    A.t_test_mul(&mut kkt, y);
    assert!(kkt.norm_inf() <= 1e-4);
}

// small helpers so the test can form P*x + q + A'*y without
// touching solver internals
trait TestMul {
    fn sym_test_mul(&self, acc: &mut [f64], x: &[f64]);
    fn t_test_mul(&self, acc: &mut [f64], y: &[f64]);
}

impl TestMul for CscMatrix<f64> {
    // acc += sym(self)*x, with self in either triu or full storage
    fn sym_test_mul(&self, acc: &mut [f64], x: &[f64]) {
        let P = if self.is_triu() {
            self.clone()
        } else {
            self.to_triu()
        };
        for col in 0..P.n {
            for idx in P.colptr[col]..P.colptr[col + 1] {
                let row = P.rowval[idx];
                acc[row] += P.nzval[idx] * x[col];
                if row != col {
                    acc[col] += P.nzval[idx] * x[row];
                }
            }
        }
    }

    // acc += selfᵀ*y
    fn t_test_mul(&self, acc: &mut [f64], y: &[f64]) {
        for col in 0..self.n {
            for idx in self.colptr[col]..self.colptr[col + 1] {
                acc[col] += self.nzval[idx] * y[self.rowval[idx]];
            }
        }
    }
}
