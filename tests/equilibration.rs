#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

// a deliberately badly scaled problem
#[allow(clippy::type_complexity)]
fn badly_scaled_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::from(&[
        [4e4, 0.],   //
        [0., 2e-3],  //
    ]);
    let q = vec![1e3, -1e-2];
    let A = CscMatrix::from(&[
        [1e2, 0.],  //
        [0., 1e-2], //
    ]);
    let l = vec![-1e2, -1.];
    let u = vec![1e2, 1.];

    (P, q, A, l, u)
}

#[test]
fn test_solutions_agree_with_and_without_scaling() {
    let (P, q, A, l, u) = badly_scaled_data();

    let scaled_settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .scaling(10)
        .build()
        .unwrap();
    let unscaled_settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-7)
        .eps_rel(1e-7)
        .scaling(0)
        .max_iter(200000)
        .build()
        .unwrap();

    let mut scaled = DefaultSolver::new(&P, &q, &A, &l, &u, scaled_settings).unwrap();
    scaled.solve();

    let mut unscaled = DefaultSolver::new(&P, &q, &A, &l, &u, unscaled_settings).unwrap();
    unscaled.solve();

    assert_eq!(scaled.solution.status, SolverStatus::Solved);
    assert_eq!(unscaled.solution.status, SolverStatus::Solved);

    // both runs report residuals on the unscaled problem, so the
    // solutions must agree
    assert!(scaled.solution.x.dist(&unscaled.solution.x) <= 1e-3);
    assert!(
        (scaled.solution.obj_val - unscaled.solution.obj_val).abs()
            <= 1e-5 * unscaled.solution.obj_val.abs().max(1.)
    );
}

#[test]
fn test_reported_residuals_are_unscaled() {
    // verify the solved residual bound of the returned iterate by
    // recomputing ‖Ax − z‖∞ ≤ ‖Ax − Π(Ax)‖∞ on the raw data
    let (P, q, A, l, u) = badly_scaled_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let x = &solver.solution.x;

    // Ax on the raw data
    let mut Ax = vec![0.; 2];
    for col in 0..A.n {
        for idx in A.colptr[col]..A.colptr[col + 1] {
            Ax[A.rowval[idx]] += A.nzval[idx] * x[col];
        }
    }

    let viol = Ax
        .iter()
        .zip(l.iter().zip(u.iter()))
        .fold(0f64, |acc, (&ax, (&l, &u))| {
            acc.max((ax - ax.clamp(l, u)).abs())
        });

    assert!(viol <= solver.solution.r_prim + 1e-12);
}

#[test]
fn test_bound_infinity_handling() {
    // entries beyond the module infinity bound act as infinite
    let P = CscMatrix::identity(2);
    let q = vec![1., 1.];
    let A = CscMatrix::identity(2);
    let l = vec![-1e30, -1.];
    let u = vec![1e30, 1.];

    let settings = DefaultSettings::<f64>::default();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    // the unconstrained coordinate settles at −q₁
    assert!((solver.solution.x[0] + 1.).abs() <= 1e-2);
}
