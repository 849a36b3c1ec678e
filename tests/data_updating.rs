#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn updating_test_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<f64>,
    DefaultSettings<f64>,
) {
    // huge values to ensure the equilibration scaling term is small
    // and carries through the updates
    let P = CscMatrix::from(&[
        [40000., 1.],     //
        [1., 20000.],     //
    ]);
    let q = vec![10000.; 2];

    let A = CscMatrix::identity(2);
    let l = vec![-1.; 2];
    let u = vec![1.; 2];

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-8)
        .eps_rel(1e-8)
        .build()
        .unwrap();

    (P, q, A, l, u, settings)
}

#[test]
fn test_update_q() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    // change q and re-solve
    let q2 = vec![500., -1000.];
    assert!(solver1.update_q(&q2).is_ok());
    solver1.solve();

    // fresh solver sees the same problem
    let mut solver2 = DefaultSolver::new(&P, &q2, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert_eq!(solver1.solution.status, SolverStatus::Solved);
    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);
}

#[test]
fn test_update_P_vector_form() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    // overwrite the triu values of P
    let mut P2 = P.to_triu();
    P2.nzval[0] = 100.;

    assert!(solver1.update_P(&P2.nzval).is_ok());
    solver1.solve();

    let mut solver2 = DefaultSolver::new(&P2, &q, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);
}

#[test]
fn test_update_P_matrix_form() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut P2 = P.to_triu();
    P2.nzval[0] = 100.;

    assert!(solver1.update_P(&P2).is_ok());
    solver1.solve();

    let mut solver2 = DefaultSolver::new(&P2, &q, &A, &l, &u, settings).unwrap();
    solver2.solve();

    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);
}

#[test]
fn test_update_P_pattern_mismatch() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    // wrong number of values for the stored triu pattern
    let bad = vec![1., 2.];
    assert!(solver.update_P(&bad).is_err());

    // different sparsity pattern in matrix form
    let P2 = CscMatrix::<f64>::identity(2);
    assert!(solver.update_P(&P2).is_err());
}

#[test]
fn test_update_A() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let mut A2 = A.clone();
    A2.nzval[0] = 2.;

    assert!(solver1.update_A(&A2).is_ok());
    solver1.solve();

    let mut solver2 = DefaultSolver::new(&P, &q, &A2, &l, &u, settings).unwrap();
    solver2.solve();

    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);
}

#[test]
fn test_update_bounds() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver1 = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    solver1.solve();

    let l2 = vec![0.5, -2.];
    let u2 = vec![2., 0.5];
    assert!(solver1.update_bounds(Some(&l2), Some(&u2)).is_ok());
    solver1.solve();

    let mut solver2 = DefaultSolver::new(&P, &q, &A, &l2, &u2, settings).unwrap();
    solver2.solve();

    assert!(solver1.solution.x.dist(&solver2.solution.x) <= 1e-5);

    // crossing bounds are rejected and leave the solver usable
    let bad_l = vec![1., 1.];
    let bad_u = vec![0., 0.];
    assert!(solver1.update_bounds(Some(&bad_l), Some(&bad_u)).is_err());
    solver1.solve();
    assert!(solver1.solution.status.is_solved());
}

#[test]
fn test_update_rho_and_settings() {
    let (P, q, A, l, u, settings) = updating_test_data();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();

    assert!(solver.update_rho(1.5).is_ok());
    assert!(solver.update_rho(-1.).is_err());

    // non-structural changes are accepted
    let mut s2 = settings.clone();
    s2.max_iter = 123;
    assert!(solver.update_settings(s2).is_ok());
    assert_eq!(solver.settings.max_iter, 123);

    // structural changes are rejected
    let mut s3 = settings.clone();
    s3.scaling = 0;
    assert!(solver.update_settings(s3).is_err());

    let mut s4 = settings;
    s4.rho = 7.;
    assert!(solver.update_settings(s4).is_err());

    solver.solve();
    assert!(solver.solution.status.is_solved());
}
