#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

fn good_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::identity(2);
    let q = vec![1., 1.];
    let A = CscMatrix::identity(2);
    let l = vec![0., 0.];
    let u = vec![1., 1.];
    (P, q, A, l, u)
}

#[test]
fn test_accepts_valid_problem() {
    let (P, q, A, l, u) = good_data();
    assert!(DefaultSolver::new(&P, &q, &A, &l, &u, DefaultSettings::default()).is_ok());
}

#[test]
fn test_rejects_empty_problem() {
    let P = CscMatrix::<f64>::spalloc(0, 0, 0);
    let A = CscMatrix::<f64>::spalloc(0, 0, 0);
    let (q, l, u): (Vec<f64>, Vec<f64>, Vec<f64>) = (vec![], vec![], vec![]);
    assert!(DefaultSolver::new(&P, &q, &A, &l, &u, DefaultSettings::default()).is_err());
}

#[test]
fn test_rejects_dimension_mismatches() {
    let (P, q, A, l, u) = good_data();

    // q of wrong length
    let bad_q = vec![1.];
    assert!(DefaultSolver::new(&P, &bad_q, &A, &l, &u, DefaultSettings::default()).is_err());

    // bounds of wrong length
    let bad_l = vec![0.];
    assert!(DefaultSolver::new(&P, &q, &A, &bad_l, &u, DefaultSettings::default()).is_err());

    // A with wrong column count
    let bad_A = CscMatrix::<f64>::identity(3);
    assert!(DefaultSolver::new(&P, &q, &bad_A, &l, &u, DefaultSettings::default()).is_err());

    // non-square P
    let bad_P = CscMatrix::<f64>::spalloc(3, 2, 0);
    assert!(DefaultSolver::new(&bad_P, &q, &A, &l, &u, DefaultSettings::default()).is_err());
}

#[test]
fn test_rejects_bad_values() {
    let (P, q, A, l, u) = good_data();

    // non-finite matrix entries
    let mut bad_P = P.clone();
    bad_P.nzval[0] = f64::NAN;
    assert!(DefaultSolver::new(&bad_P, &q, &A, &l, &u, DefaultSettings::default()).is_err());

    let mut bad_A = A.clone();
    bad_A.nzval[0] = f64::INFINITY;
    assert!(DefaultSolver::new(&P, &q, &bad_A, &l, &u, DefaultSettings::default()).is_err());

    // crossing bounds
    let bad_l = vec![2., 0.];
    assert!(DefaultSolver::new(&P, &q, &A, &bad_l, &u, DefaultSettings::default()).is_err());
}

#[test]
fn test_rejects_bad_settings() {
    let (P, q, A, l, u) = good_data();

    let mut settings = DefaultSettings::default();
    settings.alpha = 2.5;
    assert!(DefaultSolver::new(&P, &q, &A, &l, &u, settings).is_err());

    let mut settings = DefaultSettings::default();
    settings.sigma = 0.;
    assert!(DefaultSolver::new(&P, &q, &A, &l, &u, settings).is_err());
}

#[test]
fn test_full_symmetric_P_is_reduced() {
    // P supplied in full symmetric storage gives the same result as
    // its upper triangle
    let Pfull = CscMatrix::from(&[
        [4., 1.], //
        [1., 2.], //
    ]);
    let Ptriu = Pfull.to_triu();
    let (_, q, A, l, u) = good_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-8)
        .eps_rel(1e-8)
        .build()
        .unwrap();

    let mut s1 = DefaultSolver::new(&Pfull, &q, &A, &l, &u, settings.clone()).unwrap();
    assert!(s1.data.P.is_triu());
    s1.solve();

    let mut s2 = DefaultSolver::new(&Ptriu, &q, &A, &l, &u, settings).unwrap();
    s2.solve();

    assert!(s1.solution.x.dist(&s2.solution.x) <= 1e-10);
}

#[test]
fn test_solver_is_reusable_after_terminal_states() {
    let (P, q, A, l, u) = good_data();

    let settings = DefaultSettingsBuilder::default()
        .max_iter(1)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    solver.solve();
    let first = solver.solution.status;
    assert!(matches!(
        first,
        SolverStatus::MaxIterations | SolverStatus::SolvedInaccurate
    ));

    // raise the limit and run again on the same engine
    let mut s2 = solver.settings.clone();
    s2.max_iter = 4000;
    solver.update_settings(s2).unwrap();
    solver.solve();
    assert!(solver.solution.status.is_solved());
}
