#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn polish_test_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    // P = [4 1; 1 2], equality row plus a box
    let P = CscMatrix::from(&[
        [4., 1.], //
        [1., 2.], //
    ]);
    let q = vec![1., 1.];
    let A = CscMatrix::from(&[
        [1., 1.], //
        [1., 0.], //
        [0., 1.], //
    ]);
    let l = vec![1., 0., 0.];
    let u = vec![1., 0.7, 0.7];

    (P, q, A, l, u)
}

#[test]
fn test_polish_improves_residuals() {
    let (P, q, A, l, u) = polish_test_data();

    // modest ADMM accuracy, then polish
    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-4)
        .eps_rel(1e-4)
        .polishing(true)
        .build()
        .unwrap();

    let mut polished = DefaultSolver::new(&P, &q, &A, &l, &u, settings.clone()).unwrap();
    polished.solve();

    assert_eq!(polished.solution.status, SolverStatus::Solved);

    // commit policy: residuals after a successful polish can not be
    // worse than the ADMM ones, so compare against an unpolished run
    let mut settings_plain = settings;
    settings_plain.polishing = false;
    let mut plain = DefaultSolver::new(&P, &q, &A, &l, &u, settings_plain).unwrap();
    plain.solve();

    assert!(polished.solution.r_prim <= plain.solution.r_prim);
    assert!(polished.solution.r_dual <= plain.solution.r_dual);

    if polished.solution.polish_status == PolishStatus::Successful {
        // the polished point is essentially the exact active-set
        // solution
        assert!(polished.solution.x.dist(&vec![0.3, 0.7]) <= 1e-7);
    }
}

#[test]
fn test_polish_on_equality_constrained_qp() {
    // pure equality QP: the active set is the whole constraint block,
    // so a successful polish recovers the exact KKT solution
    let P = CscMatrix::identity(2);
    let q = vec![-1., 0.];
    let A = CscMatrix::from(&[[1., 1.]]);
    let l = vec![1.];
    let u = vec![1.];

    let settings = DefaultSettingsBuilder::default()
        .polishing(true)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert_eq!(solver.solution.polish_status, PolishStatus::Successful);
    assert!(solver.solution.x.dist(&vec![1., 0.]) <= 1e-8);
    assert!(solver.solution.r_prim <= 1e-10);
}

#[test]
fn test_polish_disabled_without_constraints() {
    let P = CscMatrix::from(&[[2.]]);
    let q = vec![-2.];
    let A = CscMatrix::spalloc(0, 1, 0);
    let (l, u): (Vec<f64>, Vec<f64>) = (vec![], vec![]);

    let settings = DefaultSettingsBuilder::default()
        .polishing(true)
        .build()
        .unwrap();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert_eq!(solver.solution.polish_status, PolishStatus::NotPerformed);
}
