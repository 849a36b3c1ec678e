#![allow(non_snake_case)]

use splitqp::{algebra::*, solver::*};

#[allow(clippy::type_complexity)]
fn warm_start_data() -> (CscMatrix<f64>, Vec<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>) {
    let P = CscMatrix::from(&[
        [6., 0.], //
        [0., 4.], //
    ]);
    let q = vec![-1., -4.];
    let A = CscMatrix::from(&[
        [1., -2.], //
        [1., 0.],  //
        [0., 1.],  //
    ]);
    let l = vec![0., -1., -1.];
    let u = vec![0., 1., 1.];

    (P, q, A, l, u)
}

#[test]
fn test_warm_start_from_solution() {
    let (P, q, A, l, u) = warm_start_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let cold_iters = solver.solution.iterations;
    let xsol = solver.solution.x.clone();
    let ysol = solver.solution.y.clone();

    // restart from the solution: the first residual check should
    // already pass
    solver.warm_start(Some(&xsol), Some(&ysol)).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    assert!(
        solver.solution.iterations <= cold_iters,
        "warm start took {} iterations vs cold {}",
        solver.solution.iterations,
        cold_iters
    );
    assert!(solver.solution.x.dist(&xsol) <= 1e-4);
}

#[test]
fn test_warm_start_dimension_checks() {
    let (P, q, A, l, u) = warm_start_data();
    let settings = DefaultSettings::default();
    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();

    assert!(solver.warm_start(Some(&[1., 2., 3.]), None).is_err());
    assert!(solver.warm_start(None, Some(&[1.])).is_err());
    assert!(solver.warm_start(Some(&[0.1, 0.2]), None).is_ok());
}

#[test]
fn test_warm_start_survives_bound_perturbation() {
    let (P, q, A, l, u) = warm_start_data();

    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-6)
        .eps_rel(1e-6)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.solve();
    let xsol = solver.solution.x.clone();
    let ysol = solver.solution.y.clone();

    // perturb the box slightly and restart from the previous solution
    let l2 = vec![0., -1.05, -1.05];
    let u2 = vec![0., 0.95, 0.95];
    solver.update_bounds(Some(&l2), Some(&u2)).unwrap();
    solver.warm_start(Some(&xsol), Some(&ysol)).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
}

#[test]
fn test_termination_callback_interrupts() {
    let (P, q, A, l, u) = warm_start_data();

    // ask for many iterations but interrupt immediately
    let settings = DefaultSettingsBuilder::default()
        .eps_abs(1e-12)
        .eps_rel(1e-12)
        .max_iter(100000)
        .build()
        .unwrap();

    let mut solver = DefaultSolver::new(&P, &q, &A, &l, &u, settings).unwrap();
    solver.set_termination_callback(|_info: &DefaultInfo<f64>| true);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Interrupted);
    assert!(solver.solution.r_prim.is_finite());

    // the callback can be removed again
    solver.unset_termination_callback();
    solver.solve();
    assert_ne!(solver.solution.status, SolverStatus::Interrupted);
}
