#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::ProblemData, traits::Variables, Solver, SolverError};
use crate::timers::*;

/// Solver for problems in standard QP form

pub type DefaultSolver<T = f64> = Solver<
    DefaultProblemData<T>,
    DefaultVariables<T>,
    DefaultResiduals<T>,
    DefaultKKTSystem<T>,
    DefaultPolisher<T>,
    DefaultInfo<T>,
    DefaultSolution<T>,
    DefaultSettings<T>,
>;

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Create a solver for the problem
    ///
    /// ```text
    /// minimize    ½ xᵀPx + qᵀx
    /// subject to  l ≤ Ax ≤ u
    /// ```
    ///
    /// `P` may be supplied in full symmetric or upper triangular form
    /// and is reduced internally to its upper triangle.   This is the
    /// only function that allocates problem-sized storage; subsequent
    /// data updates and solves reuse it.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        l: &[T],
        u: &[T],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        settings
            .validate()
            .map_err(SolverError::BadSettings)?;

        _check_problem(P, q, A, l, u)?;

        // polishing solves an equality constrained subproblem, so
        // there is nothing to do for an unconstrained problem
        let mut settings = settings;
        if A.nrows() == 0 {
            settings.polishing = false;
        }

        let mut timers = Timers::default();
        let output;

        timeit! {timers => "setup"; {

        let mut data = DefaultProblemData::<T>::new(P, q, A, l, u);
        let (n, m) = (data.n, data.m);

        // equilibrate problem data immediately on setup.
        // this prevents multiple equilibrations if solve
        // is called more than once.
        timeit!{timers => "equilibration"; {
            data.equilibrate(&settings);
        }}

        let mut variables = DefaultVariables::<T>::new(n, m);
        variables.update_rho_vec(settings.rho, &data, &settings);

        let residuals = DefaultResiduals::<T>::new(n, m);

        let kktsystem;
        timeit!{timers => "kktinit"; {
            kktsystem = DefaultKKTSystem::<T>::new(&data, &variables, &settings);
        }}

        let polisher = DefaultPolisher::<T>::new(m);

        // holds the iterate of the previous termination check, for
        // the infeasibility delta window
        let prev_vars = DefaultVariables::<T>::new(n, m);

        let info = DefaultInfo::<T>::new();

        // user facing results go here
        let solution = DefaultSolution::<T>::new(n, m);

        output = Self {
            data,
            variables,
            residuals,
            kktsystem,
            polisher,
            prev_vars,
            info,
            solution,
            settings,
            timers: None,
            callbacks: Default::default(),
        };

        }} //end "setup" timer

        //now that the timer is finished we can swap our
        //timer object into the solver structure
        let mut output = output;
        output.timers.replace(timers);

        Ok(output)
    }
}

fn _check_problem<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    l: &[T],
    u: &[T],
) -> Result<(), SolverError> {
    let n = q.len();
    let m = l.len();

    if n == 0 {
        return Err(SolverError::BadProblemData("number of variables must be positive"));
    }

    P.check_format()?;
    A.check_format()?;

    if !P.is_square() || P.ncols() != n {
        return Err(SolverError::BadProblemData("P and q incompatible dimensions"));
    }
    if A.ncols() != n {
        return Err(SolverError::BadProblemData("A and q incompatible dimensions"));
    }
    if A.nrows() != m || u.len() != m {
        return Err(SolverError::BadProblemData(
            "A and bound vectors incompatible dimensions",
        ));
    }

    if !P.nzval.is_finite() {
        return Err(SolverError::BadProblemData("non-finite entries in P"));
    }
    if !A.nzval.is_finite() {
        return Err(SolverError::BadProblemData("non-finite entries in A"));
    }
    if !q.is_finite() {
        return Err(SolverError::BadProblemData("non-finite entries in q"));
    }

    let infbound: T = crate::solver::get_infinity().as_T();
    for (&li, &ui) in std::iter::zip(l, u) {
        if li.is_nan() || ui.is_nan() {
            return Err(SolverError::BadProblemData("NaN entries in the bounds"));
        }
        if li > ui {
            return Err(SolverError::BadProblemData("lower bound exceeds upper bound"));
        }
        if li >= infbound || ui <= -infbound {
            return Err(SolverError::BadProblemData(
                "a bound places the constraint interval at infinity",
            ));
        }
    }

    Ok(())
}
