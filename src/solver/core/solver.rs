use super::callbacks::{Callback, SolverCallbacks, TerminationCallbackFn};
use super::traits::*;
use crate::timers::*;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of the solver at termination.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// The solver has not run, or was stopped before the first
    /// termination check
    #[default]
    Unsolved,
    /// Solved to the requested tolerances
    Solved,
    /// Solved to within 10x of the requested tolerances at the
    /// iteration or time limit
    SolvedInaccurate,
    /// A primal infeasibility certificate was found
    PrimalInfeasible,
    /// A primal infeasibility certificate was found at relaxed tolerance
    PrimalInfeasibleInaccurate,
    /// A dual infeasibility certificate was found
    DualInfeasible,
    /// A dual infeasibility certificate was found at relaxed tolerance
    DualInfeasibleInaccurate,
    /// The iteration limit was reached
    MaxIterations,
    /// The time limit was reached
    MaxTime,
    /// The solve was abandoned on a numerical failure
    NumericalError,
    /// The solve was interrupted by a termination callback
    Interrupted,
}

impl SolverStatus {
    /// `true` when the status carries an infeasibility certificate
    pub fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible
                | SolverStatus::PrimalInfeasibleInaccurate
                | SolverStatus::DualInfeasible
                | SolverStatus::DualInfeasibleInaccurate
        )
    }

    /// `true` for `Solved` or `SolvedInaccurate`
    pub fn is_solved(&self) -> bool {
        matches!(
            *self,
            SolverStatus::Solved | SolverStatus::SolvedInaccurate
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of the solution polishing step.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolishStatus {
    /// Polishing disabled, or the solver did not reach `Solved`
    #[default]
    NotPerformed,
    /// The polished iterate was committed
    Successful,
    /// The polished iterate was rejected and the original kept
    Unsuccessful,
}

// first candidate iteration for a ρ update when
// adaptive_rho_interval is left at its automatic setting
const ADAPTIVE_RHO_FIRST_CHECK: u32 = 25;

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Generic solver container, collecting the problem data, iterate
/// state, linear subproblem solver, polisher and progress information
/// for a problem format.
pub struct Solver<D, V, R, K, P, I, SO, SE> {
    pub data: D,
    pub variables: V,
    pub residuals: R,
    pub kktsystem: K,
    pub polisher: P,
    pub prev_vars: V,
    pub info: I,
    pub solution: SO,
    pub settings: SE,
    pub timers: Option<Timers>,
    pub(crate) callbacks: SolverCallbacks<I>,
}

impl<D, V, R, K, P, I, SO, SE> Solver<D, V, R, K, P, I, SO, SE> {
    /// Set a callback polled at the top of every iteration.   Returning
    /// `true` interrupts the solve with status
    /// [`Interrupted`](SolverStatus::Interrupted).
    pub fn set_termination_callback(&mut self, f: impl TerminationCallbackFn<I> + 'static) {
        self.callbacks.termination_callback = Callback::Rust(Box::new(f));
    }

    /// Remove a previously set termination callback.
    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }
}

fn _print_banner(is_verbose: bool) -> std::io::Result<()> {
    use std::io::Write;

    if !is_verbose {
        return Ok(());
    }
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let mut out = std::io::stdout();
    writeln!(
        out,
        "-------------------------------------------------------------"
    )?;
    writeln!(
        out,
        "           splitqp v{}  -  operator splitting QP solver",
        VERSION
    )?;
    writeln!(
        out,
        "-------------------------------------------------------------"
    )
}

// ---------------------------------
// ADMMSolver trait and its standard implementation.
// ---------------------------------

/// Driver trait for the ADMM iteration.   Implemented generically for
/// any compatible collection of types in a [`Solver`] container.
pub trait ADMMSolver<T, D, V, R, K, P, I, SO, SE> {
    /// Run the solver to a terminal status.
    fn solve(&mut self);
}

impl<T, D, V, R, K, P, I, SO, SE> ADMMSolver<T, D, V, R, K, P, I, SO, SE>
    for Solver<D, V, R, K, P, I, SO, SE>
where
    T: crate::algebra::FloatT,
    D: ProblemData<T, SE = SE>,
    V: Variables<T, D = D, SE = SE>,
    R: Residuals<T, D = D, V = V>,
    K: KKTSystem<T, D = D, V = V, SE = SE>,
    P: Polisher<T, D = D, V = V, I = I, SE = SE>,
    I: Info<T, D = D, V = V, R = R, SE = SE>,
    SO: Solution<T, D = D, V = V, I = I>,
    SE: Settings<T>,
{
    fn solve(&mut self) {
        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap();

        self.info.reset(&mut timers);

        notimeit! {timers; {
            _print_banner(self.settings.core().verbose).ok();
            self.info.print_configuration(&self.settings, &self.data).ok();
            self.info.print_status_header(&self.settings).ok();
        }}

        let max_iter = self.settings.core().max_iter;
        let α = self.settings.core().alpha;
        let time_limit = self.settings.core().time_limit;
        let check_stride = std::cmp::max(1, self.settings.core().check_termination);
        let adaptive_rho = self.settings.core().adaptive_rho;
        let rho_interval = self.settings.core().adaptive_rho_interval;
        let rho_tolerance = self.settings.core().adaptive_rho_tolerance;

        // first candidate iteration for a ρ update
        let mut next_rho_check = if rho_interval > 0 {
            rho_interval
        } else {
            ADAPTIVE_RHO_FIRST_CHECK
        };

        timeit! {timers => "solve"; {

        // cold start the iterate unless warm starting was requested
        if !self.settings.core().warm_start {
            self.variables.reset();
        }
        self.prev_vars.copy_from(&self.variables);

        // ----------
        // main loop
        // ----------

        for iter in 1..=max_iter {

            // cooperative cancellation and the wall clock limit are
            // polled at the top of each iteration
            if self.callbacks.check_termination(&self.info) {
                self.info.set_status(SolverStatus::Interrupted);
                break;
            }
            if timers.read("solve").as_secs_f64() > time_limit {
                self.info.set_status(SolverStatus::MaxTime);
                break;
            }

            // one ADMM step
            // --------------
            self.variables.shift_prev();

            if !self
                .kktsystem
                .solve(&mut self.variables, &self.data, &self.settings)
            {
                self.info.set_status(SolverStatus::NumericalError);
                break;
            }

            self.variables.over_relax_x(α);
            self.variables.project_z(&self.data, α);
            self.variables.update_y(α);

            // residual checks and ρ updates sit between full
            // iterations, never mid-step
            // --------------
            if iter % check_stride != 0 && iter != max_iter {
                continue;
            }

            self.variables.save_deltas(&self.prev_vars);
            self.residuals.update(&self.variables, &self.data);
            self.info
                .update(&mut self.data, &self.variables, &self.residuals, &timers);

            let isdone = self.info.check_termination(
                &self.data,
                &self.variables,
                &self.residuals,
                &self.settings,
                iter,
            );

            notimeit! {timers; {
                self.info.print_status(&self.settings).ok();
            }}

            self.prev_vars.copy_from(&self.variables);

            if isdone {
                break;
            }

            // feed the residual trajectory to the linear solver so
            // that iterative backends can tighten their tolerances
            let (rp, rd) = self.info.scaled_residuals();
            self.kktsystem.update_tolerances(rp, rd);

            // adaptive ρ
            // --------------
            if adaptive_rho && iter >= next_rho_check {
                let ρ = self.variables.rho();
                let ρ_new = self.info.rho_estimate();

                if ρ_new > ρ * rho_tolerance || ρ_new < ρ / rho_tolerance {
                    self.variables
                        .update_rho_vec(ρ_new, &self.data, &self.settings);
                    self.kktsystem.update_rho(&self.variables);
                    self.info.save_rho_update();

                    if rho_interval == 0 {
                        // iteration count heuristic: back off after
                        // each accepted update
                        next_rho_check = iter.saturating_mul(2);
                    }
                }
                if rho_interval > 0 {
                    next_rho_check = iter + rho_interval;
                }
            }
        } //end loop
        // ----------
        // ----------

        }} // end "solve" timer

        // early exits bypass the periodic residual computation, so
        // refresh it for the iterate we are about to report
        let status = self.info.get_status();
        if matches!(status, SolverStatus::Interrupted | SolverStatus::MaxTime) {
            self.residuals.update(&self.variables, &self.data);
            self.info
                .update(&mut self.data, &self.variables, &self.residuals, &timers);
        }

        // polish only a solution reported as solved to full accuracy
        if self.settings.core().polishing && self.info.get_status() == SolverStatus::Solved {
            timeit! {timers => "polish"; {
                self.polisher
                    .polish(&self.data, &mut self.variables, &mut self.info, &self.settings);
            }}
        }

        // final status classification (inaccurate convergence at the
        // iteration or time limits) and timing capture
        self.info.finalize(
            &self.data,
            &self.variables,
            &self.residuals,
            &self.settings,
            &mut timers,
        );

        //store the final solution
        self.solution
            .post_process(&self.data, &mut self.variables, &self.info);

        notimeit! {timers; {
            self.info.print_footer(&self.settings).ok();
        }}

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);
    }
}
