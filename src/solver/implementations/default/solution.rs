use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::Solution, PolishStatus, SolverStatus};

// ---------------
// Solution type for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Solution`](crate::solver::core::traits::Solution) trait
#[derive(Debug)]
pub struct DefaultSolution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// dual solution
    pub y: Vec<T>,
    /// final solver status
    pub status: SolverStatus,
    /// objective value (NaN when infeasible)
    pub obj_val: T,
    /// primal residual
    pub r_prim: T,
    /// dual residual
    pub r_dual: T,
    /// number of iterations
    pub iterations: u32,
    /// number of accepted ρ updates
    pub rho_updates: u32,
    /// outcome of solution polishing
    pub polish_status: PolishStatus,
    /// solve time in seconds, setup and polish included
    pub run_time: f64,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    /// Create a new `DefaultSolution` object
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            r_prim: T::nan(),
            r_dual: T::nan(),
            iterations: 0,
            rho_updates: 0,
            polish_status: PolishStatus::NotPerformed,
            run_time: 0f64,
        }
    }
}

impl<T> Solution<T> for DefaultSolution<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type I = DefaultInfo<T>;

    fn post_process(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &mut DefaultVariables<T>,
        info: &DefaultInfo<T>,
    ) {
        self.status = info.status;
        self.iterations = info.iterations;
        self.rho_updates = info.rho_updates;
        self.polish_status = info.polish_status;
        self.r_prim = info.res_prim;
        self.r_dual = info.res_dual;
        self.run_time = info.run_time;

        if info.status.is_infeasible() {
            self.obj_val = T::nan();
        } else {
            self.obj_val = info.obj_val;
        }

        // back the equilibration out of the internal iterate
        self.x.copy_from(&variables.x);
        self.y.copy_from(&variables.y);
        data.equilibration
            .unscale_solution(&mut self.x, &mut self.y);
    }
}
