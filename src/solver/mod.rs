// internal module structure
pub(crate) mod core;
pub(crate) mod implementations;
pub mod utils;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

//user facing traits and types required to interact with the solver
pub use crate::solver::core::{
    ADMMSolver, PolishStatus, SolverError, SolverStatus, TerminationCallbackFn,
};

//user facing traits required to define new implementations
pub use crate::solver::core::traits;

//the infinity bound applied to user data
pub use crate::solver::utils::infbounds::{default_infinity, get_infinity, set_infinity};

//If we had implementations for multiple alternative problem
//formats, they would each live under implementations.   Since
//we only have default, it is exposed at the top level instead.
pub use crate::solver::implementations::default::*;
