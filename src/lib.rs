//! __splitqp__ : an operator-splitting solver for convex quadratic programs.
//!
//! splitqp solves problems of the form
//!
//! ```text
//! minimize    ½ xᵀPx + qᵀx
//! subject to  lA ≤ Ax ≤ uA
//! ```
//!
//! with P symmetric positive semidefinite and P, A sparse.  The solver
//! is based on the alternating direction method of multipliers (ADMM),
//! with the per-iteration linear system solved matrix-free by
//! preconditioned conjugate gradients.   It is warm-startable and
//! suitable for embedded and control-style workloads: after setup,
//! problem data can be updated in place and the problem re-solved
//! without new structural allocations.
//!
//! Users interact with the crate through [`DefaultSolver`](crate::solver::DefaultSolver)
//! and supply matrix data in [`CscMatrix`](crate::algebra::CscMatrix) format.

// Greek characters are used for mathematical notation
#![allow(confusable_idents)]

pub mod algebra;
pub mod solver;
pub mod timers;
