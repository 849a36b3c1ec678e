//! Solver implementation for the standard QP problem format
//!
//! ```text
//! minimize    ½ xᵀPx + qᵀx
//! subject to  lA ≤ Ax ≤ uA
//! ```

mod data_updating;
mod equilibration;
mod info;
mod info_print;
mod kktsystem;
mod polish;
mod problemdata;
mod residuals;
mod settings;
mod solution;
#[allow(clippy::module_inception)]
mod solver;
mod variables;

pub use data_updating::*;
pub use equilibration::*;
pub use info::*;
pub use kktsystem::*;
pub use polish::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use variables::*;
