use crate::algebra::SparseFormatError;
use thiserror::Error;

pub(crate) mod callbacks;
pub mod kktsolvers;
mod solver;
pub mod traits;
pub use callbacks::TerminationCallbackFn;
pub use solver::*;

//The generic solver engine is written against the CoreSettings
//type.  Since we only have one problem format implementation,
//this is typedef'd to the default settings type.
pub type CoreSettings<T> = crate::solver::implementations::default::DefaultSettings<T>;

/// Error type returned by solver setup and by data updating operations.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Problem data failed validation
    #[error("invalid problem data: {0}")]
    BadProblemData(&'static str),
    /// Settings failed validation
    #[error("invalid settings: {0}")]
    BadSettings(String),
    /// Sparse matrix data was malformed or of the wrong pattern
    #[error(transparent)]
    SparseFormat(#[from] SparseFormatError),
}
