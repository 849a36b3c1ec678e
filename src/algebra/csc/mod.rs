mod assembly;
mod core;
mod matrix_math;

pub use self::core::*;
