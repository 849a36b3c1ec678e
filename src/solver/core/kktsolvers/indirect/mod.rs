mod pcg;
pub use pcg::*;
