mod ldl;
pub(crate) use ldl::*;
