// ---------------------------------
// user termination callbacks
// ---------------------------------

/// Callback function for cooperative solver termination.
///
/// The callback is polled with the current progress information at the
/// top of every iteration.   Returning `true` interrupts the solve; the
/// current iterate is retained and the solver reports
/// [`Interrupted`](crate::solver::SolverStatus::Interrupted).
pub trait TerminationCallbackFn<I>: FnMut(&I) -> bool + Send {}
impl<I, F: FnMut(&I) -> bool + Send> TerminationCallbackFn<I> for F {}

#[derive(Default)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(Box<dyn TerminationCallbackFn<I>>),
}

impl<I> std::fmt::Debug for Callback<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::None => write!(f, "Callback::None"),
            Callback::Rust(_) => write!(f, "Callback::Rust(<closure>)"),
        }
    }
}

impl<I> Callback<I> {
    fn call(&mut self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(ref mut f) => f(info),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SolverCallbacks<I> {
    /// callback for termination
    pub termination_callback: Callback<I>,
}

impl<I> Default for SolverCallbacks<I> {
    fn default() -> Self {
        Self {
            termination_callback: Callback::None,
        }
    }
}

impl<I> SolverCallbacks<I> {
    pub(crate) fn check_termination(&mut self, info: &I) -> bool {
        self.termination_callback.call(info)
    }
}
