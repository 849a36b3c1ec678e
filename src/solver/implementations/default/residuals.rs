#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Residuals;

// ---------------
// Residuals type for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Residuals`](crate::solver::core::traits::Residuals) trait.
///
/// Holds the data products with the current iterate required for
/// residual, objective and certificate computations.   All products
/// are in the equilibrated space.

pub struct DefaultResiduals<T> {
    // products with the current iterate
    pub Ax: Vec<T>,
    pub Px: Vec<T>,
    pub Aty: Vec<T>,

    // products with the latest iterate deltas, for
    // infeasibility certificates
    pub Atdy: Vec<T>,
    pub Adx: Vec<T>,
    pub Pdx: Vec<T>,

    // inner products for the objective value.
    // NB: these are invariant w.r.t. equilibration up to the
    // cost scaling c
    pub dot_qx: T,
    pub dot_xPx: T,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            Ax: vec![T::zero(); m],
            Px: vec![T::zero(); n],
            Aty: vec![T::zero(); n],
            Atdy: vec![T::zero(); n],
            Adx: vec![T::zero(); m],
            Pdx: vec![T::zero(); n],
            dot_qx: T::zero(),
            dot_xPx: T::zero(),
        }
    }
}

impl<T> Residuals<T> for DefaultResiduals<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;

    fn update(&mut self, variables: &DefaultVariables<T>, data: &DefaultProblemData<T>) {
        // products with the iterate, P treated as symmetric
        let symP = data.P.sym();
        symP.symv(&mut self.Px, &variables.x, T::one(), T::zero());

        data.A.gemv(&mut self.Ax, &variables.x, T::one(), T::zero());
        data.A
            .t()
            .gemv(&mut self.Aty, &variables.y, T::one(), T::zero());

        // products with the deltas of the latest check window
        symP.symv(&mut self.Pdx, &variables.delta_x, T::one(), T::zero());
        data.A
            .gemv(&mut self.Adx, &variables.delta_x, T::one(), T::zero());
        data.A
            .t()
            .gemv(&mut self.Atdy, &variables.delta_y, T::one(), T::zero());

        // objective ingredients
        self.dot_qx = data.q.dot(&variables.x);
        self.dot_xPx = variables.x.dot(&self.Px);
    }
}
