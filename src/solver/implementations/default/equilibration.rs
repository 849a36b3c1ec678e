#![allow(non_snake_case)]
use crate::algebra::*;

// ---------------
// equilibration data
// ---------------

/// Data from the Ruiz equilibration procedure.
///
/// The scaled problem data is `P̂ = cDPD`, `q̂ = cDq`, `Â = EAD`,
/// `l̂ = El`, `û = Eu`, with the scaled iterate related to the user's
/// problem by `x = Dx̂`, `z = E⁻¹ẑ`, `y = c⁻¹Eŷ`.
pub struct DefaultEquilibrationData<T> {
    /// Vector of variable scaling terms
    pub d: Vec<T>,
    /// Vector of inverse variable scaling terms
    pub dinv: Vec<T>,
    /// Vector of constraint scaling terms
    pub e: Vec<T>,
    /// Vector of inverse constraint scaling terms
    pub einv: Vec<T>,
    /// overall scaling for objective function
    pub c: T,
}

impl<T> DefaultEquilibrationData<T>
where
    T: FloatT,
{
    /// creates a new equilibration object with identity scaling
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }

    // scale a replacement linear cost term into the equilibrated space
    pub(crate) fn scale_q(&self, q: &mut [T]) {
        q.hadamard(&self.d);
        q.scale(self.c);
    }

    // scale replacement bounds into the equilibrated space
    pub(crate) fn scale_bounds(&self, l: &mut [T], u: &mut [T]) {
        l.hadamard(&self.e);
        u.hadamard(&self.e);
    }

    // scale replacement matrix values into the equilibrated space.
    // P is assumed triu; both must match the setup sparsity.
    pub(crate) fn scale_P(&self, P: &mut CscMatrix<T>) {
        P.lrscale(&self.d, &self.d);
        P.scale(self.c);
    }

    pub(crate) fn scale_A(&self, A: &mut CscMatrix<T>) {
        A.lrscale(&self.e, &self.d);
    }

    // recover the user-space iterate from the scaled one
    pub(crate) fn unscale_solution(&self, x: &mut [T], y: &mut [T]) {
        x.hadamard(&self.d);
        y.hadamard(&self.e);
        y.scale(T::recip(self.c));
    }
}
