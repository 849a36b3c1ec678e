#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Variables;
use std::iter::zip;

// bounds on the per-constraint step parameter
pub(crate) const RHO_MIN: f64 = 1e-6;
pub(crate) const RHO_MAX: f64 = 1e6;

// ---------------
// Variables type for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Variables`](crate::solver::core::traits::Variables) trait.
///
/// All iterates are stored in the equilibrated space.
pub struct DefaultVariables<T> {
    /// primal variables
    pub x: Vec<T>,
    /// projected constraint variables
    pub z: Vec<T>,
    /// dual variables
    pub y: Vec<T>,

    // linear system solution (xtilde, ztilde) for the current iteration.
    // The leading n entries double as the warm start for the next
    // iterative solve.
    pub(crate) xz_tilde: Vec<T>,

    // previous constraint iterate
    pub(crate) z_prev: Vec<T>,

    // change in (x, y) over the latest termination-check window,
    // for infeasibility certificates
    pub(crate) delta_x: Vec<T>,
    pub(crate) delta_y: Vec<T>,

    // scalar step parameter estimate and its per-constraint expansion
    pub(crate) rho: T,
    pub(crate) rho_vec: Vec<T>,
    pub(crate) rho_inv_vec: Vec<T>,

    n: usize,
    m: usize,
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            y: vec![T::zero(); m],
            xz_tilde: vec![T::zero(); n + m],
            z_prev: vec![T::zero(); m],
            delta_x: vec![T::zero(); n],
            delta_y: vec![T::zero(); m],
            rho: T::zero(),
            rho_vec: vec![T::zero(); m],
            rho_inv_vec: vec![T::zero(); m],
            n,
            m,
        }
    }
}

impl<T> Variables<T> for DefaultVariables<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type SE = DefaultSettings<T>;

    fn reset(&mut self) {
        self.x.fill(T::zero());
        self.z.fill(T::zero());
        self.y.fill(T::zero());
        self.xz_tilde.fill(T::zero());
        self.z_prev.fill(T::zero());
    }

    fn shift_prev(&mut self) {
        self.z_prev.copy_from(&self.z);
    }

    // x ← αxtilde + (1−α)x
    fn over_relax_x(&mut self, α: T) {
        let xtilde = &self.xz_tilde[0..self.n];
        self.x.axpby(α, xtilde, T::one() - α);
    }

    // z ← Π(αztilde + (1−α)z_prev + R⁻¹y), with Π the elementwise
    // projection onto [l, u].   Infinite bounds disable their side.
    fn project_z(&mut self, data: &Self::D, α: T) {
        let ztilde = &self.xz_tilde[self.n..];
        let one_minus_α = T::one() - α;

        for i in 0..self.m {
            let v = α * ztilde[i] + one_minus_α * self.z_prev[i] + self.rho_inv_vec[i] * self.y[i];
            self.z[i] = T::min(T::max(v, data.l[i]), data.u[i]);
        }
    }

    // y ← y + R(αztilde + (1−α)z_prev − z)
    fn update_y(&mut self, α: T) {
        let ztilde = &self.xz_tilde[self.n..];
        let one_minus_α = T::one() - α;

        for i in 0..self.m {
            self.y[i] += self.rho_vec[i] * (α * ztilde[i] + one_minus_α * self.z_prev[i] - self.z[i]);
        }
    }

    fn save_deltas(&mut self, prev: &Self) {
        self.delta_x.waxpby(T::one(), &self.x, -T::one(), &prev.x);
        self.delta_y.waxpby(T::one(), &self.y, -T::one(), &prev.y);
    }

    // rebuild rho_vec from a new scalar estimate.   Equality rows are
    // weighted up; rows with no finite bound are pinned at the lower
    // limit so that they do not dominate AᵀRA.
    fn update_rho_vec(&mut self, ρ: T, data: &Self::D, settings: &Self::SE) {
        let ρ_min: T = RHO_MIN.as_T();
        let ρ_max: T = RHO_MAX.as_T();

        self.rho = ρ.clip(ρ_min, ρ_max);

        for i in 0..self.m {
            self.rho_vec[i] = if data.is_loose_row(i) {
                ρ_min
            } else if data.is_equality_row(i) {
                (settings.rho_eq_scale * self.rho).clip(ρ_min, ρ_max)
            } else {
                self.rho
            };
        }
        self.rho_inv_vec.scalarop_from(T::recip, &self.rho_vec);
    }

    fn rho(&self) -> T {
        self.rho
    }

    fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.z.copy_from(&src.z);
        self.y.copy_from(&src.y);
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite() && self.y.is_finite()
    }
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    // warm start entry point: adopt user (x, y), in user space, and
    // set z = Ax to match
    pub(crate) fn initialize_from(
        &mut self,
        data: &DefaultProblemData<T>,
        x: Option<&[T]>,
        y: Option<&[T]>,
    ) {
        let equil = &data.equilibration;

        if let Some(x) = x {
            // xs = D⁻¹x
            for (xs, (x, dinv)) in zip(&mut self.x, zip(x, &equil.dinv)) {
                *xs = *x * *dinv;
            }
        }
        if let Some(y) = y {
            // ys = cE⁻¹y
            for (ys, (y, einv)) in zip(&mut self.y, zip(y, &equil.einv)) {
                *ys = *y * *einv * equil.c;
            }
        }

        // z = Ax in the equilibrated space
        data.A.gemv(&mut self.z, &self.x, T::one(), T::zero());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::core::traits::Variables as VariablesTrait;

    fn test_data() -> DefaultProblemData<f64> {
        let P = CscMatrix::identity(2);
        let A = CscMatrix::from(&[
            [1., 0.], //
            [0., 1.], //
            [1., 1.], //
        ]);
        let q = vec![0., 0.];
        let l = vec![0., -f64::INFINITY, 1.];
        let u = vec![0., f64::INFINITY, 2.];
        DefaultProblemData::new(&P, &q, &A, &l, &u)
    }

    #[test]
    fn test_rho_vec_row_classes() {
        let data = test_data();
        let settings = DefaultSettings::<f64>::default();
        let mut vars = DefaultVariables::<f64>::new(2, 3);

        vars.update_rho_vec(0.1, &data, &settings);

        assert_eq!(vars.rho, 0.1);
        assert_eq!(vars.rho_vec[0], 100.); // equality row: 1e3 * ρ
        assert_eq!(vars.rho_vec[1], RHO_MIN); // loose row
        assert_eq!(vars.rho_vec[2], 0.1); // interval row
        assert_eq!(vars.rho_inv_vec[2], 10.);
    }

    #[test]
    fn test_projection_respects_infinite_bounds() {
        let data = test_data();
        let settings = DefaultSettings::<f64>::default();
        let mut vars = DefaultVariables::<f64>::new(2, 3);
        vars.update_rho_vec(0.1, &data, &settings);

        // α = 1 so that z = Π(ztilde + R⁻¹y), with y = 0
        vars.xz_tilde[2..].copy_from_slice(&[5., -7., 1.5]);
        vars.project_z(&data, 1.0);

        assert_eq!(vars.z[0], 0.); // clipped to the equality value
        assert_eq!(vars.z[1], -7.); // loose row passes through
        assert_eq!(vars.z[2], 1.5); // interior point unchanged
    }
}
