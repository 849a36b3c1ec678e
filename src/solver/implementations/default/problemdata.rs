#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::traits::ProblemData;

// ---------------
// Data type for the default problem format
// ---------------

/// Standard-form solver type implementing the [`ProblemData`](crate::solver::core::traits::ProblemData) trait
pub struct DefaultProblemData<T> {
    /// The matrix P in the quadratic objective term, in triu storage
    pub P: CscMatrix<T>,
    /// The vector q in the objective
    pub q: Vec<T>,
    /// The constraint matrix A
    pub A: CscMatrix<T>,
    /// Lower constraint bounds.   Entries beyond the module infinity
    /// bound are stored as -∞
    pub l: Vec<T>,
    /// Upper constraint bounds.   Entries beyond the module infinity
    /// bound are stored as +∞
    pub u: Vec<T>,
    /// Number of variables
    pub n: usize,
    /// Number of constraints
    pub m: usize,
    /// Equilibration data for the problem
    pub equilibration: DefaultEquilibrationData<T>,

    // unscaled inf-norm of the linear cost.  Set to "None" during
    // data updating and recalculated on demand
    normq: Option<T>,
}

impl<T> DefaultProblemData<T>
where
    T: FloatT,
{
    /// Create a new `DefaultProblemData` object.   Makes an internal
    /// copy of all data, reduces P to its upper triangle, and maps
    /// bounds beyond the module infinity bound to ±∞.
    pub fn new(P: &CscMatrix<T>, q: &[T], A: &CscMatrix<T>, l: &[T], u: &[T]) -> Self {
        let P_new = if P.is_triu() { P.clone() } else { P.to_triu() };
        let A_new = A.clone();
        let q_new = q.to_vec();

        let infbound: T = crate::solver::get_infinity().as_T();
        let mut l_new = l.to_vec();
        let mut u_new = u.to_vec();
        l_new.scalarop(|x| if x <= -infbound { -T::infinity() } else { x });
        u_new.scalarop(|x| if x >= infbound { T::infinity() } else { x });

        let (m, n) = A_new.size();

        let equilibration = DefaultEquilibrationData::<T>::new(n, m);

        let normq = Some(q_new.norm_inf());

        Self {
            P: P_new,
            q: q_new,
            A: A_new,
            l: l_new,
            u: u_new,
            n,
            m,
            equilibration,
            normq,
        }
    }

    /// unscaled inf-norm of the linear cost term
    pub(crate) fn get_normq(&mut self) -> T {
        if let Some(norm) = self.normq {
            norm
        } else {
            let dinv = &self.equilibration.dinv;
            let cinv = T::recip(self.equilibration.c);
            let norm = self.q.norm_inf_scaled(dinv) * cinv;
            self.normq = Some(norm);
            norm
        }
    }

    pub(crate) fn clear_normq(&mut self) {
        self.normq = None;
    }

    // constraint row classification.   NB: bounds are stored with
    // true ±∞ for disabled sides, so finiteness checks suffice
    pub(crate) fn is_loose_row(&self, i: usize) -> bool {
        self.l[i] == -T::infinity() && self.u[i] == T::infinity()
    }

    pub(crate) fn is_equality_row(&self, i: usize) -> bool {
        self.l[i] == self.u[i]
    }
}

impl<T> ProblemData<T> for DefaultProblemData<T>
where
    T: FloatT,
{
    type SE = DefaultSettings<T>;

    fn equilibrate(&mut self, settings: &DefaultSettings<T>) {
        let data = self;
        let equil = &mut data.equilibration;

        // if equilibration is disabled, just return.  Note that
        // the default equilibration structure initializes with
        // identity scaling already.
        if settings.scaling == 0 {
            return;
        }

        // references to scaling matrices from workspace
        let (d, e) = (&mut equil.d, &mut equil.e);

        // use the inverse scalings as work vectors
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;

        // references to problem data
        // note that P is triu, but it shouldn't matter
        let (P, A, q, l, u) = (
            &mut data.P,
            &mut data.A,
            &mut data.q,
            &mut data.l,
            &mut data.u,
        );

        // perform scaling operations for a fixed number of steps
        for _ in 0..settings.scaling {
            kkt_col_norms(P, A, dwork, ework);

            // zero or non-finite norms should not get scaled
            let guard = |x: T| {
                if x == T::zero() || !x.is_finite() {
                    T::one()
                } else {
                    x
                }
            };
            dwork.scalarop(guard);
            ework.scalarop(guard);

            dwork.rsqrt();
            ework.rsqrt();

            // Scale the problem data and update the
            // equilibration matrices
            scale_data(P, A, q, l, u, dwork, ework);
            d.hadamard(dwork);
            e.hadamard(ework);

            // now use the dwork array to hold the column norms of the
            // newly scaled P so that we can compute their mean
            P.col_norms_sym(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = q.norm_inf();

            // cost scaling: c ← 1/max(mean(colnorms(P)), ‖q‖∞, 1)
            let scale_cost = T::max(mean_col_norm_P, T::max(inf_norm_q, T::one()));
            let ctmp = T::recip(scale_cost);
            if ctmp.is_finite() && ctmp > T::zero() {
                P.scale(ctmp);
                q.scale(ctmp);
                equil.c *= ctmp;
            }
        } //end Ruiz scaling loop

        // update the inverse scaling data
        equil.dinv.scalarop_from(T::recip, d);
        equil.einv.scalarop_from(T::recip, e);
    }
}

// ---------------
// utilities
// ---------------

// column norms of the symmetric KKT composite [P Aᵀ; A 0]:
// norm_LHS (length n) over [P; A] columns, norm_RHS (length m)
// over A rows
fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS); // P can be triu
    A.col_norms_no_reset(norm_LHS); // incrementally from P norms
    A.row_norms(norm_RHS); // same as column norms of A'
}

fn scale_data<T: FloatT>(
    P: &mut CscMatrix<T>,
    A: &mut CscMatrix<T>,
    q: &mut [T],
    l: &mut [T],
    u: &mut [T],
    d: &[T],
    e: &[T],
) {
    P.lrscale(d, d); // P[:,:] = D*P*D
    A.lrscale(e, d);
    q.hadamard(d);
    l.hadamard(e);
    u.hadamard(e);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_equilibration_identity_when_disabled() {
        let P = CscMatrix::from(&[[4., 1.], [1., 2.]]);
        let A = CscMatrix::identity(2);
        let q = vec![1., 1.];
        let (l, u) = (vec![0., 0.], vec![1., 1.]);

        let mut data = DefaultProblemData::new(&P, &q, &A, &l, &u);
        let mut settings = DefaultSettings::<f64>::default();
        settings.scaling = 0;
        data.equilibrate(&settings);

        assert!(data.equilibration.d.iter().all(|&v| v == 1.));
        assert!(data.equilibration.e.iter().all(|&v| v == 1.));
        assert_eq!(data.equilibration.c, 1.);
    }

    #[test]
    fn test_equilibration_strictly_positive() {
        // badly scaled data should still produce positive finite scalings
        let P = CscMatrix::from(&[[4e6, 0.], [0., 2e-6]]);
        let A = CscMatrix::from(&[[1e3, 0.], [0., 1e-4]]);
        let q = vec![1e5, -1e-3];
        let (l, u) = (vec![-1., -1.], vec![1., 1.]);

        let mut data = DefaultProblemData::new(&P, &q, &A, &l, &u);
        let settings = DefaultSettings::<f64>::default();
        data.equilibrate(&settings);

        let equil = &data.equilibration;
        assert!(equil.d.iter().all(|&v| v > 0. && v.is_finite()));
        assert!(equil.e.iter().all(|&v| v > 0. && v.is_finite()));
        assert!(equil.c > 0. && equil.c.is_finite());

        // composite KKT norms should be approximately balanced
        let mut dnorm = vec![0.; 2];
        let mut enorm = vec![0.; 2];
        kkt_col_norms(&data.P, &data.A, &mut dnorm, &mut enorm);
        for nrm in dnorm.iter().chain(enorm.iter()) {
            assert!(*nrm < 10. && *nrm > 0.05, "unbalanced norm {}", nrm);
        }
    }

    #[test]
    fn test_infinite_bounds_preserved() {
        let P = CscMatrix::identity(2);
        let A = CscMatrix::identity(2);
        let q = vec![0., 0.];
        let l = vec![-1e21, 0.];
        let u = vec![1., 1e30];

        let mut data = DefaultProblemData::new(&P, &q, &A, &l, &u);
        let settings = DefaultSettings::<f64>::default();
        data.equilibrate(&settings);

        assert_eq!(data.l[0], f64::NEG_INFINITY);
        assert_eq!(data.u[1], f64::INFINITY);
        assert!(data.l[1].is_finite());
        assert!(data.u[0].is_finite());
    }
}
