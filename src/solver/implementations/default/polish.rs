#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::core::kktsolvers::direct::LdlFactorization;
use crate::solver::core::{traits::Polisher, PolishStatus};
use itertools::izip;

// active-set detection floor and relative width
const ACTIVE_TOL_MIN: f64 = 1e-8;
const ACTIVE_TOL_REL: f64 = 1e-6;

// which bound, if any, a constraint row sits on
#[derive(Clone, Copy, PartialEq, Eq)]
enum RowActivity {
    Inactive,
    Lower,
    Upper,
}

// ---------------
// Solution polishing for the default problem format
// ---------------

/// Standard-form solver type implementing the [`Polisher`](crate::solver::core::traits::Polisher) trait.
///
/// Re-solves the equality-constrained QP obtained by fixing the
/// constraints identified as active to their bounds,
///
/// ```text
/// [P + δI   A_redᵀ] [x*]   [−q   ]
/// [A_red     −δI  ] [λ*] = [b_red]
/// ```
///
/// with iterative refinement against the unregularized system, and
/// commits the refined iterate only when it does not degrade the
/// residuals.
pub struct DefaultPolisher<T> {
    activity: Vec<RowActivity>,
    y_pol: Vec<T>,
}

impl<T> DefaultPolisher<T>
where
    T: FloatT,
{
    pub fn new(m: usize) -> Self {
        Self {
            activity: vec![RowActivity::Inactive; m],
            y_pol: vec![T::zero(); m],
        }
    }

    // classify each constraint row against its bounds
    fn find_active_set(&mut self, data: &DefaultProblemData<T>, variables: &DefaultVariables<T>) {
        let active_tol_rel: T = ACTIVE_TOL_REL.as_T();
        let eps_act: T = T::max(ACTIVE_TOL_MIN.as_T(), active_tol_rel * variables.y.norm_inf());

        for (act, (&y, (&z, (&l, &u)))) in std::iter::zip(
            &mut self.activity,
            std::iter::zip(
                &variables.y,
                std::iter::zip(&variables.z, std::iter::zip(&data.l, &data.u)),
            ),
        ) {
            let low = l.is_finite() && (y < -eps_act || z - l < eps_act);
            let upp = u.is_finite() && (y > eps_act || u - z < eps_act);

            *act = match (low, upp) {
                (false, false) => RowActivity::Inactive,
                (true, false) => RowActivity::Lower,
                (false, true) => RowActivity::Upper,
                // both sides fire on (near-)equality rows: let the
                // sign of the multiplier decide
                (true, true) => {
                    if y > T::zero() {
                        RowActivity::Upper
                    } else {
                        RowActivity::Lower
                    }
                }
            };
        }
    }

    // assemble the reduced KKT system in triu CSC form
    fn assemble_kkt(
        &self,
        data: &DefaultProblemData<T>,
        Ared: &CscMatrix<T>,
        δ: T,
    ) -> CscMatrix<T> {
        let n = data.n;
        let k = Ared.nrows();
        let P = &data.P;

        // columns of P lacking a structural diagonal entry
        let nmissing = (0..n)
            .filter(|&i| {
                P.colptr[i] == P.colptr[i + 1] || P.rowval[P.colptr[i + 1] - 1] != i
            })
            .count();

        let nnz = P.nnz() + nmissing + Ared.nnz() + k;
        let mut K = CscMatrix::<T>::spalloc(n + k, n + k, nnz);

        let mut pmap = vec![0usize; P.nnz()];
        let mut amap = vec![0usize; Ared.nnz()];
        let mut dmap = vec![0usize; k];

        K.colcount_block(P, 0, MatrixShape::N);
        K.colcount_missing_diag(P, 0);
        K.colcount_block(Ared, n, MatrixShape::T);
        K.colcount_diag(n, k);
        K.colcount_to_colptr();

        K.fill_block(P, &mut pmap, 0, 0, MatrixShape::N);
        K.fill_missing_diag(P, 0);
        K.fill_block(Ared, &mut amap, 0, n, MatrixShape::T);
        K.fill_diag(&mut dmap, n, k, -δ);
        K.backshift_colptrs();

        // regularize the (1,1) block.   The diagonal entry is always
        // the last one in its column after assembly.
        for col in 0..n {
            let idx = K.colptr[col + 1] - 1;
            debug_assert_eq!(K.rowval[idx], col);
            K.nzval[idx] += δ;
        }

        K
    }
}

impl<T> Polisher<T> for DefaultPolisher<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type I = DefaultInfo<T>;
    type SE = DefaultSettings<T>;

    fn polish(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &mut DefaultVariables<T>,
        info: &mut DefaultInfo<T>,
        settings: &DefaultSettings<T>,
    ) {
        let (n, m) = (data.n, data.m);
        let δ = settings.delta;

        self.find_active_set(data, variables);

        let active: Vec<bool> = self
            .activity
            .iter()
            .map(|&a| a != RowActivity::Inactive)
            .collect();

        // reduced constraint data on the active rows
        let Ared = data.A.select_rows(&active);
        let k = Ared.nrows();

        let bred: Vec<T> = izip!(&self.activity, &data.l, &data.u)
            .filter_map(|(&act, &l, &u)| match act {
                RowActivity::Lower => Some(l),
                RowActivity::Upper => Some(u),
                RowActivity::Inactive => None,
            })
            .collect();

        // factor the reduced KKT system
        let K = self.assemble_kkt(data, &Ared, δ);
        let mut ldl = match LdlFactorization::new(&K) {
            Ok(ldl) => ldl,
            Err(_) => {
                info.polish_status = PolishStatus::Unsuccessful;
                return;
            }
        };

        // rhs = [−q; b_red], solved in place
        let mut sol = vec![T::zero(); n + k];
        sol[0..n].scalarop_from(|q| -q, &data.q);
        sol[n..].copy_from(&bred);
        ldl.solve(&mut sol);

        // iterative refinement against the unregularized system,
        // reusing the same factorization
        let mut dz = vec![T::zero(); n + k];
        for _ in 0..settings.polish_refine_iter {
            {
                let (dx, dλ) = dz.split_at_mut(n);
                let (x, λ) = sol.split_at(n);

                // dx = −q − Px − A_redᵀλ
                dx.scalarop_from(|q| -q, &data.q);
                data.P.sym().symv(dx, x, -T::one(), T::one());
                Ared.t().gemv(dx, λ, -T::one(), T::one());

                // dλ = b_red − A_red x
                dλ.copy_from(&bred);
                Ared.gemv(dλ, x, -T::one(), T::one());
            }
            ldl.solve(&mut dz);
            sol.axpby(T::one(), &dz, T::one());
        }

        let x_pol = &sol[0..n];
        let λ_pol = &sol[n..];

        // expand the reduced multipliers to the full constraint set
        self.y_pol.fill(T::zero());
        let mut next = 0;
        for (y, &act) in std::iter::zip(&mut self.y_pol, &self.activity) {
            if act != RowActivity::Inactive {
                *y = λ_pol[next];
                next += 1;
            }
        }

        // candidate residuals on the unscaled problem
        let equil = &data.equilibration;
        let cinv = T::recip(equil.c);

        let mut Ax = vec![T::zero(); m];
        data.A.gemv(&mut Ax, x_pol, T::one(), T::zero());

        let mut z_pol = Ax.clone();
        for (z, (&l, &u)) in std::iter::zip(&mut z_pol, std::iter::zip(&data.l, &data.u)) {
            *z = T::min(T::max(*z, l), u);
        }

        let res_prim = izip!(&equil.einv, &Ax, &z_pol).fold(T::zero(), |acc, (&e, &ax, &z)| {
            T::max(acc, T::abs(e * (ax - z)))
        });

        let mut dual = vec![T::zero(); n];
        data.P.sym().symv(&mut dual, x_pol, T::one(), T::zero());
        data.A.t().gemv(&mut dual, &self.y_pol, T::one(), T::one());
        let res_dual = izip!(&equil.dinv, &dual, &data.q).fold(T::zero(), |acc, (&d, &v, &q)| {
            T::max(acc, T::abs(d * (v + q)))
        }) * cinv;

        // commit only if no residual degrades
        if res_prim.is_finite()
            && res_dual.is_finite()
            && res_prim <= info.res_prim
            && res_dual <= info.res_dual
        {
            variables.x.copy_from(x_pol);
            variables.z.copy_from(&z_pol);
            variables.y.copy_from(&self.y_pol);

            info.res_prim = res_prim;
            info.res_dual = res_dual;
            let half: T = (0.5).as_T();
            info.obj_val = (half * data.P.quad_form(x_pol, x_pol) + data.q.dot(x_pol)) * cinv;
            info.polish_status = PolishStatus::Successful;
        } else {
            info.polish_status = PolishStatus::Unsuccessful;
        }
    }
}
