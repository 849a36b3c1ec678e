#![allow(non_snake_case)]

// Sparse LDLᵀ factorization of symmetric quasidefinite matrices in
// upper triangular CSC storage.   No pivoting: quasidefiniteness of the
// regularized polishing KKT system guarantees a factorization exists.
// AMD is applied for fill reduction.

use crate::algebra::*;
use std::cmp::{max, min};
use std::iter::zip;
use thiserror::Error;

/// Error type returned by the LDL factorization used in polishing.
#[derive(Error, Debug)]
pub enum LdlError {
    #[error("Matrix must be square and upper triangular")]
    BadMatrix,
    #[error("Matrix has a structurally empty column")]
    EmptyColumn,
    #[error("Matrix factorization produced a zero pivot")]
    ZeroPivot,
    #[error("Fill reducing ordering failed")]
    OrderingFailure,
}

pub(crate) struct LdlFactorization<T> {
    // fill-reducing permutation
    perm: Vec<usize>,
    // unit lower triangular factor
    L: CscMatrix<T>,
    // inverse of the diagonal D in A = LDLᵀ
    Dinv: Vec<T>,
    // permutation scratch for solves
    work: Vec<T>,
}

impl<T> LdlFactorization<T>
where
    T: FloatT,
{
    pub fn new(K: &CscMatrix<T>) -> Result<Self, LdlError> {
        if !K.is_square() || !K.is_triu() {
            return Err(LdlError::BadMatrix);
        }
        // every column must have at least one structural entry.   The
        // polishing KKT assembly guarantees a full diagonal.
        if !K.colptr.windows(2).all(|c| c[0] < c[1]) {
            return Err(LdlError::EmptyColumn);
        }

        let n = K.ncols();

        // AMD fill-reducing ordering, then the permuted triu matrix
        let control = amd::Control::default();
        let (perm, iperm, _info) = amd::order(n, &K.colptr, &K.rowval, &control)
            .map_err(|_| LdlError::OrderingFailure)?;
        let Kperm = _permute_symmetric(K, &iperm);

        // symbolic analysis: elimination tree and column counts of L
        let mut etree = vec![0usize; n];
        let mut Lnz = vec![0usize; n];
        let mut iwork = vec![0usize; n];
        _etree(n, &Kperm.colptr, &Kperm.rowval, &mut iwork, &mut Lnz, &mut etree);

        let nnzL = Lnz.iter().sum();
        let mut L = CscMatrix::spalloc(n, n, nnzL);
        let mut Dinv = vec![T::zero(); n];

        _factor(&Kperm, &mut L, &mut Dinv, &Lnz, &etree)?;

        Ok(Self {
            perm,
            L,
            Dinv,
            work: vec![T::zero(); n],
        })
    }

    // Solves Kx = b using the LDL factors, with x replacing b
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.Dinv.len());

        let x = &mut self.work;
        _permute(x, b, &self.perm);

        _lsolve(&self.L, x);
        x.hadamard(&self.Dinv);
        _ltsolve(&self.L, x);

        _ipermute(b, x, &self.perm);
    }
}

// Compute the elimination tree and L column counts for a
// quasidefinite matrix in (permuted) triu CSC form.
fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) {
    const UNKNOWN: usize = usize::MAX;

    work.fill(0);
    Lnz.fill(0);
    etree.fill(UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for istart in Ai.iter().take(Ap[j + 1]).skip(Ap[j]) {
            let mut i = *istart;
            if i == j {
                continue;
            }
            while work[i] != j {
                if etree[i] == UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1; // nonzeros in this column
                work[i] = j;
                i = etree[i];
            }
        }
    }
}

// Numeric factorization.   For each row k we solve
// y = L(0:k-1, 0:k-1) \ b with b the kth column of A above the
// diagonal; y scaled by D⁻¹ is then the kth row of L.
fn _factor<T: FloatT>(
    A: &CscMatrix<T>,
    L: &mut CscMatrix<T>,
    Dinv: &mut [T],
    Lnz: &[usize],
    etree: &[usize],
) -> Result<(), LdlError> {
    const UNKNOWN: usize = usize::MAX;

    let n = A.n;
    if n == 0 {
        return Ok(());
    }

    let (Ap, Ai, Ax) = (&A.colptr, &A.rowval, &A.nzval);

    //set L.colptr to cumsum(Lnz), starting from zero
    L.colptr[0] = 0;
    let mut acc = 0;
    for (Lp, Lnz) in zip(&mut L.colptr[1..], Lnz) {
        *Lp = acc + Lnz;
        acc = *Lp;
    }

    let mut D = vec![T::zero(); n];
    let mut y_vals = vec![T::zero(); n];
    let mut y_markers = vec![false; n];
    let mut y_idx = vec![0usize; n];
    let mut elim_buffer = vec![0usize; n];

    // next available space in each column of L
    let mut next_colspace: Vec<usize> = L.colptr[0..n].to_vec();

    // first diagonal entry.  The first column of a triu matrix can
    // only hold the (0,0) element.
    D[0] = Ax[0];
    if D[0] == T::zero() {
        return Err(LdlError::ZeroPivot);
    }
    Dinv[0] = T::recip(D[0]);

    for k in 1..n {
        // mark where nonzeros land in the kth row of L by walking the
        // elimination tree from each entry of the sparse RHS
        let mut nnz_y = 0;

        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];

            // the diagonal element seeds D[k] and takes no part in
            // the elimination
            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            if !y_markers[bidx] {
                y_markers[bidx] = true;
                elim_buffer[0] = bidx;
                let mut nnz_e = 1;

                let mut next_idx = etree[bidx];
                while next_idx != UNKNOWN && next_idx < k {
                    if y_markers[next_idx] {
                        break;
                    }
                    y_markers[next_idx] = true;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                // append the eliminated path in reverse order
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        // numeric elimination over the marked columns
        for i in (0..nnz_y).rev() {
            let cidx = y_idx[i];
            let tmp_idx = next_colspace[cidx];
            let y_vals_cidx = y_vals[cidx];

            for j in L.colptr[cidx]..tmp_idx {
                y_vals[L.rowval[j]] -= L.nzval[j] * y_vals_cidx;
            }

            // the cidxth element of y = L\b, scaled into this row of L
            L.nzval[tmp_idx] = y_vals_cidx * Dinv[cidx];
            L.rowval[tmp_idx] = k;
            D[k] -= y_vals_cidx * L.nzval[tmp_idx];

            next_colspace[cidx] += 1;

            // reset scratch for this column
            y_vals[cidx] = T::zero();
            y_markers[cidx] = false;
        }

        if D[k] == T::zero() {
            return Err(LdlError::ZeroPivot);
        }
        Dinv[k] = T::recip(D[k]);
    }

    Ok(())
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in 0..x.len() {
        let xi = x[i];
        for j in L.colptr[i]..L.colptr[i + 1] {
            x[L.rowval[j]] -= L.nzval[j] * xi;
        }
    }
}

// Solves (L+I)ᵀx = b, with x replacing b
fn _ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for i in (0..x.len()).rev() {
        let mut s = T::zero();
        for j in L.colptr[i]..L.colptr[i + 1] {
            s += L.nzval[j] * x[L.rowval[j]];
        }
        x[i] -= s;
    }
}

// permutation and inverse permutation applications,
// with no memory allocation
fn _permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

fn _ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a sparse symmetric matrix `A` (with only upper triangular
// entries), return the permuted sparse symmetric matrix `P` (also in
// triu form) given the inverse permutation vector `iperm`.
// NB: columns of the result are not sorted by row index, which the
// factorization does not require.
fn _permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> CscMatrix<T> {
    let n = A.ncols();
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());

    // 1. count the entries each column of P will receive
    let mut num_entries = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for rowA in A.rowval.iter().take(A.colptr[colA + 1]).skip(A.colptr[colA]) {
            let rowP = iperm[*rowA];
            num_entries[max(rowP, colP)] += 1;
        }
    }

    // 2. cumsum into the column pointer
    P.colptr[0] = 0;
    let mut acc = 0;
    for (Pckp1, ne) in zip(&mut P.colptr[1..], &num_entries) {
        *Pckp1 = acc + ne;
        acc = *Pckp1;
    }
    // reuse as a fill cursor per column
    num_entries.copy_from_slice(&P.colptr[0..n]);
    let mut cursor = num_entries;

    // 3. scatter entries into their permuted columns
    for colA in 0..n {
        let colP = iperm[colA];
        for idx in A.colptr[colA]..A.colptr[colA + 1] {
            let rowP = iperm[A.rowval[idx]];
            let col_idx = max(colP, rowP);

            let dest = cursor[col_idx];
            P.rowval[dest] = min(colP, rowP);
            P.nzval[dest] = A.nzval[idx];
            cursor[col_idx] += 1;
        }
    }

    P
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ldl_quasidefinite_2x2() {
        // K = [2 1; 1 -3] in triu form
        let K = CscMatrix::<f64>::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![2., 1., -3.]);

        let mut ldl = LdlFactorization::new(&K).unwrap();

        let mut b = vec![1., -2.];
        ldl.solve(&mut b);

        // exact solution of Kx = [1, -2]
        assert!((b[0] - 1. / 7.).abs() < 1e-12);
        assert!((b[1] - 5. / 7.).abs() < 1e-12);
    }

    #[test]
    fn test_ldl_larger_system() {
        // K = [4 1 0; 1 5 2; 0 2 -6] in triu form
        let K = CscMatrix::new(
            3,
            3,
            vec![0, 1, 3, 5],
            vec![0, 0, 1, 1, 2],
            vec![4., 1., 5., 2., -6.],
        );

        let mut ldl = LdlFactorization::new(&K).unwrap();

        let xref = vec![1., -2., 3.];
        // b = K * xref
        let mut b = vec![4. - 2., 1. - 10. + 6., -4. - 18.];
        ldl.solve(&mut b);

        assert!(b.norm_inf_diff(&xref) < 1e-12);
    }

    #[test]
    fn test_ldl_rejects_bad_matrix() {
        // lower triangular entries present
        let K = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![2., 1., 3.]);
        assert!(LdlFactorization::new(&K).is_err());

        // empty column
        let K = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![2.]);
        assert!(matches!(
            LdlFactorization::new(&K),
            Err(LdlError::EmptyColumn)
        ));
    }
}
