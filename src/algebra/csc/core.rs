#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, ShapedMatrix, SparseFormatError, Symmetric};
use std::iter::zip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use splitqp::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
/// ```

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// This field should have length `n+1`. The last entry corresponds
    /// to the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__ ensure that row indices
    /// are all in bounds or that data is arranged such that entries
    /// within each column appear in order of increasing row index.
    /// Responsibility for ensuring these conditions hold is left to the
    /// caller; see also [`check_format`](CscMatrix::check_format).

    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose view
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view.   The matrix should be in triu form.
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Check that `other` has exactly the same sparsity pattern
    pub fn check_equal_sparsity(&self, other: &Self) -> Result<(), SparseFormatError> {
        if self.size() != other.size() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr != other.colptr || self.rowval != other.rowval {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        Ok(())
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        for col in 0..self.ncols() {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            let rows = &self.rowval[first..last];

            if rows.iter().any(|&row| row > col) {
                return false;
            }
        }
        true
    }

    /// Allocates a new matrix containing only entries from the upper triangular part
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let (m, n) = (self.m, self.n);
        let mut colptr = vec![0; n + 1];
        let mut nnz = 0;

        //count the number of entries in the upper triangle
        //and place the totals into colptr

        for col in 0..n {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            let rows = &self.rowval[first..last];

            // number of entries on or above diagonal in this column,
            // shifted by 1 (i.e. colptr keeps a 0 in the first column)
            colptr[col + 1] = rows.iter().filter(|&row| *row <= col).count();
            nnz += colptr[col + 1];
        }

        //allocate and copy the upper triangle entries of
        //each column into the new value vector.
        //NB! : assumes that entries in each column have
        //monotonically increasing row numbers
        let mut rowval = vec![0; nnz];
        let mut nzval = vec![T::zero(); nnz];

        for col in 0..n {
            let ntriu = colptr[col + 1];

            //start / stop indices for the destination
            let fdest = colptr[col];
            let ldest = fdest + ntriu;

            //start / stop indices for the source
            let fsrc = self.colptr[col];
            let lsrc = fsrc + ntriu;

            //copy upper triangle values
            rowval[fdest..ldest].copy_from_slice(&self.rowval[fsrc..lsrc]);
            nzval[fdest..ldest].copy_from_slice(&self.nzval[fsrc..lsrc]);

            //this should now be cumsum of the counts
            colptr[col + 1] = ldest;
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Select a subset of the rows of a sparse matrix
    ///
    /// # Panics
    /// Panics if row dimensions are incompatible
    pub fn select_rows(&self, rowidx: &[bool]) -> Self {
        //first check for compatible row dimensions
        assert_eq!(rowidx.len(), self.m);

        //count the number of rows in the reduced matrix and build an
        //index from the logical rowidx to the reduced row number
        let mut rridx = vec![0; self.m];
        let mut mred = 0;
        for (r, is_used) in zip(&mut rridx, rowidx) {
            if *is_used {
                *r = mred;
                mred += 1;
            }
        }

        // count the nonzeros in the reduced matrix
        let nzred = self.rowval.iter().filter(|&r| rowidx[*r]).count();

        // allocate and populate a reduced size matrix
        let mut Ared = CscMatrix::spalloc(mred, self.n, nzred);

        let mut ptrred = 0;
        for col in 0..self.n {
            Ared.colptr[col] = ptrred;
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let thisrow = self.rowval[ptr];
                if rowidx[thisrow] {
                    Ared.rowval[ptrred] = rridx[thisrow];
                    Ared.nzval[ptrred] = self.nzval[ptr];
                    ptrred += 1;
                }
            }
            Ared.colptr[Ared.n] = ptrred;
        }

        Ared
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
}

/// Construct a CSC matrix from a dense array of arrays, dropping
/// exact zeros.   Intended mainly for small examples and testing.
impl<T, const R: usize, const C: usize> From<&[[T; C]; R]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; C]; R]) -> Self {
        let mut colptr = Vec::with_capacity(C + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for c in 0..C {
            for (r, row) in rows.iter().enumerate() {
                if row[c] != T::zero() {
                    rowval.push(r);
                    nzval.push(row[c]);
                }
            }
            colptr.push(rowval.len());
        }

        CscMatrix::new(R, C, colptr, rowval, nzval)
    }
}

#[test]
fn test_check_format() {
    let A: CscMatrix<f64> = CscMatrix::new(
        3,
        3,
        vec![0, 2, 4, 7],
        vec![0, 1, 0, 2, 0, 1, 2],
        vec![1., 2., 3., 4., 5., 6., 7.],
    );
    assert!(A.check_format().is_ok());

    let mut B = A.clone();
    B.rowval[1] = 0; //duplicate row index
    assert!(B.check_format().is_err());

    let mut B = A.clone();
    B.rowval[6] = 3; //row out of bounds
    assert!(B.check_format().is_err());
}

#[test]
fn test_from_dense() {
    let A = CscMatrix::from(&[
        [1., 0.], //
        [2., 4.], //
        [0., 3.], //
    ]);

    assert_eq!(A.size(), (3, 2));
    assert_eq!(A.colptr, vec![0, 2, 4]);
    assert_eq!(A.rowval, vec![0, 1, 1, 2]);
    assert_eq!(A.nzval, vec![1., 2., 4., 3.]);
}

#[test]
fn test_to_triu() {
    let A = CscMatrix::from(&[
        [4., 1.], //
        [1., 2.], //
    ]);
    let P = A.to_triu();
    assert!(P.is_triu());
    assert_eq!(P.nnz(), 3);
    assert_eq!(P.nzval, vec![4., 1., 2.]);
}

#[test]
fn test_select_rows() {
    let A = CscMatrix::from(&[
        [1., 0., 2.], //
        [0., 3., 0.], //
        [4., 0., 5.], //
    ]);
    let rows = vec![true, false, true];
    let Ared = A.select_rows(&rows);

    assert_eq!(Ared.size(), (2, 3));
    assert_eq!(Ared.nzval, vec![1., 4., 2., 5.]);
    assert_eq!(Ared.rowval, vec![0, 1, 0, 1]);
}
