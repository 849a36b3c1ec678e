//---------------------------------------------------------
// low-level internal utilities for counting / filling entries
// in block partitioned sparse matrices.   Used to assemble the
// reduced KKT system for solution polishing.
//---------------------------------------------------------

#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, FloatT, MatrixShape};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // increment the self.colptr by the number of nonzeros
    // in a square diagonal matrix placed on the diagonal.
    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        let cols = self.colptr[initcol..(initcol + blockcols)].iter_mut();
        cols.for_each(|x| *x += 1);
    }

    // same as colcount_diag, but counts places
    // where the input matrix M has a missing
    // diagonal entry.  M must be square and TRIU
    pub(crate) fn colcount_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        assert_eq!(M.colptr.len(), M.n + 1);
        assert!(self.colptr.len() >= M.n + initcol);

        for i in 0..M.n {
            if M.colptr[i] == M.colptr[i+1] ||    // completely empty column
               M.rowval[M.colptr[i+1]-1] != i
            // last element is not on diagonal
            {
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // increment the self.colptr by the number of nonzeros in M
    pub(crate) fn colcount_block(&mut self, M: &CscMatrix<T>, initcol: usize, shape: MatrixShape) {
        match shape {
            MatrixShape::T => {
                for row in M.rowval.iter() {
                    self.colptr[initcol + row] += 1;
                }
            }
            MatrixShape::N => {
                // just add the column count
                for i in 0..M.n {
                    self.colptr[initcol + i] += M.colptr[i + 1] - M.colptr[i];
                }
            }
        }
    }

    // populate values from M using the self.colptr as indicator of
    // next fill location in each row.
    pub(crate) fn fill_block(
        &mut self,
        M: &CscMatrix<T>,
        MtoKKT: &mut [usize],
        initrow: usize,
        initcol: usize,
        shape: MatrixShape,
    ) {
        for i in 0..M.n {
            for j in M.colptr[i]..M.colptr[i + 1] {
                let (Mrow, Mval) = (M.rowval[j], M.nzval[j]);

                let (col, row) = match shape {
                    MatrixShape::T => (Mrow + initcol, i + initrow),
                    MatrixShape::N => (i + initcol, Mrow + initrow),
                };

                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = Mval;
                self.colptr[col] += 1;
                MtoKKT[j] = dest;
            }
        }
    }

    // Populate the diagonal with a fixed value using the self.colptr as
    // indicator of next fill location in each row
    pub(crate) fn fill_diag(&mut self, diagtoKKT: &mut [usize], offset: usize, blockdim: usize, v: T) {
        for (i, col) in (offset..(offset + blockdim)).enumerate() {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = v;
            self.colptr[col] += 1;
            diagtoKKT[i] = dest;
        }
    }

    // same as fill_diag, but only places zero
    // entries where the input matrix M has a missing
    // diagonal entry.  M must be square and TRIU
    pub(crate) fn fill_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            // fill out missing diagonal terms only
            if M.colptr[i] == M.colptr[i+1] ||    // completely empty column
               M.rowval[M.colptr[i+1]-1] != i
            // last element is not on diagonal
            {
                let dest = self.colptr[i + initcol];
                self.rowval[dest] = i + initcol;
                self.nzval[dest] = T::zero(); //structural zero
                self.colptr[i + initcol] += 1;
            }
        }
    }

    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

#[test]
fn test_block_assembly() {
    // assemble the 3x3 triu matrix
    //
    // K = [2  1  4]
    //     [.  3  5]
    //     [.  . -1]
    //
    // from P = [2 1; 0 3] (triu), a = [4 5] and a -1 diagonal entry,
    // in the same way the polishing KKT system is built
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![2., 1., 3.]);
    let a = CscMatrix::from(&[[4., 5.]]);

    let nnz = P.nnz() + a.nnz() + 1;
    let mut K = CscMatrix::<f64>::spalloc(3, 3, nnz);

    let mut pmap = vec![0usize; P.nnz()];
    let mut amap = vec![0usize; a.nnz()];
    let mut dmap = vec![0usize; 1];

    K.colcount_block(&P, 0, MatrixShape::N);
    K.colcount_block(&a, 2, MatrixShape::T);
    K.colcount_diag(2, 1);
    K.colcount_to_colptr();

    K.fill_block(&P, &mut pmap, 0, 0, MatrixShape::N);
    K.fill_block(&a, &mut amap, 0, 2, MatrixShape::T);
    K.fill_diag(&mut dmap, 2, 1, -1.);
    K.backshift_colptrs();

    assert!(K.check_format().is_ok());
    assert_eq!(K.colptr, vec![0, 1, 3, 6]);
    assert_eq!(K.rowval, vec![0, 0, 1, 0, 1, 2]);
    assert_eq!(K.nzval, vec![2., 1., 3., 4., 5., -1.]);
}
