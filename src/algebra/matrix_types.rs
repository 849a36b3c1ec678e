// All internal matrix representations in the default
// solver and math implementations are in standard
// compressed sparse column format, as is the API.

/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transpose) view of a matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Symmetric view of a matrix in triu storage
#[derive(Debug, Clone, PartialEq)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}

/// Dimension related functions for matrix-like objects
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn size(&self) -> (usize, usize);
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

impl<M> ShapedMatrix for Adjoint<'_, M>
where
    M: ShapedMatrix,
{
    fn nrows(&self) -> usize {
        self.src.ncols()
    }
    fn ncols(&self) -> usize {
        self.src.nrows()
    }
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl<M> ShapedMatrix for Symmetric<'_, M>
where
    M: ShapedMatrix,
{
    fn nrows(&self) -> usize {
        self.src.nrows()
    }
    fn ncols(&self) -> usize {
        self.src.ncols()
    }
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}
