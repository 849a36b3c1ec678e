#![allow(non_snake_case)]
use super::DefaultSolver;
use crate::algebra::*;
use crate::solver::core::traits::{KKTSystem, Settings, Variables};
use crate::solver::core::SolverError;
use crate::solver::implementations::default::settings::DefaultSettings;
use std::iter::zip;

// Enum type allowing for flexible user input of matrix data updates.

pub enum MatrixUpdateDataSource<'a, T: FloatT> {
    CscMatrix(&'a CscMatrix<T>),
    Slice(&'a [T]),
}

impl<'a, T> From<&'a [T]> for MatrixUpdateDataSource<'a, T>
where
    T: FloatT,
{
    fn from(v: &'a [T]) -> Self {
        MatrixUpdateDataSource::Slice(v)
    }
}

impl<'a, T> From<&'a Vec<T>> for MatrixUpdateDataSource<'a, T>
where
    T: FloatT,
{
    fn from(v: &'a Vec<T>) -> Self {
        MatrixUpdateDataSource::Slice(v)
    }
}

impl<'a, T> From<&'a CscMatrix<T>> for MatrixUpdateDataSource<'a, T>
where
    T: FloatT,
{
    fn from(v: &'a CscMatrix<T>) -> Self {
        MatrixUpdateDataSource::CscMatrix(v)
    }
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Overwrites the `q` vector data in an existing solver object.
    /// No action is taken if the input is empty.
    pub fn update_q(&mut self, q: &[T]) -> Result<(), SolverError> {
        if q.is_empty() {
            return Ok(());
        }
        if q.len() != self.data.q.len() {
            return Err(SolverError::BadProblemData("q of incompatible length"));
        }
        if !q.is_finite() {
            return Err(SolverError::BadProblemData("non-finite entries in q"));
        }

        self.data.q.copy_from(q);

        // reapply original equilibration and invalidate the norm cache
        let equil = &self.data.equilibration;
        equil.scale_q(&mut self.data.q);
        self.data.clear_normq();

        Ok(())
    }

    /// Overwrites one or both constraint bound vectors in an existing
    /// solver object.   A `None` input keeps the corresponding bound.
    pub fn update_bounds(&mut self, l: Option<&[T]>, u: Option<&[T]>) -> Result<(), SolverError> {
        let m = self.data.m;

        if let Some(l) = l {
            if l.len() != m {
                return Err(SolverError::BadProblemData("l of incompatible length"));
            }
        }
        if let Some(u) = u {
            if u.len() != m {
                return Err(SolverError::BadProblemData("u of incompatible length"));
            }
        }

        let infbound: T = crate::solver::get_infinity().as_T();
        let equil = &self.data.equilibration;

        // candidate bounds in user space, replacing only the supplied
        // sides, with the infinity mapping applied
        let mut l_new: Vec<T> = match l {
            Some(l) => l.to_vec(),
            None => {
                let mut v = self.data.l.clone();
                v.hadamard(&equil.einv);
                v
            }
        };
        let mut u_new: Vec<T> = match u {
            Some(u) => u.to_vec(),
            None => {
                let mut v = self.data.u.clone();
                v.hadamard(&equil.einv);
                v
            }
        };
        l_new.scalarop(|x| if x <= -infbound { -T::infinity() } else { x });
        u_new.scalarop(|x| if x >= infbound { T::infinity() } else { x });

        for (&li, &ui) in zip(&l_new, &u_new) {
            if li.is_nan() || ui.is_nan() || li > ui {
                return Err(SolverError::BadProblemData("lower bound exceeds upper bound"));
            }
            if li >= infbound || ui <= -infbound {
                return Err(SolverError::BadProblemData(
                    "a bound places the constraint interval at infinity",
                ));
            }
        }

        equil.scale_bounds(&mut l_new, &mut u_new);
        self.data.l = l_new;
        self.data.u = u_new;

        // bound updates can change constraint row classes, so the
        // ρ vector and preconditioner are rebuilt
        let ρ = self.variables.rho();
        self.variables
            .update_rho_vec(ρ, &self.data, &self.settings);
        self.kktsystem.update_rho(&self.variables);

        Ok(())
    }

    /// Overwrites the `P` matrix data in an existing solver object.  The input can be
    ///
    /// - a nonempty slice or Vec, overwriting the nonzero values of the original
    ///   (upper triangular) `P` while preserving its sparsity pattern, or
    ///
    /// - a `CscMatrix`, whose pattern must match the upper triangular part of
    ///   the original `P`, or
    ///
    /// - an empty slice, in which case no action is taken.
    ///
    pub fn update_P<'a, CscOrSlice: Into<MatrixUpdateDataSource<'a, T>>>(
        &mut self,
        data: CscOrSlice,
    ) -> Result<(), SolverError> {
        let data = data.into();
        match data {
            MatrixUpdateDataSource::CscMatrix(P) => {
                P.check_equal_sparsity(&self.data.P)?;
                self.update_P_slice(&P.nzval)
            }
            MatrixUpdateDataSource::Slice(v) => self.update_P_slice(v),
        }
    }

    fn update_P_slice(&mut self, v: &[T]) -> Result<(), SolverError> {
        if v.is_empty() {
            return Ok(());
        }
        if v.len() != self.data.P.nzval.len() {
            return Err(SolverError::SparseFormat(
                SparseFormatError::IncompatibleDimension,
            ));
        }
        if !v.is_finite() {
            return Err(SolverError::BadProblemData("non-finite entries in P"));
        }

        self.data.P.nzval.copy_from_slice(v);

        // reapply original equilibration
        self.data.equilibration.scale_P(&mut self.data.P);

        // refresh the backend preconditioner
        self.kktsystem.update_matrices(&self.data);
        Ok(())
    }

    /// Overwrites the `A` matrix data in an existing solver object.  Inputs
    /// follow the same rules as [`update_P`](DefaultSolver::update_P), against
    /// the sparsity pattern of the original `A`.
    pub fn update_A<'a, CscOrSlice: Into<MatrixUpdateDataSource<'a, T>>>(
        &mut self,
        data: CscOrSlice,
    ) -> Result<(), SolverError> {
        let data = data.into();
        match data {
            MatrixUpdateDataSource::CscMatrix(A) => {
                A.check_equal_sparsity(&self.data.A)?;
                self.update_A_slice(&A.nzval)
            }
            MatrixUpdateDataSource::Slice(v) => self.update_A_slice(v),
        }
    }

    fn update_A_slice(&mut self, v: &[T]) -> Result<(), SolverError> {
        if v.is_empty() {
            return Ok(());
        }
        if v.len() != self.data.A.nzval.len() {
            return Err(SolverError::SparseFormat(
                SparseFormatError::IncompatibleDimension,
            ));
        }
        if !v.is_finite() {
            return Err(SolverError::BadProblemData("non-finite entries in A"));
        }

        self.data.A.nzval.copy_from_slice(v);

        // reapply original equilibration
        self.data.equilibration.scale_A(&mut self.data.A);

        // refresh the backend preconditioner
        self.kktsystem.update_matrices(&self.data);
        Ok(())
    }

    /// Overwrites the scalar step parameter ρ and rebuilds its
    /// per-constraint expansion.
    pub fn update_rho(&mut self, rho: T) -> Result<(), SolverError> {
        if !(rho > T::zero() && rho.is_finite()) {
            return Err(SolverError::BadSettings(
                "rho must be positive and finite".to_string(),
            ));
        }

        self.variables
            .update_rho_vec(rho, &self.data, &self.settings);
        self.kktsystem.update_rho(&self.variables);
        Ok(())
    }

    /// Replaces the solver settings with a non-structural subset.
    /// Changes to `scaling`, `linear_solver_method` or `rho` are
    /// rejected; use [`update_rho`](DefaultSolver::update_rho) for the
    /// latter.
    pub fn update_settings(&mut self, settings: DefaultSettings<T>) -> Result<(), SolverError> {
        settings.validate().map_err(SolverError::BadSettings)?;

        let current = self.settings.core();
        if settings.scaling != current.scaling {
            return Err(SolverError::BadSettings(
                "scaling cannot change after setup".to_string(),
            ));
        }
        if settings.linear_solver_method != current.linear_solver_method {
            return Err(SolverError::BadSettings(
                "linear_solver_method cannot change after setup".to_string(),
            ));
        }
        if settings.rho != current.rho {
            return Err(SolverError::BadSettings(
                "use update_rho to change the step parameter".to_string(),
            ));
        }

        self.settings = settings;
        Ok(())
    }

    /// Sets the starting iterate for the next solve from a caller
    /// supplied primal and/or dual estimate, and enables the
    /// `warm_start` setting.
    pub fn warm_start(&mut self, x: Option<&[T]>, y: Option<&[T]>) -> Result<(), SolverError> {
        if let Some(x) = x {
            if x.len() != self.data.n {
                return Err(SolverError::BadProblemData("x of incompatible length"));
            }
            if !x.is_finite() {
                return Err(SolverError::BadProblemData("non-finite entries in x"));
            }
        }
        if let Some(y) = y {
            if y.len() != self.data.m {
                return Err(SolverError::BadProblemData("y of incompatible length"));
            }
            if !y.is_finite() {
                return Err(SolverError::BadProblemData("non-finite entries in y"));
            }
        }

        self.variables.initialize_from(&self.data, x, y);
        self.settings.core_mut().warm_start = true;

        Ok(())
    }
}
