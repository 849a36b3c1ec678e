use crate::algebra::*;
use crate::solver::core::traits::Settings;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Standard-form solver type implementing the [`Settings`](crate::solver::core::traits::Settings) trait

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultSettings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "4000")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///ADMM step parameter
    #[builder(default = "(0.1).as_T()")]
    pub rho: T,

    ///ADMM x-regularization parameter
    #[builder(default = "(1e-6).as_T()")]
    pub sigma: T,

    ///over-relaxation parameter, in (0,2)
    #[builder(default = "(1.6).as_T()")]
    pub alpha: T,

    ///absolute residual tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_abs: T,

    ///relative residual tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_rel: T,

    ///primal infeasibility certificate tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_prim_inf: T,

    ///dual infeasibility certificate tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_dual_inf: T,

    ///number of data equilibration iterations (0 disables scaling)
    #[builder(default = "10")]
    pub scaling: u32,

    ///enable adaptation of the step parameter ρ
    #[builder(default = "true")]
    pub adaptive_rho: bool,

    ///iterations between candidate ρ updates.   0 selects an
    ///automatic iteration-count schedule
    #[builder(default = "0")]
    pub adaptive_rho_interval: u32,

    ///accept a candidate ρ only when it differs from the current
    ///value by at least this factor
    #[builder(default = "(5.0).as_T()")]
    pub adaptive_rho_tolerance: T,

    ///ρ multiplier applied to equality constraint rows
    #[builder(default = "(1e3).as_T()")]
    pub rho_eq_scale: T,

    ///start from the current iterate instead of zero
    #[builder(default = "false")]
    pub warm_start: bool,

    ///iterations between residual checks (0 checks every iteration)
    #[builder(default = "25")]
    pub check_termination: u32,

    ///enable active-set solution polishing
    #[builder(default = "false")]
    pub polishing: bool,

    ///polishing regularization parameter
    #[builder(default = "(1e-6).as_T()")]
    pub delta: T,

    ///iterative refinement passes during polishing
    #[builder(default = "3")]
    pub polish_refine_iter: u32,

    ///linear system backend (e.g. "pcg")
    #[builder(default = r#""pcg".to_string()"#)]
    pub linear_solver_method: String,

    ///conjugate gradient iteration cap per solve.   0 selects the
    ///automatic cap max(n, 20)
    #[builder(default = "0")]
    pub cg_max_iter: u32,

    ///conjugate gradient absolute residual tolerance
    #[builder(default = "(1e-15).as_T()")]
    pub cg_eps_abs: T,
}

impl<T> Default for DefaultSettings<T>
where
    T: FloatT,
{
    fn default() -> DefaultSettings<T> {
        DefaultSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T> for DefaultSettings<T>
where
    T: FloatT,
{
    //NB: CoreSettings is typedef'd to DefaultSettings
    fn core(&self) -> &DefaultSettings<T> {
        self
    }
    fn core_mut(&mut self) -> &mut DefaultSettings<T> {
        self
    }
}

// pre build checker (for auto-validation when using the builder)

/// Automatic pre-build settings validation
impl<T> DefaultSettingsBuilder<T>
where
    T: FloatT,
{
    /// check that the specified linear solver backend exists
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref linear_solver_method) = self.linear_solver_method {
            validate_linear_solver_method::<T>(linear_solver_method.as_str())?;
        }
        Ok(())
    }
}

// post build checker.   Re-run inside solver setup so that settings
// arriving by direct construction are still range checked.

/// Manual post-build settings validation
impl<T> DefaultSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid
    pub fn validate(&self) -> Result<(), String> {
        validate_linear_solver_method::<T>(&self.linear_solver_method)?;

        if self.max_iter == 0 {
            return Err("max_iter must be at least 1".to_string());
        }
        if !(self.time_limit > 0.) {
            return Err("time_limit must be positive".to_string());
        }
        if !(self.rho > T::zero() && self.rho.is_finite()) {
            return Err("rho must be positive and finite".to_string());
        }
        if !(self.sigma > T::zero() && self.sigma.is_finite()) {
            return Err("sigma must be positive and finite".to_string());
        }
        if !(self.alpha > T::zero() && self.alpha < (2.0).as_T()) {
            return Err("alpha must lie in (0,2)".to_string());
        }
        if self.eps_abs < T::zero() || self.eps_rel < T::zero() {
            return Err("residual tolerances must be nonnegative".to_string());
        }
        if self.eps_abs == T::zero() && self.eps_rel == T::zero() {
            return Err("at least one of eps_abs and eps_rel must be positive".to_string());
        }
        if !(self.eps_prim_inf > T::zero() && self.eps_dual_inf > T::zero()) {
            return Err("infeasibility tolerances must be positive".to_string());
        }
        if self.adaptive_rho_tolerance < T::one() {
            return Err("adaptive_rho_tolerance must be at least 1".to_string());
        }
        if !(self.rho_eq_scale > T::zero()) {
            return Err("rho_eq_scale must be positive".to_string());
        }
        if !(self.delta > T::zero()) {
            return Err("delta must be positive".to_string());
        }
        if !(self.cg_eps_abs >= T::zero()) {
            return Err("cg_eps_abs must be nonnegative".to_string());
        }

        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_linear_solver_method<T: FloatT>(method: &str) -> Result<(), String> {
    match crate::solver::core::kktsolvers::kktsolver_constructor::<T>(method) {
        Some(_) => Ok(()),
        None => Err(format!("Invalid linear_solver_method: {:?}", method)),
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    DefaultSettingsBuilder::<f64>::default().build().unwrap();

    // fail on an unknown linear solver backend
    assert!(DefaultSettingsBuilder::<f64>::default()
        .linear_solver_method("foo".to_string())
        .build()
        .is_err());

    // post-build range checks
    let mut settings = DefaultSettings::<f64>::default();
    settings.alpha = 2.0;
    assert!(settings.validate().is_err());

    let mut settings = DefaultSettings::<f64>::default();
    settings.eps_abs = 0.;
    settings.eps_rel = 0.;
    assert!(settings.validate().is_err());

    let mut settings = DefaultSettings::<f64>::default();
    settings.rho = -1.;
    assert!(settings.validate().is_err());
}
