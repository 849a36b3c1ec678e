use super::*;
use crate::algebra::*;
use crate::solver::core::{traits::InfoPrint, PolishStatus};
use std::io::Write;

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            format!($fmt, $val)
        } else {
            format!("{}", $val)
        }
    };
}

impl<T> InfoPrint<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type SE = DefaultSettings<T>;

    fn print_configuration(
        &self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let mut out = std::io::stdout();

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  nnz(P)        = {}", data.P.nnz())?;
        writeln!(out, "  nnz(A)        = {}", data.A.nnz())?;

        writeln!(out, "\nsettings:")?;
        writeln!(
            out,
            "  linear algebra: {} / indirect, precision: {} bit",
            settings.linear_solver_method,
            _get_precision_string::<T>()
        )?;

        let time_lim_str = {
            if settings.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", settings.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {}, check interval = {}",
            settings.max_iter, time_lim_str, settings.check_termination
        )?;

        writeln!(
            out,
            "  rho = {:.1e} ({}), sigma = {:.1e}, alpha = {:.2}",
            settings.rho,
            if settings.adaptive_rho {
                "adaptive"
            } else {
                "fixed"
            },
            settings.sigma,
            settings.alpha,
        )?;

        writeln!(
            out,
            "  eps_abs = {:.1e}, eps_rel = {:.1e},",
            settings.eps_abs, settings.eps_rel
        )?;
        writeln!(
            out,
            "  eps_prim_inf = {:.1e}, eps_dual_inf = {:.1e},",
            settings.eps_prim_inf, settings.eps_dual_inf
        )?;

        writeln!(
            out,
            "  equilibrate: {}, iters = {}",
            _bool_on_off(settings.scaling > 0),
            settings.scaling,
        )?;

        writeln!(
            out,
            "  polishing: {}, delta = {:.1e}, refine iters = {}",
            _bool_on_off(settings.polishing),
            settings.delta,
            settings.polish_refine_iter,
        )?;

        writeln!(out)?;

        Ok(())
    }

    fn print_status_header(&self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let mut out = std::io::stdout();

        write!(out, "iter     ")?;
        write!(out, "objective     ")?;
        write!(out, "pri res     ")?;
        write!(out, "dua res     ")?;
        write!(out, "rho       ")?;
        write!(out, "time")?;
        writeln!(out)?;
        writeln!(
            out,
            "------------------------------------------------------------------"
        )?;
        out.flush()?;
        Ok(())
    }

    fn print_status(&self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let mut out = std::io::stdout();

        write!(out, "{:>4}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+10.4e}", self.obj_val))?;
        write!(out, "{}  ", expformat!("{:9.2e}", self.res_prim))?;
        write!(out, "{}  ", expformat!("{:9.2e}", self.res_dual))?;
        write!(out, "{}  ", expformat!("{:7.2e}", self.rho_estimate))?;
        write!(out, "{:.2e}s", self.solve_time)?;
        writeln!(out)?;

        Ok(())
    }

    fn print_footer(&self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let mut out = std::io::stdout();

        writeln!(
            out,
            "------------------------------------------------------------------"
        )?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        if self.polish_status != PolishStatus::NotPerformed {
            writeln!(
                out,
                "polish: {}",
                match self.polish_status {
                    PolishStatus::Successful => "successful",
                    _ => "unsuccessful",
                }
            )?;
        }
        writeln!(out, "iterations = {}, rho updates = {}", self.iterations, self.rho_updates)?;
        writeln!(
            out,
            "solve time = {:.2e}s (setup {:.2e}s, polish {:.2e}s)",
            self.run_time, self.setup_time, self.polish_time
        )?;

        Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}
