// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Holds the configuration needed to create a solver, and one-shot queries
//! on top of it.

use std::{env, path::PathBuf, time::Instant};

use formula::{context::Context, syntax::Term};
use smtlib::{
    path::solver_path,
    proc::{SatResp, SolverError},
};

use crate::{
    backends::{GenericBackend, SolverType},
    basics::{CoreResp, ModelResp, Solver},
    imp::SmtSolver,
    native::NativeSolver,
};

/// Wrapper around the configuration needed to create a solver.
#[derive(Debug, Clone)]
pub struct SolverConf {
    /// Which backend to use for created solvers.
    pub backend: GenericBackend,
    /// The optional path to tee SMT output to (external solvers only).
    pub tee: Option<PathBuf>,
}

impl SolverConf {
    /// A configuration for the given solver, found with [`solver_path`].
    pub fn new(solver_type: SolverType) -> Self {
        let bin = match solver_type {
            SolverType::Native => String::new(),
            SolverType::Z3 => solver_path("z3"),
            SolverType::Cvc5 => solver_path("cvc5"),
        };
        Self {
            backend: GenericBackend::new(solver_type, &bin),
            tee: None,
        }
    }

    /// A configuration for the in-process solver.
    pub fn native() -> Self {
        Self::new(SolverType::Native)
    }

    /// A configuration read from the environment: `SOLVER` names the solver
    /// type (native by default) and `SOLVER_TEE` an optional file to log the
    /// SMT-LIB transcript to.
    pub fn from_env() -> Result<Self, String> {
        let solver_type = match env::var("SOLVER") {
            Ok(s) => s.parse()?,
            Err(_) => SolverType::Native,
        };
        let mut conf = Self::new(solver_type);
        conf.tee = env::var_os("SOLVER_TEE").map(PathBuf::from);
        Ok(conf)
    }

    /// The type of solver this configuration creates.
    pub fn solver_type(&self) -> SolverType {
        self.backend.get_solver_type()
    }

    /// Create a new solver whose symbols are declared in `ctx`.
    pub fn solver<'a>(&self, ctx: &'a Context) -> Result<Box<dyn Solver + 'a>, SolverError> {
        match self.backend.get_cmd() {
            None => {
                let mut solver = NativeSolver::new(ctx);
                solver.timeout_ms(self.backend.get_timeout_ms());
                Ok(Box::new(solver))
            }
            Some(cmd) => Ok(Box::new(SmtSolver::new(ctx, cmd, self.tee.as_deref())?)),
        }
    }

    /// Check the satisfiability of a formula.
    pub fn check(&self, ctx: &Context, t: &Term) -> Result<SatResp, SolverError> {
        let mut solver = self.solver(ctx)?;
        solver.assert(t)?;
        solver.check_sat(&[])
    }

    /// Check the satisfiability of a formula, and get a model if it is
    /// satisfiable.
    pub fn get_model(&self, ctx: &Context, t: &Term) -> Result<ModelResp, SolverError> {
        let start = Instant::now();
        let mut solver = self.solver(ctx)?;
        solver.assert(t)?;
        let resp = match solver.check_sat(&[])? {
            SatResp::Sat => ModelResp::Sat(solver.get_model()?),
            SatResp::Unsat => ModelResp::Unsat,
            SatResp::Unknown(reason) => ModelResp::Unknown(reason),
        };
        log::debug!(
            "{} model query of size {} took {}ms",
            self.solver_type(),
            t.size(),
            start.elapsed().as_millis()
        );
        Ok(resp)
    }

    /// Check the satisfiability of the conjunction of `ts`. If it is
    /// unsatisfiable, return the indices of an unsatisfiable subset of `ts`.
    pub fn get_unsat_core(&self, ctx: &Context, ts: &[Term]) -> Result<CoreResp, SolverError> {
        let start = Instant::now();
        let mut solver = self.solver(ctx)?;
        let resp = match solver.check_sat(ts)? {
            SatResp::Sat => CoreResp::Sat(solver.get_model()?),
            SatResp::Unsat => {
                let core = solver.get_unsat_core()?;
                let indices: Vec<usize> = ts
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| core.contains(t))
                    .map(|(i, _)| i)
                    .collect();
                CoreResp::Unsat(indices)
            }
            SatResp::Unknown(reason) => CoreResp::Unknown(reason),
        };
        log::debug!(
            "{} core query over {} formulas took {}ms",
            self.solver_type(),
            ts.len(),
            start.elapsed().as_millis()
        );
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::syntax::{rat, Sort};

    #[test]
    fn test_one_shot_queries() {
        let ctx = Context::new();
        let x = ctx.declare("x", Sort::Int);
        let conf = SolverConf::native();
        assert_eq!(conf.solver_type(), SolverType::Native);

        let sat = Term::and([Term::gt(&x, 2), Term::lt(&x, 4)]);
        assert_eq!(conf.check(&ctx, &sat).unwrap(), SatResp::Sat);
        match conf.get_model(&ctx, &sat).unwrap() {
            ModelResp::Sat(model) => assert_eq!(model.get_num("x"), Some(rat(3))),
            resp => panic!("unexpected {resp:?}"),
        }

        let ts = [Term::gt(&x, 2), Term::gt(&x, 0), Term::lt(&x, 1)];
        assert_eq!(
            conf.get_unsat_core(&ctx, &ts).unwrap(),
            CoreResp::Unsat(vec![1, 2])
        );
    }
}
