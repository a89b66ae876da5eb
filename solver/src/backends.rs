// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Support for choosing a solver backend (native, Z3 or CVC5) and building the
//! command that launches the external ones.

use std::{fmt, str::FromStr};

use smtlib::conf::{CvcConf, SolverCmd, Z3Conf};

/// The type of solver being used
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolverType {
    /// The in-process solver for linear arithmetic
    Native,
    Z3,
    Cvc5,
}

impl FromStr for SolverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "z3" => Ok(Self::Z3),
            "cvc5" => Ok(Self::Cvc5),
            _ => Err(format!("unknown solver type {s} (expected native, z3 or cvc5)")),
        }
    }
}

impl fmt::Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Native => "native",
            Self::Z3 => "z3",
            Self::Cvc5 => "cvc5",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default)]
struct GenericOptions {
    timeout_ms: Option<usize>,
    seed: usize,
}

/// A backend for launching Z3/CVC5 or running the native solver, with some
/// hard-coded options.
#[derive(Debug, Clone)]
pub struct GenericBackend {
    solver_type: SolverType,
    bin: String,
    opts: GenericOptions,
}

impl GenericBackend {
    /// Create a backend for a given type of solver and with a path to the
    /// solver binary (ignored for the native solver).
    pub fn new(solver_type: SolverType, bin: &str) -> Self {
        Self {
            solver_type,
            bin: bin.to_string(),
            opts: Default::default(),
        }
    }

    /// Set the solver timeout. None disables the timeout.
    pub fn timeout_ms(&mut self, timeout_ms: Option<usize>) -> &mut Self {
        self.opts.timeout_ms = timeout_ms;
        return self;
    }

    /// Set the solver's random seed.
    pub fn seed(&mut self, seed: usize) -> &mut Self {
        self.opts.seed = seed;
        return self;
    }

    /// Get the solver type.
    pub fn get_solver_type(&self) -> SolverType {
        self.solver_type
    }

    /// Get the solver timeout.
    pub fn get_timeout_ms(&self) -> Option<usize> {
        self.opts.timeout_ms
    }

    /// Get a [`SolverCmd`] with all the info to launch an external solver.
    /// Returns `None` for the native solver, which runs in-process.
    pub fn get_cmd(&self) -> Option<SolverCmd> {
        match self.solver_type {
            SolverType::Native => None,
            SolverType::Z3 => {
                let mut conf = Z3Conf::new(&self.bin);
                conf.timeout_ms(self.opts.timeout_ms);
                let mut cmd = conf.done();
                if self.opts.seed != 0 {
                    cmd.option("smt.random_seed", format!("{}", self.opts.seed));
                    cmd.option("sat.random_seed", format!("{}", self.opts.seed));
                }
                Some(cmd)
            }
            SolverType::Cvc5 => {
                let mut conf = CvcConf::new_cvc5(&self.bin);
                conf.timeout_ms(self.opts.timeout_ms);
                let mut cmd = conf.done();
                if self.opts.seed != 0 {
                    cmd.option("seed", format!("{}", self.opts.seed));
                }
                Some(cmd)
            }
        }
    }
}
