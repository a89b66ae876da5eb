// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The trait defining a basic incremental interface to solvers, and the
//! responses of one-shot queries.

use formula::{semantics::Model, syntax::Term};
use smtlib::proc::{SatResp, SolverError};

/// An incremental solver for quantifier-free arithmetic formulas.
///
/// Symbols are looked up in the [`Context`](formula::context::Context) the
/// solver was created with; every symbol of an asserted term must be declared
/// there.
pub trait Solver {
    /// Add an assertion to the current scope.
    fn assert(&mut self, t: &Term) -> Result<(), SolverError>;

    /// Open a new assertion scope.
    fn push(&mut self) -> Result<(), SolverError>;

    /// Drop the assertions of the innermost scope.
    fn pop(&mut self) -> Result<(), SolverError>;

    /// Check the assertions together with `assumptions`, which do not persist
    /// beyond this call.
    fn check_sat(&mut self, assumptions: &[Term]) -> Result<SatResp, SolverError>;

    /// After a sat response to `check_sat`, a model of the assertions and
    /// assumptions. The model binds every symbol they mention.
    fn get_model(&mut self) -> Result<Model, SolverError>;

    /// After an unsat response to `check_sat`, a subset of the assumptions
    /// that is unsatisfiable together with the assertions.
    fn get_unsat_core(&mut self) -> Result<Vec<Term>, SolverError>;
}

/// The response to a one-shot model query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResp {
    /// The formula is satisfiable, with a model
    Sat(Model),
    /// The formula is unsatisfiable
    Unsat,
    /// The solver could not decide, with its reason
    Unknown(String),
}

/// The response to a one-shot unsat-core query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreResp {
    /// The conjunction is satisfiable, with a model
    Sat(Model),
    /// The conjunction is unsatisfiable; the indices of a subset of the
    /// formulas that is already unsatisfiable
    Unsat(Vec<usize>),
    /// The solver could not decide, with its reason
    Unknown(String),
}
