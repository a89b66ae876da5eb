// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Iteration domains: summaries of one step of a loop body from which a
//! formula relating the pre-state to the state after `K` steps is built.

use std::fmt;

use formula::syntax::Term;
use solver::SolverConf;

use crate::{binding::Vocabulary, error::QueryError, TransitionFormula, Var};

pub mod guard;
pub mod product;
pub mod solvable;

pub use guard::Guard;
pub use solvable::Solvable;

use crate::domain::Product;

/// The iteration domain used when nothing else is asked for.
pub type DefaultIteration = Product<Solvable, Guard>;

/// The default iteration domain.
pub fn default_iteration() -> DefaultIteration {
    Product(Solvable, Guard)
}

/// An iteration domain.
pub trait IterationDomain {
    /// The summary of one step.
    type Iter: Clone + fmt::Debug;

    /// Summarize one step, given as a transition formula.
    fn abstract_iter(
        &self,
        voc: &Vocabulary,
        conf: &SolverConf,
        tf: &TransitionFormula,
    ) -> Result<Self::Iter, QueryError>;

    /// A formula over the pre-state symbols, the post symbols of `tracked`
    /// and the integer symbol named `k` that holds whenever `k` steps lead
    /// from the pre-state to the post-state. Variables other than those tracked
    /// are unchanged by a step.
    fn exp(&self, voc: &Vocabulary, tracked: &[(Var, String)], k: &str, iter: &Self::Iter) -> Term;
}

/// `⋀ x' = x` over the tracked variables.
pub(crate) fn stay(tracked: &[(Var, String)]) -> Term {
    Term::and(
        tracked
            .iter()
            .map(|(v, post)| Term::equals(Term::id(post), v.term())),
    )
}

/// The symbols of untracked variables, which no step changes.
pub(crate) fn is_invariant(voc: &Vocabulary, tracked: &[(Var, String)], symbol: &str) -> bool {
    voc.var_of_symbol(symbol)
        .is_some_and(|v| tracked.iter().all(|(t, _)| t != &v))
}
