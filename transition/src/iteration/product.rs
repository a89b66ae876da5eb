// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The product of two iteration domains: both summaries are computed, and the
//! closed form after `K` steps is the conjunction of theirs.

use formula::syntax::Term;
use solver::SolverConf;

use crate::{
    binding::Vocabulary, domain::Product, error::QueryError, iteration::IterationDomain,
    TransitionFormula, Var,
};

impl<A: IterationDomain, B: IterationDomain> IterationDomain for Product<A, B> {
    type Iter = (A::Iter, B::Iter);

    fn abstract_iter(
        &self,
        voc: &Vocabulary,
        conf: &SolverConf,
        tf: &TransitionFormula,
    ) -> Result<Self::Iter, QueryError> {
        Ok((
            self.0.abstract_iter(voc, conf, tf)?,
            self.1.abstract_iter(voc, conf, tf)?,
        ))
    }

    fn exp(&self, voc: &Vocabulary, tracked: &[(Var, String)], k: &str, iter: &Self::Iter) -> Term {
        Term::and([
            self.0.exp(voc, tracked, k, &iter.0),
            self.1.exp(voc, tracked, k, &iter.1),
        ])
    }
}
