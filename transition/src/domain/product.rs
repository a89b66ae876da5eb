// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The direct product of two domains.

use formula::{context::Context, syntax::Term};
use solver::SolverConf;

use crate::{domain::AbstractDomain, error::QueryError};

/// Pairs two domains; values are pairs and operations act pointwise. The
/// same type combines iteration domains.
#[derive(Copy, Clone, Debug, Default)]
pub struct Product<A, B>(pub A, pub B);

impl<A: AbstractDomain, B: AbstractDomain> AbstractDomain for Product<A, B> {
    type Value = (A::Value, B::Value);

    fn abstract_of<F>(
        &self,
        ctx: &Context,
        conf: &SolverConf,
        formula: &Term,
        keep: F,
    ) -> Result<Self::Value, QueryError>
    where
        F: Fn(&str) -> bool,
    {
        Ok((
            self.0.abstract_of(ctx, conf, formula, &keep)?,
            self.1.abstract_of(ctx, conf, formula, &keep)?,
        ))
    }

    fn bottom(&self) -> Self::Value {
        (self.0.bottom(), self.1.bottom())
    }

    fn top(&self) -> Self::Value {
        (self.0.top(), self.1.top())
    }

    fn join(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        (self.0.join(&a.0, &b.0), self.1.join(&a.1, &b.1))
    }

    fn widen(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        (self.0.widen(&a.0, &b.0), self.1.widen(&a.1, &b.1))
    }

    fn formula_of(&self, a: &Self::Value) -> Term {
        Term::and([self.0.formula_of(&a.0), self.1.formula_of(&a.1)])
    }

    fn exists<F>(&self, a: &Self::Value, keep: F) -> Self::Value
    where
        F: Fn(&str) -> bool,
    {
        (self.0.exists(&a.0, &keep), self.1.exists(&a.1, &keep))
    }

    fn equal(&self, a: &Self::Value, b: &Self::Value) -> bool {
        self.0.equal(&a.0, &b.0) && self.1.equal(&a.1, &b.1)
    }

    fn is_bottom(&self, a: &Self::Value) -> bool {
        self.0.is_bottom(&a.0) || self.1.is_bottom(&a.1)
    }
}
